use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Thriving,
    Strong,
    Stable,
    Building,
    Struggling,
    Urgent,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thriving => "THRIVING",
            Self::Strong => "STRONG",
            Self::Stable => "STABLE",
            Self::Building => "BUILDING",
            Self::Struggling => "STRUGGLING",
            Self::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `round(total / max * 100)`, rounding halves up. A zero max yields 0.
pub fn percentage(total: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }

    (f64::from(total) / f64::from(max) * 100.0).round() as u32
}

pub fn health_for_percentage(percentage: u32) -> HealthStatus {
    match percentage {
        90.. => HealthStatus::Thriving,
        80..=89 => HealthStatus::Strong,
        70..=79 => HealthStatus::Stable,
        60..=69 => HealthStatus::Building,
        50..=59 => HealthStatus::Struggling,
        _ => HealthStatus::Urgent,
    }
}
