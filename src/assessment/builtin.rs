use crate::assessment::Assessment;
use anyhow::{Context, Result, bail};

/// Variants compiled into the binary, keyed by assessment id.
const SOURCES: &[(&str, &str)] = &[
    (
        "business-health",
        include_str!("../../assessments/business-health.toml"),
    ),
    ("quick-check", include_str!("../../assessments/quick-check.toml")),
    (
        "revenue-readiness",
        include_str!("../../assessments/revenue-readiness.toml"),
    ),
];

pub fn ids() -> impl Iterator<Item = &'static str> {
    SOURCES.iter().map(|(id, _)| *id)
}

pub fn source(id: &str) -> Option<&'static str> {
    SOURCES
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, source)| *source)
}

pub fn find(id: &str) -> Result<Assessment> {
    let Some(source) = source(id) else {
        bail!(
            "unknown assessment {id:?} (built-in: {})",
            ids().collect::<Vec<_>>().join(", ")
        );
    };

    let assessment = Assessment::from_toml_str(source)
        .with_context(|| format!("built-in assessment {id} is invalid"))?;
    if assessment.id != id {
        bail!(
            "built-in assessment registered as {id} declares id {}",
            assessment.id
        );
    }
    Ok(assessment)
}

pub fn all() -> Result<Vec<Assessment>> {
    ids().map(find).collect()
}
