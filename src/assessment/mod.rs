pub mod builtin;
pub mod error;

use crate::assessment::error::{AnswerError, ConfigError, ValidationReport};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

pub const YES: &str = "yes";
pub const NO: &str = "no";

static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("valid id regex"));

/// Selected value and awarded points for one question or yes/no item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Answer {
    pub value: String,
    pub points: u32,
}

impl Answer {
    pub fn new(value: impl Into<String>, points: u32) -> Self {
        Self {
            value: value.into(),
            points,
        }
    }
}

/// Answers keyed by question id, or by item id for yes/no groups.
pub type Answers = BTreeMap<String, Answer>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubmitRequires {
    #[default]
    Current,
    All,
}

impl fmt::Display for SubmitRequires {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::All => write!(f, "all"),
        }
    }
}

/// One assessment variant: questions plus the section-maxima table they are
/// scored against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,
    pub title: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub max_possible_total: u32,
    #[serde(default)]
    pub submit_requires: SubmitRequires,
    pub sections: Vec<Section>,
    pub questions: Vec<Question>,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub max: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsection: Option<String>,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum QuestionKind {
    SingleChoice {
        options: Vec<AnswerOption>,
    },
    YesNoGroup {
        points_per_yes: u32,
        items: Vec<SubQuestion>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    pub value: String,
    pub label: String,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubQuestion {
    pub id: String,
    pub prompt: String,
}

impl Question {
    /// Keys this question reads from an [`Answers`] map.
    pub fn answer_keys(&self) -> Vec<&str> {
        match &self.kind {
            QuestionKind::SingleChoice { .. } => vec![self.id.as_str()],
            QuestionKind::YesNoGroup { items, .. } => {
                items.iter().map(|item| item.id.as_str()).collect()
            }
        }
    }

    /// Points contributed by `answers`; unanswered keys count as zero.
    pub fn points_from(&self, answers: &Answers) -> u32 {
        self.answer_keys()
            .into_iter()
            .filter_map(|key| answers.get(key))
            .fold(0, |sum, answer| sum.saturating_add(answer.points))
    }

    pub fn is_answered(&self, answers: &Answers) -> bool {
        self.answer_keys()
            .into_iter()
            .all(|key| answers.contains_key(key))
    }

    /// Best achievable points, widened so oversized definitions cannot wrap.
    pub fn max_points(&self) -> u64 {
        match &self.kind {
            QuestionKind::SingleChoice { options } => options
                .iter()
                .map(|option| u64::from(option.points))
                .max()
                .unwrap_or(0),
            QuestionKind::YesNoGroup {
                points_per_yes,
                items,
            } => u64::from(*points_per_yes) * items.len() as u64,
        }
    }

    pub fn min_points(&self) -> u32 {
        match &self.kind {
            QuestionKind::SingleChoice { options } => {
                options.iter().map(|option| option.points).min().unwrap_or(0)
            }
            QuestionKind::YesNoGroup { .. } => 0,
        }
    }
}

impl Assessment {
    /// Parses a definition without checking it; see [`Assessment::validate`].
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str::<Assessment>(content).context("failed parsing assessment definition")
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let assessment = Self::parse(content)?;
        assessment.validate()?;
        Ok(assessment)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed reading assessment file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid assessment file {}", path.display()))
    }

    /// Number of answer keys needed for a fully answered assessment.
    pub fn answer_key_count(&self) -> usize {
        self.questions
            .iter()
            .map(|question| question.answer_keys().len())
            .sum()
    }

    /// Checks that the maxima table agrees with the question set and that ids
    /// are well formed. Collects every problem instead of stopping at the
    /// first one.
    pub fn validate(&self) -> Result<(), ValidationReport> {
        let mut errors = Vec::new();

        if !ID_RE.is_match(&self.id) {
            errors.push(ConfigError::InvalidId(self.id.clone()));
        }
        if self.max_possible_total == 0 {
            errors.push(ConfigError::ZeroTotal);
        }

        let mut computed: HashMap<&str, u64> = HashMap::new();
        for section in &self.sections {
            if computed.insert(section.name.as_str(), 0).is_some() {
                errors.push(ConfigError::DuplicateSection(section.name.clone()));
            }
        }

        let mut seen_ids = HashSet::new();
        for question in &self.questions {
            for key in std::iter::once(question.id.as_str()).chain(group_item_ids(question)) {
                if !ID_RE.is_match(key) {
                    errors.push(ConfigError::InvalidId(key.to_string()));
                }
                if !seen_ids.insert(key) {
                    errors.push(ConfigError::DuplicateId(key.to_string()));
                }
            }

            match &question.kind {
                QuestionKind::SingleChoice { options } => {
                    if options.is_empty() {
                        errors.push(ConfigError::NoOptions(question.id.clone()));
                    }
                    // answers match option values case-insensitively
                    let mut values = HashSet::new();
                    for option in options {
                        if !values.insert(option.value.to_ascii_lowercase()) {
                            errors.push(ConfigError::DuplicateOption {
                                question: question.id.clone(),
                                value: option.value.clone(),
                            });
                        }
                    }
                }
                QuestionKind::YesNoGroup { items, .. } => {
                    if items.is_empty() {
                        errors.push(ConfigError::EmptyGroup(question.id.clone()));
                    }
                }
            }

            match computed.get_mut(question.section.as_str()) {
                Some(sum) => *sum = sum.saturating_add(question.max_points()),
                None => errors.push(ConfigError::UnknownSection {
                    question: question.id.clone(),
                    section: question.section.clone(),
                }),
            }
        }

        for section in &self.sections {
            if !self
                .questions
                .iter()
                .any(|question| question.section == section.name)
            {
                errors.push(ConfigError::EmptySection(section.name.clone()));
            }

            let sum = computed.get(section.name.as_str()).copied().unwrap_or(0);
            if sum != u64::from(section.max) {
                errors.push(ConfigError::SectionMaxMismatch {
                    section: section.name.clone(),
                    declared: section.max,
                    computed: sum,
                });
            }
        }

        let maxima_total: u64 = self
            .sections
            .iter()
            .map(|section| u64::from(section.max))
            .sum();
        if maxima_total != u64::from(self.max_possible_total) {
            errors.push(ConfigError::TotalMismatch {
                declared: self.max_possible_total,
                computed: maxima_total,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationReport {
                assessment: self.id.clone(),
                errors,
            })
        }
    }

    /// Turns a raw answer (option value, or yes/no for group items) into an
    /// [`Answer`] carrying the points defined for it.
    pub fn resolve(&self, id: &str, value: &str) -> Result<Answer, AnswerError> {
        let value = value.trim();

        for question in &self.questions {
            match &question.kind {
                QuestionKind::SingleChoice { options } if question.id == id => {
                    return options
                        .iter()
                        .find(|option| option.value.eq_ignore_ascii_case(value))
                        .map(|option| Answer::new(option.value.clone(), option.points))
                        .ok_or_else(|| AnswerError::InvalidOption {
                            id: id.to_string(),
                            value: value.to_string(),
                            expected: options
                                .iter()
                                .map(|option| option.value.as_str())
                                .collect::<Vec<_>>()
                                .join(", "),
                        });
                }
                QuestionKind::SingleChoice { .. } => {}
                QuestionKind::YesNoGroup { items, .. } if question.id == id => {
                    return Err(AnswerError::GroupNotAnswerable {
                        id: id.to_string(),
                        items: items
                            .iter()
                            .map(|item| item.id.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    });
                }
                QuestionKind::YesNoGroup {
                    points_per_yes,
                    items,
                } => {
                    if !items.iter().any(|item| item.id == id) {
                        continue;
                    }
                    return match value.to_ascii_lowercase().as_str() {
                        YES | "y" => Ok(Answer::new(YES, *points_per_yes)),
                        NO | "n" => Ok(Answer::new(NO, 0)),
                        _ => Err(AnswerError::InvalidOption {
                            id: id.to_string(),
                            value: value.to_string(),
                            expected: format!("{YES}, {NO}"),
                        }),
                    };
                }
            }
        }

        Err(AnswerError::UnknownQuestion(id.to_string()))
    }

    /// Resolves a whole map of raw answers, failing on the first bad entry.
    pub fn resolve_all(&self, raw: &BTreeMap<String, String>) -> Result<Answers, AnswerError> {
        raw.iter()
            .map(|(id, value)| Ok((id.clone(), self.resolve(id, value)?)))
            .collect()
    }
}

fn group_item_ids(question: &Question) -> impl Iterator<Item = &str> {
    let items: &[SubQuestion] = match &question.kind {
        QuestionKind::YesNoGroup { items, .. } => items,
        QuestionKind::SingleChoice { .. } => &[],
    };
    items.iter().map(|item| item.id.as_str())
}
