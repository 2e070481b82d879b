use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("question {question} references unknown section {section:?}")]
    UnknownSection { question: String, section: String },
    #[error("section {section:?} declares max {declared} but its questions add up to {computed}")]
    SectionMaxMismatch {
        section: String,
        declared: u32,
        computed: u64,
    },
    #[error("max_possible_total is {declared} but section maxima add up to {computed}")]
    TotalMismatch { declared: u32, computed: u64 },
    #[error("max_possible_total must be greater than zero")]
    ZeroTotal,
    #[error("duplicate section {0:?}")]
    DuplicateSection(String),
    #[error("section {0:?} has no questions")]
    EmptySection(String),
    #[error("duplicate question id {0}")]
    DuplicateId(String),
    #[error("question {question} has duplicate option value {value:?}")]
    DuplicateOption { question: String, value: String },
    #[error("question {0} has no options")]
    NoOptions(String),
    #[error("yes/no group {0} has no items")]
    EmptyGroup(String),
    #[error("invalid id {0:?}: use lowercase letters, digits, '-' or '_'")]
    InvalidId(String),
}

/// Every problem found while validating one assessment definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("assessment {assessment} is inconsistent: {}", join_errors(.errors))]
pub struct ValidationReport {
    pub assessment: String,
    pub errors: Vec<ConfigError>,
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnswerError {
    #[error("unknown question id {0}")]
    UnknownQuestion(String),
    #[error("{id} is a yes/no group; answer its items ({items}) instead")]
    GroupNotAnswerable { id: String, items: String },
    #[error("invalid answer {value:?} for {id}, expected one of: {expected}")]
    InvalidOption {
        id: String,
        value: String,
        expected: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}
