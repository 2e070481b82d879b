pub mod file;

use crate::assessment::{Answers, Assessment};
use crate::config::Config;
use crate::core::AssessmentResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_USER: &str = "local";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed writing {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed reading {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("stored result {} is not valid: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed encoding result: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no stored result with id {0}")]
    NotFound(Uuid),
}

impl StoreError {
    /// I/O failures may succeed on a later attempt; malformed data will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Write { .. } | Self::Read { .. })
    }
}

/// Who a result belongs to. Passed explicitly rather than read from ambient
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: String,
    pub business_id: Option<String>,
}

impl SessionContext {
    /// CLI values win over `[context]` in the config file.
    pub fn resolve(cfg: &Config, user: Option<&str>, business: Option<&str>) -> Self {
        let user_id = user
            .map(str::to_string)
            .or_else(|| cfg.context.user_id.clone())
            .unwrap_or_else(|| DEFAULT_USER.to_string());
        let business_id = business
            .map(str::to_string)
            .or_else(|| cfg.context.business_id.clone());

        Self {
            user_id,
            business_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredResult {
    pub id: Uuid,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
    pub assessment_id: String,
    pub assessment_version: u32,
    pub completed_at: DateTime<Utc>,
    pub answers: Answers,
    pub result: AssessmentResult,
}

impl StoredResult {
    pub fn new(
        ctx: &SessionContext,
        assessment: &Assessment,
        answers: Answers,
        result: AssessmentResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: ctx.user_id.clone(),
            business_id: ctx.business_id.clone(),
            assessment_id: assessment.id.clone(),
            assessment_version: assessment.version,
            completed_at: Utc::now(),
            answers,
            result,
        }
    }
}

pub trait ResultStore {
    fn save(&self, record: &StoredResult) -> Result<(), StoreError>;
    fn load(&self, id: Uuid) -> Result<StoredResult, StoreError>;
    /// Records for `user_id` (or everyone), newest first.
    fn list(&self, user_id: Option<&str>) -> Result<Vec<StoredResult>, StoreError>;
}

/// Saves `record`, retrying retryable failures up to `attempts` times in total.
/// Returns the number of attempts used.
pub fn save_with_retry(
    store: &dyn ResultStore,
    record: &StoredResult,
    attempts: u32,
) -> Result<u32, StoreError> {
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match store.save(record) {
            Ok(()) => {
                info!(id = %record.id, attempt, "saved assessment result");
                return Ok(attempt);
            }
            Err(err) if err.is_retryable() && attempt < attempts => {
                warn!(id = %record.id, attempt, error = %err, "saving result failed, retrying");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
