use crate::store::{ResultStore, StoreError, StoredResult};
use crate::utils::fs::{has_extension, write_atomic};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;
use walkdir::WalkDir;

/// One pretty-printed JSON file per result, named `<id>.json`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read_record(path: &Path) -> Result<StoredResult, StoreError> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ResultStore for FileStore {
    fn save(&self, record: &StoredResult) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(record.id);
        let bytes = serde_json::to_vec_pretty(record)?;
        write_atomic(&path, &bytes).map_err(|source| StoreError::Write { path, source })
    }

    fn load(&self, id: Uuid) -> Result<StoredResult, StoreError> {
        let path = self.path_for(id);
        if !path.is_file() {
            return Err(StoreError::NotFound(id));
        }
        Self::read_record(&path)
    }

    fn list(&self, user_id: Option<&str>) -> Result<Vec<StoredResult>, StoreError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() || !has_extension(entry.path(), "json") {
                continue;
            }

            let record = match Self::read_record(entry.path()) {
                Ok(record) => record,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable stored result");
                    continue;
                }
            };

            if user_id.is_some_and(|user| user != record.user_id) {
                continue;
            }
            records.push(record);
        }

        records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }
}
