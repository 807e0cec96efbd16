//! Record of comics served, newest last.

use crate::error::StoreError;
use crate::jsonl::{JsonlError, append_record, read_records};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub const HISTORY_SCHEMA: &str = "folio.history.v1";

fn default_history_schema() -> String {
    HISTORY_SCHEMA.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default = "default_history_schema")]
    pub schema: String,
    pub recorded_at: DateTime<Utc>,
    pub number: u32,
    pub title: String,
    pub image_url: String,
}

impl HistoryEntry {
    pub fn new(number: u32, title: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            schema: HISTORY_SCHEMA.to_string(),
            recorded_at: Utc::now(),
            number,
            title: title.into(),
            image_url: image_url.into(),
        }
    }
}

#[derive(Debug)]
pub struct HistoryLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryLog {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &HistoryEntry) -> Result<(), StoreError> {
        let _held = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        append_record(&self.path, entry).map_err(|err| self.map_error("append to", err))
    }

    pub fn read_all(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        read_records(&self.path).map_err(|err| self.map_error("read", err))
    }

    fn map_error(&self, op: &'static str, err: JsonlError) -> StoreError {
        tracing::error!(path = %self.path.display(), error = %err, "history log {op} failed");
        match err {
            JsonlError::Io(source) => StoreError::io(op, "history", source),
            JsonlError::Serialize(message) => StoreError::Serialize {
                id: "history".to_string(),
                message,
            },
            JsonlError::Corrupt { line, message } => StoreError::Corrupt {
                id: "history".to_string(),
                line,
                message,
            },
        }
    }
}
