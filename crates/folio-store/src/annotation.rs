//! Append-only comment logs, one JSONL file per comic identifier.
//!
//! `folio.annotation.v1` records carry their own identifier and timestamp so a
//! log can be replayed without any side table.

use crate::error::StoreError;
use crate::id::PageId;
use crate::jsonl::{JsonlError, append_record, read_records};
use crate::lock::KeyedLocks;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ANNOTATION_SCHEMA: &str = "folio.annotation.v1";

fn default_annotation_schema() -> String {
    ANNOTATION_SCHEMA.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    #[serde(default = "default_annotation_schema")]
    pub schema: String,
    pub id: PageId,
    pub recorded_at: DateTime<Utc>,
    pub text: String,
}

impl AnnotationEntry {
    pub fn new(id: PageId, text: impl Into<String>) -> Self {
        Self {
            schema: ANNOTATION_SCHEMA.to_string(),
            id,
            recorded_at: Utc::now(),
            text: text.into(),
        }
    }
}

#[derive(Debug)]
pub struct AnnotationLog {
    root: PathBuf,
    locks: KeyedLocks,
}

impl AnnotationLog {
    /// Logs rooted at `root`. The directory is created on first append.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: KeyedLocks::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &PageId) -> PathBuf {
        self.root.join(format!("{id}.jsonl"))
    }

    /// Append one timestamped entry. Appends to one identifier are serialized.
    pub fn append(&self, id: &PageId, text: &str) -> Result<AnnotationEntry, StoreError> {
        let path = self.path_for(id);
        let entry = AnnotationEntry::new(id.clone(), text);
        self.locks
            .with_key(id, || append_record(&path, &entry))
            .map_err(|err| map_jsonl_error("append to", id, &path, err))?;
        Ok(entry)
    }

    /// Every entry ever appended for `id`, in append order.
    pub fn read_all(&self, id: &PageId) -> Result<Vec<AnnotationEntry>, StoreError> {
        let path = self.path_for(id);
        read_records(&path).map_err(|err| map_jsonl_error("read", id, &path, err))
    }
}

fn map_jsonl_error(op: &'static str, id: &PageId, path: &Path, err: JsonlError) -> StoreError {
    tracing::error!(path = %path.display(), error = %err, "annotation log {op} failed");
    match err {
        JsonlError::Io(source) => StoreError::io(op, id.as_str(), source),
        JsonlError::Serialize(message) => StoreError::Serialize {
            id: id.to_string(),
            message,
        },
        JsonlError::Corrupt { line, message } => StoreError::Corrupt {
            id: id.to_string(),
            line,
            message,
        },
    }
}
