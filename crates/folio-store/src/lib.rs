//! # folio-store
//!
//! Local persistence layer for folio pages.
//!
//! This crate provides:
//! - `PageId` (the only key any store accepts)
//! - `DocumentStore` (one atomically replaced file per document)
//! - `AnnotationLog` (append-only JSONL comment log per comic)
//! - `HistoryLog` (append-only record of comics served)
//!
//! It intentionally knows nothing about remote providers or HTTP.
//! Reconciliation lives in `folio-engine`.
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/
//!     documents/<id>.txt        whole-file replace via temp + rename
//!     annotations/<id>.jsonl    one JSON record per line, append only
//!     history.jsonl             one JSON record per served comic
//! ```

pub mod annotation;
pub mod atomic;
pub mod document;
pub mod error;
pub mod history;
pub mod id;
mod jsonl;
pub mod lock;

pub use annotation::{ANNOTATION_SCHEMA, AnnotationEntry, AnnotationLog};
pub use atomic::write_atomic;
pub use document::{DocumentPage, DocumentStore};
pub use error::StoreError;
pub use history::{HISTORY_SCHEMA, HistoryEntry, HistoryLog};
pub use id::{PageId, PageIdError};
pub use lock::KeyedLocks;
