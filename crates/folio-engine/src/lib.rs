//! Page reconciliation layer.
//!
//! This crate composes renderable pages from three sources: the local
//! document store, a remote comic provider, and the local comment log.
//! Providers are adapters behind [`ContentProvider`]; this crate owns the
//! fallback policy between them.

pub mod engine;
pub mod page;
pub mod provider;
pub mod xkcd;

pub use engine::{CommentReceipt, DocumentMode, DocumentOutcome, Engine, EngineError};
pub use page::{ComicPage, Page};
pub use provider::{ContentProvider, ProviderError, RemoteContent};
pub use xkcd::{ProviderConfig, XkcdProvider};
