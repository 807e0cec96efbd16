use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical comic fields supplied by a provider. Never persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteContent {
    pub number: u32,
    pub title: String,
    pub safe_title: String,
    pub alt: String,
    pub image_url: String,
    pub transcript: String,
}

/// Every provider failure (timeout, transport, 4xx/5xx, bad payload, unknown
/// number) collapses into one recoverable condition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn fetch_by_id(&self, number: u32) -> Result<RemoteContent, ProviderError>;
    async fn fetch_random(&self) -> Result<RemoteContent, ProviderError>;
}
