//! Validated page identifiers.
//!
//! A `PageId` is a non-empty ASCII alphanumeric token. Every store derives
//! its file names from a `PageId`, so an unvalidated request path can never
//! reach the filesystem.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageIdError {
    #[error("page identifier is empty")]
    Empty,

    #[error("page identifier has a non-alphanumeric character at byte {0}")]
    InvalidChar(usize),
}

impl PageId {
    pub fn parse(token: &str) -> Result<Self, PageIdError> {
        if token.is_empty() {
            return Err(PageIdError::Empty);
        }
        if let Some(pos) = token.bytes().position(|b| !b.is_ascii_alphanumeric()) {
            return Err(PageIdError::InvalidChar(pos));
        }
        Ok(Self(token.to_string()))
    }

    /// Canonical identifier for a numeric comic.
    pub fn from_number(number: u32) -> Self {
        Self(number.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Comic number carried by this identifier, if it is purely numeric.
    ///
    /// `"0042"` and `"42"` both yield `42`; use [`PageId::from_number`] to get
    /// the canonical key for log lookups.
    pub fn comic_number(&self) -> Option<u32> {
        if !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}

impl Display for PageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PageId {
    type Err = PageIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PageId {
    type Error = PageIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PageId> for String {
    fn from(id: PageId) -> Self {
        id.0
    }
}
