//! User-edited document pages: one file per identifier, replaced whole on
//! every save.

use crate::atomic::write_atomic;
use crate::error::StoreError;
use crate::id::PageId;
use crate::lock::KeyedLocks;
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPage {
    pub id: PageId,
    pub title: String,
    pub body: Vec<u8>,
}

impl DocumentPage {
    pub fn new(id: PageId, body: impl Into<Vec<u8>>) -> Self {
        let title = id.to_string();
        Self {
            id,
            title,
            body: body.into(),
        }
    }

    /// Empty page offered for editing when nothing has been saved yet.
    pub fn blank(id: PageId) -> Self {
        Self::new(id, Vec::new())
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[derive(Debug)]
pub struct DocumentStore {
    root: PathBuf,
    locks: KeyedLocks,
}

impl DocumentStore {
    /// Store rooted at `root`. The directory is created on first save.
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
        self.root.join(format!("{id}.txt"))
    }

    /// Load a document. `Ok(None)` means it was never saved.
    pub fn load(&self, id: &PageId) -> Result<Option<DocumentPage>, StoreError> {
        match fs::read(self.path_for(id)) {
            Ok(body) => Ok(Some(DocumentPage::new(id.clone(), body))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io("load", id.as_str(), err)),
        }
    }

    /// Replace the stored body for `page.id`. Last write wins.
    pub fn save(&self, page: &DocumentPage) -> Result<(), StoreError> {
        let path = self.path_for(&page.id);
        self.locks
            .with_key(&page.id, || write_atomic(&path, &page.body))
            .map_err(|err| {
                tracing::error!(path = %path.display(), error = %err, "document save failed");
                StoreError::io("save", page.id.as_str(), err)
            })
    }
}
