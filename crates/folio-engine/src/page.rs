use crate::provider::RemoteContent;
use folio_store::{AnnotationEntry, DocumentPage, PageId};
use serde::Serialize;

/// Transient comic view composed per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComicPage {
    pub id: PageId,
    pub number: u32,
    pub title: String,
    pub safe_title: String,
    pub alt: String,
    pub image_url: String,
    pub transcript: String,
    pub comments: Vec<String>,
}

impl ComicPage {
    pub fn compose(content: RemoteContent, entries: Vec<AnnotationEntry>) -> Self {
        Self {
            id: PageId::from_number(content.number),
            number: content.number,
            title: content.title,
            safe_title: content.safe_title,
            alt: content.alt,
            image_url: content.image_url,
            transcript: content.transcript,
            comments: entries.into_iter().map(|entry| entry.text).collect(),
        }
    }
}

/// Anything a renderer can draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Document(DocumentPage),
    Comic(ComicPage),
}

impl Page {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::Comic(_) => "comic",
        }
    }

    pub fn id(&self) -> &PageId {
        match self {
            Self::Document(page) => &page.id,
            Self::Comic(page) => &page.id,
        }
    }
}
