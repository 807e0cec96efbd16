//! Reconciliation of local stores with the remote provider.
//!
//! Fallback policy:
//! - documents have no remote source: a missing page is a redirect (view) or a
//!   blank form (edit), never a fetch
//! - comics try the requested number, then a random comic, then give up
//! - comments come only from the annotation log and are read alongside the
//!   fetch
//! - a comment is recorded even when the provider is down

use crate::page::ComicPage;
use crate::provider::{ContentProvider, ProviderError, RemoteContent};
use folio_store::{
    AnnotationEntry, AnnotationLog, DocumentPage, DocumentStore, HistoryEntry, HistoryLog, PageId,
    StoreError,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("rejected identifier: {0}")]
    Rejected(String),

    #[error(transparent)]
    Unavailable(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("storage task failed: {0}")]
    Join(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentMode {
    View,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Found(DocumentPage),
    /// Edit of a page never saved: an empty body to fill in.
    Blank(DocumentPage),
    /// View of a page never saved: send the client to the edit form.
    RedirectToEdit(PageId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentReceipt {
    pub id: PageId,
    pub entry: AnnotationEntry,
    /// Canonical content re-fetched alongside the append, if the provider
    /// answered.
    pub echo: Option<RemoteContent>,
}

#[derive(Clone)]
pub struct Engine {
    documents: Arc<DocumentStore>,
    annotations: Arc<AnnotationLog>,
    history: Option<Arc<HistoryLog>>,
    provider: Arc<dyn ContentProvider>,
}

impl Engine {
    pub fn new(
        documents: Arc<DocumentStore>,
        annotations: Arc<AnnotationLog>,
        provider: Arc<dyn ContentProvider>,
    ) -> Self {
        Self {
            documents,
            annotations,
            history: None,
            provider,
        }
    }

    /// Record every comic served to `history`.
    pub fn with_history(mut self, history: Arc<HistoryLog>) -> Self {
        self.history = Some(history);
        self
    }

    pub async fn resolve_document(
        &self,
        id: &PageId,
        mode: DocumentMode,
    ) -> Result<DocumentOutcome, EngineError> {
        let documents = Arc::clone(&self.documents);
        let key = id.clone();
        let loaded = blocking(move || documents.load(&key)).await??;

        Ok(match (loaded, mode) {
            (Some(page), _) => DocumentOutcome::Found(page),
            (None, DocumentMode::View) => DocumentOutcome::RedirectToEdit(id.clone()),
            (None, DocumentMode::Edit) => DocumentOutcome::Blank(DocumentPage::blank(id.clone())),
        })
    }

    pub async fn save_document(&self, id: &PageId, body: Vec<u8>) -> Result<(), EngineError> {
        let documents = Arc::clone(&self.documents);
        let page = DocumentPage::new(id.clone(), body);
        blocking(move || documents.save(&page)).await??;
        tracing::info!(id = %id, "document saved");
        Ok(())
    }

    /// Compose a comic page for `id`, or for a random comic when `id` is absent.
    ///
    /// On failure no store has been written.
    pub async fn resolve_comic(&self, id: Option<&PageId>) -> Result<ComicPage, EngineError> {
        let requested = match id {
            Some(id) => {
                let number = id.comic_number();
                if number.is_none() {
                    tracing::warn!(id = %id, "comic identifier is not numeric, falling back to random");
                }
                number
            }
            None => None,
        };

        let (content, prefetched) = match requested {
            Some(number) => {
                let key = PageId::from_number(number);
                let (content, comments) =
                    tokio::join!(self.fetch_with_fallback(number), self.read_comments(key));
                (content?, Some((number, comments)))
            }
            None => (self.fetch_random().await?, None),
        };

        let entries = match prefetched {
            Some((number, comments)) if number == content.number => comments?,
            _ => {
                self.read_comments(PageId::from_number(content.number))
                    .await?
            }
        };

        let page = ComicPage::compose(content, entries);
        self.record_history(&page).await;
        Ok(page)
    }

    /// Append `text` to the comment log of comic `id`.
    ///
    /// The append and a canonical re-fetch run concurrently; a provider
    /// failure only empties the receipt's echo. Empty text is recorded.
    pub async fn post_comment(&self, id: &PageId, text: String) -> Result<CommentReceipt, EngineError> {
        let number = id
            .comic_number()
            .ok_or_else(|| EngineError::Rejected(id.to_string()))?;
        let key = PageId::from_number(number);

        let annotations = Arc::clone(&self.annotations);
        let append_key = key.clone();
        let append = blocking(move || annotations.append(&append_key, &text));
        let (entry, echo) = tokio::join!(append, self.provider.fetch_by_id(number));
        let entry = entry??;

        let echo = match echo {
            Ok(content) => {
                tracing::debug!(id = %key, title = %content.safe_title, "comment recorded");
                Some(content)
            }
            Err(err) => {
                tracing::warn!(id = %key, error = %err, "comment recorded without canonical content");
                None
            }
        };

        Ok(CommentReceipt {
            id: key,
            entry,
            echo,
        })
    }

    async fn fetch_with_fallback(&self, number: u32) -> Result<RemoteContent, ProviderError> {
        match self.provider.fetch_by_id(number).await {
            Ok(content) => Ok(content),
            Err(err) => {
                tracing::warn!(number, error = %err, "comic fetch failed, falling back to random");
                self.fetch_random().await
            }
        }
    }

    async fn fetch_random(&self) -> Result<RemoteContent, ProviderError> {
        self.provider.fetch_random().await.inspect_err(|err| {
            tracing::error!(error = %err, "random comic fetch failed");
        })
    }

    async fn read_comments(&self, key: PageId) -> Result<Vec<AnnotationEntry>, EngineError> {
        let annotations = Arc::clone(&self.annotations);
        Ok(blocking(move || annotations.read_all(&key)).await??)
    }

    async fn record_history(&self, page: &ComicPage) {
        let Some(history) = self.history.clone() else {
            return;
        };
        let entry = HistoryEntry::new(page.number, page.safe_title.clone(), page.image_url.clone());
        match blocking(move || history.append(&entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(error = %err, "failed to record comic history"),
            Err(err) => tracing::warn!(error = %err, "failed to record comic history"),
        }
    }
}

/// Run blocking store I/O off the async workers. The task runs to completion
/// even if the awaiting request is dropped.
async fn blocking<T, F>(f: F) -> Result<T, EngineError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| EngineError::Join(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    struct TempDirGuard {
        path: PathBuf,
    }

    impl TempDirGuard {
        fn new(prefix: &str) -> Self {
            let unique = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock should be after unix epoch")
                .as_nanos();
            let path = std::env::temp_dir().join(format!(
                "folio-engine-{prefix}-{}-{unique}",
                std::process::id()
            ));
            std::fs::create_dir_all(&path).expect("temp dir should be created");
            Self { path }
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TempDirGuard {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    #[derive(Default)]
    struct StubProvider {
        known: Vec<u32>,
        random: Option<u32>,
        calls: Mutex<Vec<String>>,
    }

    impl StubProvider {
        fn content(number: u32) -> RemoteContent {
            RemoteContent {
                number,
                title: format!("Comic {number}"),
                safe_title: format!("Comic {number}"),
                alt: format!("alt {number}"),
                image_url: format!("https://imgs.example/{number}.png"),
                transcript: String::new(),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl ContentProvider for StubProvider {
        async fn fetch_by_id(&self, number: u32) -> Result<RemoteContent, ProviderError> {
            self.calls.lock().expect("calls lock").push(format!("id:{number}"));
            if self.known.contains(&number) {
                Ok(Self::content(number))
            } else {
                Err(ProviderError::Unavailable(format!("no comic {number}")))
            }
        }

        async fn fetch_random(&self) -> Result<RemoteContent, ProviderError> {
            self.calls.lock().expect("calls lock").push("random".to_string());
            self.random
                .map(Self::content)
                .ok_or_else(|| ProviderError::Unavailable("random down".to_string()))
        }
    }

    struct Fixture {
        _tmp: TempDirGuard,
        engine: Engine,
        provider: Arc<StubProvider>,
        annotations: Arc<AnnotationLog>,
        history: Arc<HistoryLog>,
    }

    fn fixture(prefix: &str, provider: StubProvider) -> Fixture {
        let tmp = TempDirGuard::new(prefix);
        let provider = Arc::new(provider);
        let documents = Arc::new(DocumentStore::open(tmp.path().join("documents")));
        let annotations = Arc::new(AnnotationLog::open(tmp.path().join("annotations")));
        let history = Arc::new(HistoryLog::open(tmp.path().join("history.jsonl")));
        let engine = Engine::new(documents, Arc::clone(&annotations), provider.clone())
            .with_history(Arc::clone(&history));
        Fixture {
            _tmp: tmp,
            engine,
            provider,
            annotations,
            history,
        }
    }

    fn id(token: &str) -> PageId {
        PageId::parse(token).expect("fixture id should parse")
    }

    #[tokio::test]
    async fn view_of_missing_document_redirects_without_fetching() {
        let fx = fixture("doc-missing", StubProvider::default());
        let outcome = fx
            .engine
            .resolve_document(&id("NewPage"), DocumentMode::View)
            .await
            .expect("resolve should succeed");
        assert_eq!(outcome, DocumentOutcome::RedirectToEdit(id("NewPage")));
        assert!(fx.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn edit_then_save_then_view() {
        let fx = fixture("doc-flow", StubProvider::default());

        let outcome = fx
            .engine
            .resolve_document(&id("NewPage"), DocumentMode::Edit)
            .await
            .expect("edit should succeed");
        assert_eq!(outcome, DocumentOutcome::Blank(DocumentPage::blank(id("NewPage"))));

        fx.engine
            .save_document(&id("NewPage"), b"hello".to_vec())
            .await
            .expect("save should succeed");

        match fx
            .engine
            .resolve_document(&id("NewPage"), DocumentMode::View)
            .await
            .expect("view should succeed")
        {
            DocumentOutcome::Found(page) => assert_eq!(page.body, b"hello"),
            other => panic!("expected saved page, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn comic_combines_provider_fields_with_comment_log() {
        let fx = fixture("comic", StubProvider {
            known: vec![42],
            ..StubProvider::default()
        });
        fx.annotations
            .append(&id("42"), "first")
            .expect("seed append should succeed");
        fx.annotations
            .append(&id("42"), "second\nline")
            .expect("seed append should succeed");

        let page = fx
            .engine
            .resolve_comic(Some(&id("42")))
            .await
            .expect("comic should resolve");

        assert_eq!(page.number, 42);
        assert_eq!(page.safe_title, "Comic 42");
        assert_eq!(page.comments, vec!["first", "second\nline"]);
        assert_eq!(fx.provider.calls(), vec!["id:42"]);
    }

    #[tokio::test]
    async fn unavailable_id_falls_back_to_random_with_its_own_comments() {
        let fx = fixture("fallback", StubProvider {
            random: Some(7),
            ..StubProvider::default()
        });
        fx.annotations
            .append(&id("42"), "about 42")
            .expect("seed append should succeed");
        fx.annotations
            .append(&id("7"), "about 7")
            .expect("seed append should succeed");

        let page = fx
            .engine
            .resolve_comic(Some(&id("42")))
            .await
            .expect("fallback should resolve");

        assert_eq!(page.number, 7);
        assert_eq!(page.id, id("7"));
        assert_eq!(page.comments, vec!["about 7"]);
        assert_eq!(fx.provider.calls(), vec!["id:42", "random"]);
    }

    #[tokio::test]
    async fn non_numeric_comic_id_goes_straight_to_random() {
        let fx = fixture("non-numeric", StubProvider {
            random: Some(3),
            ..StubProvider::default()
        });
        let page = fx
            .engine
            .resolve_comic(Some(&id("abc")))
            .await
            .expect("random should resolve");
        assert_eq!(page.number, 3);
        assert_eq!(fx.provider.calls(), vec!["random"]);
    }

    #[tokio::test]
    async fn double_failure_is_unavailable_and_writes_nothing() {
        let fx = fixture("double-failure", StubProvider::default());

        let err = fx
            .engine
            .resolve_comic(Some(&id("42")))
            .await
            .expect_err("both fetches fail");

        assert!(matches!(err, EngineError::Unavailable(_)));
        assert_eq!(fx.provider.calls(), vec!["id:42", "random"]);
        assert!(!fx.annotations.root().exists());
        assert!(!fx.history.path().exists());
    }

    #[tokio::test]
    async fn absent_id_uses_random_and_preexisting_log() {
        let fx = fixture("absent", StubProvider {
            random: Some(11),
            ..StubProvider::default()
        });
        fx.annotations
            .append(&id("11"), "already here")
            .expect("seed append should succeed");

        let page = fx
            .engine
            .resolve_comic(None)
            .await
            .expect("random should resolve");

        assert_eq!(page.number, 11);
        assert_eq!(page.comments, vec!["already here"]);
        assert_eq!(fx.provider.calls(), vec!["random"]);

        let history = fx.history.read_all().expect("history should read");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].number, 11);
    }

    #[tokio::test]
    async fn comment_is_recorded_when_provider_is_down() {
        let fx = fixture("comment-down", StubProvider::default());

        let receipt = fx
            .engine
            .post_comment(&id("42"), "nice one".to_string())
            .await
            .expect("append should succeed without provider");

        assert_eq!(receipt.id, id("42"));
        assert_eq!(receipt.echo, None);
        let texts: Vec<String> = fx
            .annotations
            .read_all(&id("42"))
            .expect("log should read")
            .into_iter()
            .map(|entry| entry.text)
            .collect();
        assert_eq!(texts, vec!["nice one"]);
    }

    #[tokio::test]
    async fn comment_then_view_shows_comment_with_fresh_fields() {
        let fx = fixture("comment-view", StubProvider {
            known: vec![42],
            ..StubProvider::default()
        });

        let receipt = fx
            .engine
            .post_comment(&id("42"), "nice one".to_string())
            .await
            .expect("comment should post");
        assert_eq!(
            receipt.echo.map(|content| content.number),
            Some(42),
            "echo should carry canonical content"
        );

        let page = fx
            .engine
            .resolve_comic(Some(&id("42")))
            .await
            .expect("comic should resolve");
        assert_eq!(page.comments, vec!["nice one"]);
        assert_eq!(page.alt, "alt 42");
        assert_eq!(fx.provider.calls(), vec!["id:42", "id:42"]);
    }

    #[tokio::test]
    async fn empty_comment_is_still_appended_under_canonical_id() {
        let fx = fixture("comment-empty", StubProvider::default());
        fx.engine
            .post_comment(&id("0042"), String::new())
            .await
            .expect("empty comment should append");

        let entries = fx.annotations.read_all(&id("42")).expect("log should read");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "");
    }

    #[tokio::test]
    async fn comment_on_non_numeric_id_is_rejected() {
        let fx = fixture("comment-reject", StubProvider::default());
        let err = fx
            .engine
            .post_comment(&id("FrontPage"), "hi".to_string())
            .await
            .expect_err("document ids carry no comments");
        assert!(matches!(err, EngineError::Rejected(_)));
        assert!(fx.provider.calls().is_empty());
    }
}
