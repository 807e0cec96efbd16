/// Errors raised by folio's local stores.
///
/// Messages name the page identifier, never the filesystem path, so they can
/// be shown to HTTP clients as-is.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to {op} `{id}`: {source}")]
    Io {
        op: &'static str,
        id: String,
        source: std::io::Error,
    },

    #[error("failed to encode record for `{id}`: {message}")]
    Serialize { id: String, message: String },

    #[error("record log for `{id}` is corrupt at line {line}: {message}")]
    Corrupt {
        id: String,
        line: usize,
        message: String,
    },
}

impl StoreError {
    pub(crate) fn io(op: &'static str, id: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            id: id.into(),
            source,
        }
    }
}
