//! Path validation and the dispatch table.
//!
//! A path is accepted only in the shape `/<operation>/<token>`, where the
//! operation is enabled for this deployment and the token is one or more
//! ASCII alphanumerics. The first table entry that accepts both method and
//! path wins; handlers only ever see the validated `PageId`.

use axum::http::Method;
use folio_store::PageId;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    ViewDocument,
    EditDocument,
    SaveDocument,
    ShowComic,
    PostComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRule {
    Required,
    /// `/<op>`, `/<op>/` and `/<op>/<token>` all match; the first two carry no id.
    Optional,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("rejected path: {0}")]
pub struct Rejected(pub String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteConfigError {
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    #[error("operation `{0}` listed more than once")]
    DuplicateOperation(String),

    #[error("invalid operation name `{0}`")]
    InvalidOperation(String),
}

#[derive(Debug, Clone)]
pub struct PathValidator {
    operation: String,
    token: TokenRule,
    pattern: Regex,
}

impl PathValidator {
    pub fn new(operation: &str, token: TokenRule) -> Result<Self, RouteConfigError> {
        if operation.is_empty()
            || !operation
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(RouteConfigError::InvalidOperation(operation.to_string()));
        }

        let op = regex::escape(operation);
        let source = match token {
            TokenRule::Required => format!("^/{op}/([A-Za-z0-9]+)$"),
            TokenRule::Optional => format!("^/{op}(?:/([A-Za-z0-9]+)?)?$"),
        };
        let pattern = Regex::new(&source)
            .map_err(|_| RouteConfigError::InvalidOperation(operation.to_string()))?;

        Ok(Self {
            operation: operation.to_string(),
            token,
            pattern,
        })
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn token(&self) -> TokenRule {
        self.token
    }

    /// Extract the identifier from `path`, or reject it.
    ///
    /// `Ok(None)` is only possible for [`TokenRule::Optional`].
    pub fn validate(&self, path: &str) -> Result<Option<PageId>, Rejected> {
        let captures = self
            .pattern
            .captures(path)
            .ok_or_else(|| Rejected(path.to_string()))?;
        match captures.get(1) {
            Some(token) => PageId::parse(token.as_str())
                .map(Some)
                .map_err(|_| Rejected(path.to_string())),
            None if self.token == TokenRule::Optional => Ok(None),
            None => Err(Rejected(path.to_string())),
        }
    }

    fn describe(&self) -> String {
        match self.token {
            TokenRule::Required => format!("/{}/{{id}}", self.operation),
            TokenRule::Optional => format!("/{}/{{id?}}", self.operation),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub method: Method,
    pub validator: PathValidator,
    pub handler: Handler,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Matched {
        handler: Handler,
        id: Option<PageId>,
    },
    MethodNotAllowed,
    NotFound,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(
        mut self,
        method: Method,
        operation: &str,
        token: TokenRule,
        handler: Handler,
    ) -> Result<Self, RouteConfigError> {
        if self
            .entries
            .iter()
            .any(|entry| entry.validator.operation() == operation && entry.method == method)
        {
            return Err(RouteConfigError::DuplicateOperation(operation.to_string()));
        }
        self.entries.push(RouteEntry {
            method,
            validator: PathValidator::new(operation, token)?,
            handler,
        });
        Ok(self)
    }

    /// Table for the named operations, in the order given.
    pub fn from_operations<S: AsRef<str>>(operations: &[S]) -> Result<Self, RouteConfigError> {
        operations.iter().try_fold(Self::new(), |table, op| {
            let op = op.as_ref();
            let (method, token, handler) = match op {
                "view" => (Method::GET, TokenRule::Required, Handler::ViewDocument),
                "edit" => (Method::GET, TokenRule::Required, Handler::EditDocument),
                "save" => (Method::POST, TokenRule::Required, Handler::SaveDocument),
                "xkcd" => (Method::GET, TokenRule::Optional, Handler::ShowComic),
                "comment" => (Method::POST, TokenRule::Required, Handler::PostComment),
                other => return Err(RouteConfigError::UnknownOperation(other.to_string())),
            };
            table.route(method, op, token, handler)
        })
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Operation name mounted for `handler`, if any.
    pub fn operation_for(&self, handler: Handler) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.handler == handler)
            .map(|entry| entry.validator.operation())
    }

    pub fn dispatch(&self, method: &Method, path: &str) -> Dispatch {
        let mut path_matched = false;
        for entry in &self.entries {
            let Ok(id) = entry.validator.validate(path) else {
                continue;
            };
            if entry.method == *method {
                return Dispatch::Matched {
                    handler: entry.handler,
                    id,
                };
            }
            path_matched = true;
        }
        if path_matched {
            Dispatch::MethodNotAllowed
        } else {
            Dispatch::NotFound
        }
    }

    /// Human-readable listing, e.g. `GET /view/{id}`.
    pub fn describe(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| format!("{} {}", entry.method, entry.validator.describe()))
            .collect()
    }
}
