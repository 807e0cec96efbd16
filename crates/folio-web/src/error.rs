//! HTTP error mapping.

use crate::render::RenderError;
use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use folio_engine::EngineError;

/// Error wrapper for converting folio errors to HTTP responses.
///
/// Bodies are short plain-text messages. Detail that could leak internal
/// layout is logged, not returned.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    MethodNotAllowed,
    /// Unreadable submission: wrong content type, bad encoding, or too large.
    Form(FormRejection),
    Engine(EngineError),
    Render(RenderError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::Engine(EngineError::Rejected(_)) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Form(rejection) => rejection.status(),
            Self::Engine(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::NotFound | Self::Engine(EngineError::Rejected(_)) => {
                "404 page not found".to_string()
            }
            Self::MethodNotAllowed => "405 method not allowed".to_string(),
            Self::Form(rejection) => rejection.body_text(),
            Self::Engine(EngineError::Unavailable(_)) => "comic provider unavailable".to_string(),
            Self::Engine(EngineError::Store(err)) => err.to_string(),
            Self::Engine(EngineError::Join(_)) => "internal server error".to_string(),
            Self::Render(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "request failed");
        }
        (
            status,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", self.message()),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(err)
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::Render(err)
    }
}
