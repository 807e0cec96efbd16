//! Axum server wiring the dispatch layer to the engine and renderer.

use crate::config::SiteConfig;
use crate::error::ApiError;
use crate::middleware::TracingLayer;
use crate::render::{HtmlRenderer, Renderer};
use crate::route::{Dispatch, Handler, RouteConfigError, RouteTable};
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use folio_engine::{DocumentMode, DocumentOutcome, Engine, Page, ProviderError, XkcdProvider};
use folio_store::{AnnotationLog, DocumentStore, HistoryLog, PageId};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;

/// Shared application state. Built once, read-only afterwards.
pub struct AppState {
    pub engine: Engine,
    pub renderer: Arc<dyn Renderer>,
    pub routes: RouteTable,
}

impl AppState {
    fn path_for(&self, handler: Handler, fallback: &str, id: &PageId) -> String {
        let op = self.routes.operation_for(handler).unwrap_or(fallback);
        format!("/{op}/{id}")
    }
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("invalid route table: {0}")]
    Routes(#[from] RouteConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("bind {addr} failed: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server failed: {0}")]
    Serve(std::io::Error),
}

/// Form fields accepted by the submit handlers. Missing fields are empty.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitForm {
    pub body: Option<String>,
    pub comment: Option<String>,
}

pub fn build_state(config: &SiteConfig) -> Result<AppState, ServeError> {
    let routes = RouteTable::from_operations(&config.operations)?;
    let provider = XkcdProvider::new(&config.provider)?;
    let documents = Arc::new(DocumentStore::open(config.documents_dir()));
    let annotations = Arc::new(AnnotationLog::open(config.annotations_dir()));

    let mut engine = Engine::new(documents, annotations, Arc::new(provider));
    if config.record_history {
        engine = engine.with_history(Arc::new(HistoryLog::open(config.history_path())));
    }

    let renderer = Arc::new(HtmlRenderer::for_routes(&routes));
    Ok(AppState {
        engine,
        renderer,
        routes,
    })
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/-/healthy", get(handle_healthy))
        .fallback(handle_dispatch)
        .layer(TracingLayer::new())
        .with_state(state)
}

pub async fn serve(config: SiteConfig) -> Result<(), ServeError> {
    let state = Arc::new(build_state(&config)?);
    for route in state.routes.describe() {
        tracing::info!(route = %route, "route mounted");
    }

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.bind,
            source,
        })?;
    tracing::info!(
        addr = %config.bind,
        data_dir = %config.data_dir.display(),
        history = config.record_history,
        "folio listening"
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServeError::Serve)?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

/// Handle GET /
async fn handle_index(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "service": "folio",
        "routes": state.routes.describe(),
    }))
}

/// Handle GET /-/healthy
async fn handle_healthy() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Every other path goes through the route table.
async fn handle_dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    form: Result<Form<SubmitForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let (handler, id) = match state.routes.dispatch(&method, uri.path()) {
        Dispatch::Matched { handler, id } => (handler, id),
        Dispatch::MethodNotAllowed => return Err(ApiError::MethodNotAllowed),
        Dispatch::NotFound => return Err(ApiError::NotFound),
    };

    match (handler, id) {
        (Handler::ShowComic, id) => show_comic(&state, id.as_ref()).await,
        (_, None) => Err(ApiError::NotFound),
        (Handler::ViewDocument, Some(id)) => show_document(&state, &id, DocumentMode::View).await,
        (Handler::EditDocument, Some(id)) => show_document(&state, &id, DocumentMode::Edit).await,
        (Handler::SaveDocument, Some(id)) => match read_form(form)? {
            SubmitForm {
                body: None,
                comment: Some(comment),
            } => post_comment(&state, &id, comment).await,
            SubmitForm { body, .. } => save_document(&state, &id, body.unwrap_or_default()).await,
        },
        (Handler::PostComment, Some(id)) => {
            let form = read_form(form)?;
            post_comment(&state, &id, form.comment.unwrap_or_default()).await
        }
    }
}

/// A form that cannot be read never reaches a store.
fn read_form(form: Result<Form<SubmitForm>, FormRejection>) -> Result<SubmitForm, ApiError> {
    match form {
        Ok(Form(form)) => Ok(form),
        Err(rejection) => {
            tracing::debug!(
                status = rejection.status().as_u16(),
                error = %rejection,
                "rejecting unreadable form"
            );
            Err(ApiError::Form(rejection))
        }
    }
}

async fn show_document(
    state: &AppState,
    id: &PageId,
    mode: DocumentMode,
) -> Result<Response, ApiError> {
    let template = match mode {
        DocumentMode::View => "view",
        DocumentMode::Edit => "edit",
    };
    match state.engine.resolve_document(id, mode).await? {
        DocumentOutcome::Found(page) | DocumentOutcome::Blank(page) => {
            render(state, template, &Page::Document(page))
        }
        DocumentOutcome::RedirectToEdit(id) => {
            Ok(found(state.path_for(Handler::EditDocument, "edit", &id)))
        }
    }
}

async fn save_document(state: &AppState, id: &PageId, body: String) -> Result<Response, ApiError> {
    state.engine.save_document(id, body.into_bytes()).await?;
    Ok(found(state.path_for(Handler::ViewDocument, "view", id)))
}

async fn show_comic(state: &AppState, id: Option<&PageId>) -> Result<Response, ApiError> {
    let page = state.engine.resolve_comic(id).await?;
    render(state, "comic", &Page::Comic(page))
}

async fn post_comment(state: &AppState, id: &PageId, text: String) -> Result<Response, ApiError> {
    let receipt = state.engine.post_comment(id, text).await?;
    Ok(found(state.path_for(Handler::ShowComic, "xkcd", &receipt.id)))
}

fn render(state: &AppState, template: &str, page: &Page) -> Result<Response, ApiError> {
    let bytes = state.renderer.render(template, page)?;
    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, "text/html; charset=utf-8")],
        bytes,
    )
        .into_response())
}

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
