//! HTTP surface for folio.
//!
//! Requests flow through one generic dispatch layer: the route table
//! validates the path into a `PageId`, the engine reconciles the page, and the
//! renderer turns it into bytes. Configuration is built once at startup and
//! handed down explicitly; nothing here is global.

pub mod config;
pub mod error;
pub mod middleware;
pub mod render;
pub mod route;
pub mod server;

pub use config::{ConfigError, SiteConfig};
pub use error::ApiError;
pub use render::{HtmlRenderer, RenderError, Renderer, escape_html};
pub use route::{
    Dispatch, Handler, PathValidator, Rejected, RouteConfigError, RouteEntry, RouteTable, TokenRule,
};
pub use server::{AppState, ServeError, app, build_state, serve};
