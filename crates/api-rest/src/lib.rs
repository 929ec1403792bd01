//! # API REST
//!
//! The HTTP protocol surface of the VOR reference server.
//!
//! Handles:
//! - the wildcard resource-path routes (`/` and `/*path`)
//! - protocol selector parsing (`fcr:content`, `fcr:versions`, `fcr:tombstone`)
//! - the status-code contract (404 NotFound, 410 Gone, 409 Conflict,
//!   400 parse/validation, 2xx success) with structured error bodies
//!
//! Repository semantics live in `vor-core`; this crate only translates
//! between HTTP and the store.

mod error;
mod handlers;
mod protocol;

use std::sync::Arc;

use axum::routing::any;
use axum::Router;
use vor_core::RepositoryStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RepositoryStore>,
}

/// Build the protocol router over a repository store.
///
/// Every method on every path funnels through one dispatcher, because
/// resources live at arbitrary depth and the protocol uses extension verbs
/// (`MOVE`, `COPY`) axum's per-method routing does not cover.
pub fn build_router(store: Arc<RepositoryStore>) -> Router {
    Router::new()
        .route("/", any(handlers::dispatch_root))
        .route("/*path", any(handlers::dispatch))
        .with_state(AppState { store })
}
