//! # Document Service Module
//!
//! Routes every request under `/api/Document` to its handler. One sub-module
//! per endpoint, each exposing a `process` handler.
//!
//! ## Sub-modules:
//! - `list`: lists the stored documents.
//! - `create`: creates a document from the empty template.
//! - `config`: builds the editor configuration for a document.
//! - `callback`: receives the editing server's status callbacks.
//! - `fill`: pre-fills a PDF form with default values.

mod callback;
mod config;
mod create;
mod fill;
mod list;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// The base path for all document API endpoints.
const API_PATH: &str = "/api/Document";

/// Configures and returns the Actix `Scope` for all document routes.
///
/// # Registered Routes:
///
/// *   **`GET /`**: `list::process`. Every stored file as a `DocumentSummary`.
///
/// *   **`POST /`**: `create::process`. Expects `{"title": ...}` (title
///     optional) and answers with the new `DocumentSummary`.
///
/// *   **`GET /{id}?fileType=..&mode=..`**: `config::process`. The editor
///     configuration; `400` for an unknown mode, `404` for an unknown id.
///
/// *   **`POST /{id}/callback`**: `callback::process`. The editing server's
///     status callback; answers `{"error":0}` when handled.
///
/// *   **`POST /{id}/fill`**: `fill::process`. Expects a JSON object of
///     field name to value, writes the `_auto` copy of the form and answers
///     with its `fileName` and download `url`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("", post().to(create::process))
        .route("/{id}", get().to(config::process))
        .route("/{id}/callback", post().to(callback::process))
        .route("/{id}/fill", post().to(fill::process))
}
