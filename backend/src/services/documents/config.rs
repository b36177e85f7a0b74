//! # Editor Configuration
//!
//! `GET /api/Document/{id}?fileType=docx&mode=edit` answers with the
//! configuration a client editor needs to open document `id`.
//!
//! ## Workflow
//!
//! 1.  **Mode**: `mode` is parsed case-insensitively into a `DocumentMode`;
//!     anything else is rejected with `400 Bad Request`.
//!
//! 2.  **Build**: `EditorConfigBuilder::build` resolves the document, issues
//!     a fresh key and derives permissions from the mode. Nothing is written.
//!
//! 3.  **HTTP Response**: `200 OK` with the `DocumentConfig`, `404` when no
//!     stored file matches `id`.

use actix_web::{web, HttpResponse};
use common::model::callback::CallbackResponse;
use common::requests::EditorConfigQuery;

use crate::error::DocumentError;
use crate::state::AppState;

pub async fn process(
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<EditorConfigQuery>,
) -> Result<HttpResponse, DocumentError> {
    let Some(mode) = query.parsed_mode() else {
        log::warn!("Rejected editor config for {}: unknown mode {:?}", id, query.mode);
        return Ok(HttpResponse::BadRequest()
            .json(CallbackResponse::failed(format!("invalid mode parameter: {}", query.mode))));
    };

    let config = state.editor_configs.build(&id, &query.file_type, mode)?;
    Ok(HttpResponse::Ok().json(config))
}
