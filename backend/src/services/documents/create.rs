//! # Document Creation
//!
//! `POST /api/Document` copies the configured empty template into a new
//! document named after a fresh id and the optional title.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: the body is a `CreateDocumentRequest`; an absent
//!     title is allowed.
//!
//! 2.  **Creation**: `DocumentService::create` picks the id, normalizes the
//!     title and copies the template.
//!
//! 3.  **HTTP Response**: `200 OK` with the new `DocumentSummary`, or `404`
//!     when the empty template is missing.

use actix_web::{web, HttpResponse};
use common::requests::CreateDocumentRequest;

use crate::error::DocumentError;
use crate::state::AppState;

pub async fn process(
    state: web::Data<AppState>,
    request: Option<web::Json<CreateDocumentRequest>>,
) -> Result<HttpResponse, DocumentError> {
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    let summary = state.documents.create(request.title.as_deref())?;
    Ok(HttpResponse::Ok().json(summary))
}
