//! # Editing Server Callback
//!
//! `POST /api/Document/{id}/callback` receives the status reports of the
//! editing server.
//!
//! ## Workflow
//!
//! 1.  **Parse**: the raw body is parsed as a `CallbackPayload`. A body that
//!     is not valid JSON, or lacks `status`, is `400 Bad Request`.
//!
//! 2.  **Dispatch**: `CallbackDispatcher::dispatch` acts on the status.
//!
//! 3.  **HTTP Response**: `{"error":0}` once handled. Failures answer
//!     `{"error":1,"message":..}` with `404` for an unknown document and
//!     `500` otherwise, so the editing server retries.

use actix_web::{web, HttpResponse};
use common::model::callback::{CallbackPayload, CallbackResponse};

use crate::error::DocumentError;
use crate::state::AppState;

pub async fn process(
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, DocumentError> {
    let payload: CallbackPayload = serde_json::from_slice(&body)
        .map_err(|e| DocumentError::InvalidPayload(format!("callback body: {}", e)))?;

    match state.callbacks.dispatch(&id, &payload).await {
        Ok(outcome) => {
            log::debug!("Callback for {} handled: {:?}", id, outcome);
            Ok(HttpResponse::Ok().json(CallbackResponse::ok()))
        }
        Err(e) => {
            log::error!("Callback for {} (status {}) failed: {}", id, payload.status, e);
            Err(e)
        }
    }
}
