//! `GET /api/Document`: every stored document.

use actix_web::{web, HttpResponse};

use crate::error::DocumentError;
use crate::state::AppState;

pub async fn process(state: web::Data<AppState>) -> Result<HttpResponse, DocumentError> {
    let documents = state.documents.list()?;
    Ok(HttpResponse::Ok().json(documents))
}
