//! `POST /api/Document/{id}/fill`: writes the `_auto` copy of a PDF form
//! with the posted default values. The form template is left as is.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::documents::forms::FormFieldMap;
use crate::error::DocumentError;
use crate::state::AppState;

/// Where the filled copy can be fetched, never a server path.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FillResponse {
    file_name: String,
    url: String,
}

pub async fn process(
    state: web::Data<AppState>,
    id: web::Path<String>,
    values: web::Json<FormFieldMap>,
) -> Result<HttpResponse, DocumentError> {
    let file_name = state
        .documents
        .apply_default_fields(&id, values.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(FillResponse {
        url: state.documents.url_of(&file_name),
        file_name,
    }))
}
