//! # Document Errors
//!
//! Every failure the document core can report, in one enumeration. The HTTP
//! layer maps each variant to a status code in [`ResponseError`], so a
//! missing document is always distinguishable from a broken download.
//!
//! Best-effort failures (history archival, a single form field that cannot
//! be filled) never surface here: they are logged where they happen.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::model::callback::CallbackResponse;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    /// No stored file name starts with the requested id.
    #[error("document {id} not found")]
    NotFound { id: String },

    #[error("template file not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// A download failed, after the retry for transient failures.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The callback body or the submitted form data is not what we expect.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl DocumentError {
    pub fn not_found(id: impl Into<String>) -> Self {
        DocumentError::NotFound { id: id.into() }
    }

    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        DocumentError::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DocumentError::NotFound { .. } | DocumentError::TemplateNotFound(_)
        )
    }
}

impl From<tokio::task::JoinError> for DocumentError {
    fn from(err: tokio::task::JoinError) -> Self {
        DocumentError::Task(err.to_string())
    }
}

impl ResponseError for DocumentError {
    fn status_code(&self) -> StatusCode {
        match self {
            DocumentError::NotFound { .. } | DocumentError::TemplateNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            DocumentError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            DocumentError::Fetch { .. }
            | DocumentError::Io(_)
            | DocumentError::Pdf(_)
            | DocumentError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(CallbackResponse::failed(self.to_string()))
    }
}
