use serde::Deserialize;

use crate::model::document::DocumentMode;

/// Request payload for the document creation endpoint.
/// The title is optional; without it the file is named after the new id only.
#[derive(Debug, Default, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: Option<String>,
}

/// Query string of the editor configuration endpoint
/// (`?fileType=docx&mode=edit`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfigQuery {
    #[serde(default)]
    pub file_type: String,
    pub mode: String,
}

impl EditorConfigQuery {
    /// Parses the `mode` parameter, returning `None` for unknown modes.
    pub fn parsed_mode(&self) -> Option<DocumentMode> {
        self.mode.parse().ok()
    }
}
