//! The configuration object handed to a client editor.
//!
//! The shape follows what the editing server's JavaScript API expects, which
//! is why every struct is serialized in camelCase.

use serde::{Deserialize, Serialize};

use crate::model::document::DocumentMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfig {
    pub document: DocumentInfo,
    pub document_type: DocumentType,
    /// Always `"desktop"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub editor_config: EditorSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub file_type: String,
    pub key: String,
    pub title: String,
    pub url: String,
    pub permissions: Permissions,
}

/// Capabilities granted to the editor, derived from the requested mode only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub download: bool,
    pub print: bool,
    pub copy: bool,
    pub edit: bool,
    pub review: bool,
    pub comment: bool,
    pub fill_forms: bool,
}

impl Permissions {
    pub fn for_mode(mode: DocumentMode) -> Self {
        let editing = mode == DocumentMode::Edit;
        Permissions {
            download: true,
            print: true,
            copy: true,
            edit: editing,
            review: editing,
            comment: editing,
            fill_forms: mode == DocumentMode::FillForms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    pub callback_url: String,
    pub mode: String,
    pub lang: String,
    pub region: String,
    pub user: User,
    pub customization: Customization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub forcesave: bool,
    pub submit_form: bool,
}

/// Editor family used to open a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Word,
    Cell,
    Slide,
    Pdf,
}

const WORD_TYPES: &[&str] = &[
    "doc", "docm", "docx", "dot", "dotm", "dotx", "epub", "fb2", "fodt", "htm", "html", "hwp",
    "hwpx", "mht", "mhtml", "odt", "ott", "pages", "rtf", "stw", "sxw", "txt", "wps", "wpt", "xml",
];

const CELL_TYPES: &[&str] = &[
    "csv", "et", "ett", "fods", "numbers", "ods", "ots", "sxc", "xls", "xlsb", "xlsm", "xlsx",
    "xlt", "xltm", "xltx", "xml",
];

const SLIDE_TYPES: &[&str] = &[
    "dps", "dpt", "fodp", "key", "odp", "otp", "pot", "potm", "potx", "pps", "ppsm", "ppsx", "ppt",
    "pptm", "pptx", "sxi",
];

const PDF_TYPES: &[&str] = &["djvu", "oform", "oxps", "pdf", "xps"];

impl DocumentType {
    /// Classifies a file extension (with or without the leading dot).
    /// Unknown extensions open in the word editor.
    pub fn from_file_type(file_type: &str) -> Self {
        let file_type = file_type.trim_start_matches('.').to_ascii_lowercase();
        let file_type = file_type.as_str();
        // xml is listed for both word and cell; word wins.
        if WORD_TYPES.contains(&file_type) {
            DocumentType::Word
        } else if CELL_TYPES.contains(&file_type) {
            DocumentType::Cell
        } else if SLIDE_TYPES.contains(&file_type) {
            DocumentType::Slide
        } else if PDF_TYPES.contains(&file_type) {
            DocumentType::Pdf
        } else {
            DocumentType::Word
        }
    }
}
