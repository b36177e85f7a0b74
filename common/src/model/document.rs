use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A stored document as reported by the listing and creation endpoints.
///
/// On creation `id` is the generated uuid. In a listing it is the file stem,
/// so a document created with a title is listed as `"{uuid}_{title}"`. Both
/// forms are accepted by the editing endpoints, which resolve ids by prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub file_name: String,
    /// Extension without the leading dot.
    pub file_type: String,
    pub url: String,
    /// Local time, `yyyy-MM-ddTHH:mm:ss`.
    pub created_at: String,
    /// Local time, `yyyy-MM-ddTHH:mm:ss`.
    pub updated_at: String,
}

/// How the client editor opens a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentMode {
    Edit,
    FillForms,
}

/// Returned when a mode string matches neither variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid mode parameter: {}", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for DocumentMode {
    type Err = UnknownMode;

    /// Case-insensitive: `edit`, `Edit`, `FILLFORMS` are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("edit") {
            Ok(DocumentMode::Edit)
        } else if s.eq_ignore_ascii_case("fillforms") {
            Ok(DocumentMode::FillForms)
        } else {
            Err(UnknownMode(s.to_string()))
        }
    }
}

impl fmt::Display for DocumentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentMode::Edit => f.write_str("Edit"),
            DocumentMode::FillForms => f.write_str("FillForms"),
        }
    }
}
