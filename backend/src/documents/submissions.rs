//! # Form Submissions
//!
//! When a user submits a form in the editor, the editing server sends a
//! force-save callback whose `formsdataurl` points at a JSON array of
//! [`SubmittedField`]s. Each field is classified by its declared type,
//! logged, and recorded in the injected [`SubmissionLog`].

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use common::model::callback::SubmittedField;
use serde::Serialize;
use std::sync::Mutex;

use crate::error::DocumentError;

/// Declared type of a submitted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    CheckBox,
    Picture,
    /// Combo boxes and drop-down lists.
    List,
    DateTime,
    Radio,
    Other(String),
}

impl FieldKind {
    pub fn parse(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "text" => FieldKind::Text,
            "checkbox" => FieldKind::CheckBox,
            "picture" => FieldKind::Picture,
            "combobox" | "dropdownlist" => FieldKind::List,
            "datetime" => FieldKind::DateTime,
            "radio" => FieldKind::Radio,
            _ => FieldKind::Other(kind.to_string()),
        }
    }
}

/// One line of the submission log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub timestamp: DateTime<Local>,
    pub form_key: String,
    pub form_type: String,
    pub form_value: String,
    pub form_tag: String,
}

/// Destination of submission records.
pub trait SubmissionLog: Send + Sync {
    fn record(&self, record: &SubmissionRecord);
}

/// Writes records as JSON through the `log` facade under the
/// `form_submissions` target.
#[derive(Debug, Default)]
pub struct LogSubmissionLog;

impl SubmissionLog for LogSubmissionLog {
    fn record(&self, record: &SubmissionRecord) {
        match serde_json::to_string(record) {
            Ok(json) => log::info!(target: "form_submissions", "Form submission: {}", json),
            Err(e) => log::error!("Failed to serialize form submission: {}", e),
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySubmissionLog {
    records: Mutex<Vec<SubmissionRecord>>,
}

impl MemorySubmissionLog {
    pub fn records(&self) -> Vec<SubmissionRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl SubmissionLog for MemorySubmissionLog {
    fn record(&self, record: &SubmissionRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

/// Parses the document behind `formsdataurl`.
pub fn parse_submitted_fields(json: &str) -> Result<Vec<SubmittedField>, DocumentError> {
    serde_json::from_str(json)
        .map_err(|e| DocumentError::InvalidPayload(format!("form data: {}", e)))
}

/// Logs every field by kind and records it in `sink`. Unknown kinds are a
/// warning, never an error.
pub fn process_submitted_fields(
    fields: &[SubmittedField],
    sink: &dyn SubmissionLog,
) -> Vec<SubmissionRecord> {
    fields
        .iter()
        .map(|field| {
            let key = field.key.as_deref().unwrap_or_default();
            let kind = field.kind.as_deref().unwrap_or_default();
            let value = field.value.as_deref().unwrap_or_default();

            match FieldKind::parse(kind) {
                FieldKind::Text => log::info!("Text field: key={}, value={}", key, value),
                FieldKind::CheckBox => {
                    let checked = value.eq_ignore_ascii_case("true");
                    log::info!("Check box: key={}, checked={}", key, checked);
                }
                FieldKind::Picture => {
                    if !value.is_empty() {
                        log::info!("Picture: key={}", key);
                    }
                }
                FieldKind::List => log::info!("List: key={}, selected={}", key, value),
                FieldKind::DateTime => {
                    if let Some(at) = parse_datetime(value) {
                        log::info!("Date time: key={}, date={}", key, at.format("%Y-%m-%d %H:%M:%S"));
                    }
                }
                FieldKind::Radio => log::info!("Radio group: key={}, selected={}", key, value),
                FieldKind::Other(other) => {
                    log::warn!("Unhandled form field type: {}, key: {}, value: {}", other, key, value)
                }
            }

            let record = SubmissionRecord {
                timestamp: Local::now(),
                form_key: key.to_string(),
                form_type: kind.to_string(),
                form_value: value.to_string(),
                form_tag: field.tag.clone().unwrap_or_default(),
            };
            sink.record(&record);
            record
        })
        .collect()
}

/// Accepts RFC 3339 and the common date(-time) layouts editors send.
fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(value, format) {
            return Some(at);
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}
