//! File naming conventions of the document store.
//!
//! A document file is `{id}.{ext}` or `{id}_{title}.{ext}`. Derived copies
//! append a suffix to the stem: `_auto` for pre-filled forms, `_form` for
//! submitted forms. Change archives live in `history/`.

use chrono::{DateTime, Local};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Sub-directory of the store holding change-history archives.
pub const HISTORY_DIR: &str = "history";

fn invalid_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("static pattern"))
}

/// Turns a user supplied title into a file-name-safe fragment.
///
/// Invalid characters split the title, empty pieces are dropped, the rest is
/// joined with `_` and trailing dots are removed.
pub fn normalize_file_name(title: &str) -> String {
    invalid_chars()
        .split(title)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .trim_end_matches('.')
        .to_string()
}

/// File name without its extension.
pub fn stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Extension without the dot, empty when there is none.
pub fn extension(file_name: &str) -> &str {
    Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
}

/// Name of the pre-filled copy of a form template.
pub fn auto_fill_name(file_name: &str) -> String {
    format!("{}_auto.pdf", stem(file_name))
}

/// Name under which a submitted form is saved, keeping the extension.
pub fn form_copy_name(file_name: &str) -> String {
    match extension(file_name) {
        "" => format!("{}_form", stem(file_name)),
        ext => format!("{}_form.{}", stem(file_name), ext),
    }
}

/// Relative path of a change archive for `file_name` taken at `at`.
pub fn history_archive_name(file_name: &str, at: &DateTime<Local>) -> String {
    format!(
        "{}/{}_{}.zip",
        HISTORY_DIR,
        stem(file_name),
        at.format("%Y%m%d%H%M%S")
    )
}
