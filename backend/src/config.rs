//! Server settings, read from `DOC_*` environment variables.
//!
//! Every variable has a default suited to running the editing server and
//! this backend on one machine, so `cargo run` works with no environment.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORAGE_PATH: &str = "./Documents";
const DEFAULT_STORAGE_URL: &str = "http://localhost:8080/files";
const DEFAULT_CALLBACK_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_EMPTY_TEMPLATE: &str = "Empty.docx";
const DEFAULT_LANG: &str = "zh-TW";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Directory holding the documents (and their `history/` archives).
    pub storage_path: PathBuf,
    /// Public base URL under which stored files are downloadable.
    pub storage_url: String,
    /// Base URL the editing server uses to reach this backend.
    pub callback_base_url: String,
    /// File copied when a new document is created.
    pub empty_template: PathBuf,
    pub editor_lang: String,
    pub editor_region: String,
    pub user_id: String,
    pub user_name: String,
    pub fetch_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            callback_base_url: DEFAULT_CALLBACK_BASE_URL.to_string(),
            empty_template: PathBuf::from(DEFAULT_EMPTY_TEMPLATE),
            editor_lang: DEFAULT_LANG.to_string(),
            editor_region: DEFAULT_LANG.to_string(),
            user_id: "userId".to_string(),
            user_name: "userName".to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable source. Unset variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(host) = lookup("DOC_HOST") {
            settings.host = host;
        }
        if let Some(port) = lookup("DOC_PORT") {
            settings.port = port.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                name: "DOC_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(path) = lookup("DOC_STORAGE_PATH") {
            settings.storage_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("DOC_STORAGE_URL") {
            settings.storage_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("DOC_CALLBACK_BASE_URL") {
            settings.callback_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(template) = lookup("DOC_EMPTY_TEMPLATE") {
            settings.empty_template = PathBuf::from(template);
        }
        if let Some(lang) = lookup("DOC_EDITOR_LANG") {
            settings.editor_lang = lang;
        }
        if let Some(region) = lookup("DOC_EDITOR_REGION") {
            settings.editor_region = region;
        }
        if let Some(id) = lookup("DOC_USER_ID") {
            settings.user_id = id;
        }
        if let Some(name) = lookup("DOC_USER_NAME") {
            settings.user_name = name;
        }
        if let Some(secs) = lookup("DOC_FETCH_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                name: "DOC_FETCH_TIMEOUT_SECS",
                value: secs.clone(),
            })?;
            settings.fetch_timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.storage_path, PathBuf::from("./Documents"));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(30));
    }

    #[test]
    fn variables_override_defaults() {
        let vars: HashMap<&str, &str> = [
            ("DOC_PORT", "9000"),
            ("DOC_STORAGE_URL", "http://files.local/docs/"),
            ("DOC_FETCH_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();
        let settings = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.storage_url, "http://files.local/docs");
        assert_eq!(settings.fetch_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = Settings::from_lookup(|k| (k == "DOC_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("DOC_PORT"));
    }
}
