//! Shared application state.
//!
//! Created once in `main.rs` and injected into every handler as
//! `web::Data<AppState>`. All collaborators sit behind `Arc`, so cloning the
//! state per worker is cheap and every worker sees the same locks.

use std::sync::Arc;

use crate::config::Settings;
use crate::documents::callback::CallbackDispatcher;
use crate::documents::editor_config::EditorConfigBuilder;
use crate::documents::fetch::{Downloader, HttpDownloader};
use crate::documents::forms::{FormFiller, LopdfFormFiller};
use crate::documents::locks::DocumentLocks;
use crate::documents::service::DocumentService;
use crate::documents::store::{BlobStore, FsBlobStore};
use crate::documents::submissions::{LogSubmissionLog, SubmissionLog};
use crate::error::DocumentError;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub documents: Arc<DocumentService>,
    pub editor_configs: Arc<EditorConfigBuilder>,
    pub callbacks: Arc<CallbackDispatcher>,
}

impl AppState {
    /// Production wiring: a directory store, the HTTP downloader, the `lopdf`
    /// form filler and submissions written to the log.
    pub fn from_settings(settings: Settings) -> Result<Self, DocumentError> {
        let store = Arc::new(FsBlobStore::open(&settings.storage_path)?);
        let downloader = Arc::new(HttpDownloader::new(settings.fetch_timeout)?);
        Ok(Self::with_parts(
            settings,
            store,
            downloader,
            Arc::new(LopdfFormFiller),
            Arc::new(LogSubmissionLog),
        ))
    }

    pub fn with_parts(
        settings: Settings,
        store: Arc<dyn BlobStore>,
        downloader: Arc<dyn Downloader>,
        filler: Arc<dyn FormFiller>,
        submissions: Arc<dyn SubmissionLog>,
    ) -> Self {
        let settings = Arc::new(settings);
        let locks = DocumentLocks::new();
        AppState {
            documents: Arc::new(DocumentService::new(
                store.clone(),
                filler,
                locks.clone(),
                settings.clone(),
            )),
            editor_configs: Arc::new(EditorConfigBuilder::new(store.clone(), settings.clone())),
            callbacks: Arc::new(CallbackDispatcher::new(store, downloader, locks, submissions)),
            settings,
        }
    }
}
