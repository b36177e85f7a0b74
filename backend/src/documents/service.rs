//! # Document Service
//!
//! Listing and creation of stored documents, and pre-filling of PDF forms.
//!
//! ## Workflow of `create`
//!
//! 1.  A fresh UUID v4 becomes the document id.
//! 2.  The optional title is normalized and appended: `{id}_{title}.docx`.
//! 3.  The configured empty template is copied under that name.
//! 4.  The new file is described like any listed file, except that its `id`
//!     is the generated uuid rather than the file stem.

use chrono::{DateTime, Local};
use common::model::document::DocumentSummary;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Settings;
use crate::documents::forms::{FormFieldMap, FormFiller};
use crate::documents::keys;
use crate::documents::locks::DocumentLocks;
use crate::documents::naming;
use crate::documents::store::{BlobStore, FileDescriptor};
use crate::error::DocumentError;

const SUMMARY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct DocumentService {
    store: Arc<dyn BlobStore>,
    filler: Arc<dyn FormFiller>,
    locks: DocumentLocks,
    settings: Arc<Settings>,
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn BlobStore>,
        filler: Arc<dyn FormFiller>,
        locks: DocumentLocks,
        settings: Arc<Settings>,
    ) -> Self {
        DocumentService {
            store,
            filler,
            locks,
            settings,
        }
    }

    pub fn list(&self) -> Result<Vec<DocumentSummary>, DocumentError> {
        Ok(self
            .store
            .list()?
            .iter()
            .map(|file| self.summarize(file))
            .collect())
    }

    /// Copies the empty template into a new document. The returned `id` is
    /// the bare uuid, which resolves to the new file.
    pub fn create(&self, title: Option<&str>) -> Result<DocumentSummary, DocumentError> {
        let id = Uuid::new_v4().to_string();
        let title = title.map(naming::normalize_file_name).unwrap_or_default();
        let name = if title.is_empty() {
            format!("{}.docx", id)
        } else {
            format!("{}_{}.docx", id, title)
        };

        self.store.copy(&self.settings.empty_template, &name)?;
        log::info!("Created document {}", name);
        log::debug!("Simple key of {}: {}", name, keys::generate_simple_key(&name));

        let now = Local::now();
        let file = self
            .store
            .list()?
            .into_iter()
            .find(|file| file.name == name)
            .unwrap_or(FileDescriptor {
                name,
                created_at: now,
                modified_at: now,
            });
        Ok(DocumentSummary {
            id,
            ..self.summarize(&file)
        })
    }

    /// Writes the `_auto` copy of document `id` with `values` filled in and
    /// returns its store name. A document without a form yields its own name.
    pub async fn apply_default_fields(
        &self,
        id: &str,
        values: FormFieldMap,
    ) -> Result<String, DocumentError> {
        let (file, _guard) = self.locks.resolve_locked(self.store.as_ref(), id).await?;

        let template = self.store.path_of(&file.name);
        let filler = Arc::clone(&self.filler);
        let filled = tokio::task::spawn_blocking(move || filler.fill(&template, &values)).await??;

        // The filled copy is written next to the template.
        let name = filled
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.name.clone());
        log::info!("Applied default fields of {} to {}", file.name, name);
        Ok(name)
    }

    /// Public download URL of the stored file `name`.
    pub fn url_of(&self, name: &str) -> String {
        format!("{}/{}", self.settings.storage_url, name)
    }

    fn summarize(&self, file: &FileDescriptor) -> DocumentSummary {
        DocumentSummary {
            id: file.stem().to_string(),
            file_name: file.name.clone(),
            file_type: file.extension().to_string(),
            url: self.url_of(&file.name),
            created_at: format_time(&file.created_at),
            updated_at: format_time(&file.modified_at),
        }
    }
}

fn format_time(at: &DateTime<Local>) -> String {
    at.format(SUMMARY_TIME_FORMAT).to_string()
}
