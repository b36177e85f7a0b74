//! Builds the configuration a client editor is opened with.
//!
//! Building is read-only. Pre-filling a form with default values is a
//! separate operation, see [`DocumentService::apply_default_fields`].
//!
//! [`DocumentService::apply_default_fields`]: crate::documents::service::DocumentService::apply_default_fields

use common::model::document::DocumentMode;
use common::model::editor_config::{
    Customization, DocumentConfig, DocumentInfo, DocumentType, EditorSettings, Permissions, User,
};
use std::sync::Arc;

use crate::config::Settings;
use crate::documents::keys;
use crate::documents::store::BlobStore;
use crate::error::DocumentError;

/// Every configuration describes the first content version.
const DOCUMENT_VERSION: u32 = 1;

pub struct EditorConfigBuilder {
    store: Arc<dyn BlobStore>,
    settings: Arc<Settings>,
}

impl EditorConfigBuilder {
    pub fn new(store: Arc<dyn BlobStore>, settings: Arc<Settings>) -> Self {
        EditorConfigBuilder { store, settings }
    }

    /// Configuration for opening document `id` in `mode`. An empty
    /// `file_type` falls back to the stored file's extension.
    pub fn build(
        &self,
        id: &str,
        file_type: &str,
        mode: DocumentMode,
    ) -> Result<DocumentConfig, DocumentError> {
        let file = self.store.resolve_by_id_prefix(id)?;
        let file_type = if file_type.trim().is_empty() {
            file.extension().to_string()
        } else {
            file_type.trim_start_matches('.').to_string()
        };

        let key = keys::generate_key(&file.name, id, &file.modified_at, DOCUMENT_VERSION);
        log::debug!("Issuing key {} for {} in {} mode", key, file.name, mode);

        Ok(DocumentConfig {
            document_type: DocumentType::from_file_type(&file_type),
            document: DocumentInfo {
                file_type,
                key,
                title: file.name.clone(),
                url: format!("{}/{}", self.settings.storage_url, file.name),
                permissions: Permissions::for_mode(mode),
            },
            kind: "desktop".to_string(),
            editor_config: EditorSettings {
                callback_url: format!(
                    "{}/api/Document/{}/callback",
                    self.settings.callback_base_url, id
                ),
                mode: "edit".to_string(),
                lang: self.settings.editor_lang.clone(),
                region: self.settings.editor_region.clone(),
                user: User {
                    id: self.settings.user_id.clone(),
                    name: self.settings.user_name.clone(),
                },
                customization: Customization {
                    forcesave: true,
                    submit_form: mode == DocumentMode::FillForms,
                },
            },
        })
    }
}
