//! # Callback Dispatcher
//!
//! The editing server reports every lifecycle event of an open document by
//! posting a [`CallbackPayload`] to this backend. Nothing is remembered
//! between callbacks: each payload's `status` alone decides what happens.
//!
//! | status | event                    | effect                                    |
//! |--------|--------------------------|-------------------------------------------|
//! | 1      | user connected / left    | log each action                           |
//! | 2      | ready to save            | download `url` over the document          |
//! | 3      | save error               | log                                       |
//! | 4      | closed without changes   | log                                       |
//! | 6      | force-save               | like 2; form submissions go to `_form`    |
//! | 7      | force-save error         | log                                       |
//! | other  | unknown                  | warning, success                          |
//!
//! Saving statuses also archive `changesurl` under `history/` when present.
//! Archival is best effort: its failures are logged, never returned.
//!
//! The target document is resolved before the status is looked at, so an id
//! that matches no file is `NotFound` whatever the status. Saving statuses
//! resolve again under the document's lock and hold it until the write is
//! done.

use chrono::Local;
use common::model::callback::CallbackPayload;
use std::sync::Arc;

use crate::documents::fetch::Downloader;
use crate::documents::locks::DocumentLocks;
use crate::documents::naming;
use crate::documents::store::{BlobStore, FileDescriptor};
use crate::documents::submissions::{
    parse_submitted_fields, process_submitted_fields, SubmissionLog, SubmissionRecord,
};
use crate::error::DocumentError;

/// `forcesavetype` of a form submission.
const FORM_SUBMIT: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStatus {
    Editing,
    MustSave,
    SaveError,
    ClosedUnchanged,
    ForceSave,
    ForceSaveError,
    Unknown(i32),
}

impl From<i32> for CallbackStatus {
    fn from(status: i32) -> Self {
        match status {
            1 => CallbackStatus::Editing,
            2 => CallbackStatus::MustSave,
            3 => CallbackStatus::SaveError,
            4 => CallbackStatus::ClosedUnchanged,
            6 => CallbackStatus::ForceSave,
            7 => CallbackStatus::ForceSaveError,
            other => CallbackStatus::Unknown(other),
        }
    }
}

/// A user joining or leaving the editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    pub action_type: i32,
    pub user_id: String,
}

/// A file written from a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDocument {
    /// Store name of the written document.
    pub name: String,
    /// Store name of the change archive, when one was written.
    pub archive: Option<String>,
}

/// What a callback did.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    Connections(Vec<ConnectionEvent>),
    Saved(SavedDocument),
    FormSubmitted {
        /// `None` when the payload carried no document `url`.
        saved: Option<SavedDocument>,
        records: Vec<SubmissionRecord>,
    },
    /// A saving status arrived without a `url`.
    NothingToSave,
    /// Error or close notifications, logged only.
    Logged(CallbackStatus),
    Unknown(i32),
}

pub struct CallbackDispatcher {
    store: Arc<dyn BlobStore>,
    downloader: Arc<dyn Downloader>,
    locks: DocumentLocks,
    submissions: Arc<dyn SubmissionLog>,
}

impl CallbackDispatcher {
    pub fn new(
        store: Arc<dyn BlobStore>,
        downloader: Arc<dyn Downloader>,
        locks: DocumentLocks,
        submissions: Arc<dyn SubmissionLog>,
    ) -> Self {
        CallbackDispatcher {
            store,
            downloader,
            locks,
            submissions,
        }
    }

    /// Handles one callback for document `id`.
    ///
    /// # Errors
    /// - [`DocumentError::NotFound`] when no stored file matches `id`.
    /// - [`DocumentError::Fetch`] when the saved document or the submitted
    ///   form data cannot be downloaded.
    /// - [`DocumentError::InvalidPayload`] when the form data is not a JSON
    ///   array of fields.
    pub async fn dispatch(
        &self,
        id: &str,
        payload: &CallbackPayload,
    ) -> Result<CallbackOutcome, DocumentError> {
        let file = self.store.resolve_by_id_prefix(id)?;
        if let Some(key) = &payload.key {
            log::debug!("Callback for {} with key {}", file.name, key);
        }

        let status = CallbackStatus::from(payload.status);
        match status {
            CallbackStatus::Editing => Ok(CallbackOutcome::Connections(connections(&file, payload))),
            CallbackStatus::MustSave => {
                if payload.history.is_some() {
                    log::info!("Saving history of document {}", file.name);
                }
                if let Some(last) = payload.users.as_ref().and_then(|users| users.first()) {
                    log::info!("Document {} last edited by user {}", file.name, last);
                }
                let (file, _guard) = self.locks.resolve_locked(self.store.as_ref(), id).await?;
                Ok(self.persist(&file.name, payload).await?.map_or(
                    CallbackOutcome::NothingToSave,
                    CallbackOutcome::Saved,
                ))
            }
            CallbackStatus::SaveError => {
                log::error!("Saving document {} failed", file.name);
                Ok(CallbackOutcome::Logged(status))
            }
            CallbackStatus::ClosedUnchanged => {
                log::info!("Document {} closed without changes", file.name);
                Ok(CallbackOutcome::Logged(status))
            }
            CallbackStatus::ForceSave => {
                let (file, _guard) = self.locks.resolve_locked(self.store.as_ref(), id).await?;
                self.force_save(&file, payload).await
            }
            CallbackStatus::ForceSaveError => {
                log::error!("Force-saving document {} failed", file.name);
                Ok(CallbackOutcome::Logged(status))
            }
            CallbackStatus::Unknown(code) => {
                log::warn!("Unknown callback status {} for document {}", code, file.name);
                Ok(CallbackOutcome::Unknown(code))
            }
        }
    }

    async fn force_save(
        &self,
        file: &FileDescriptor,
        payload: &CallbackPayload,
    ) -> Result<CallbackOutcome, DocumentError> {
        if payload.forcesavetype != Some(FORM_SUBMIT) {
            return Ok(self
                .persist(&file.name, payload)
                .await?
                .map_or(CallbackOutcome::NothingToSave, CallbackOutcome::Saved));
        }

        let records = match payload.formsdataurl.as_deref() {
            Some(url) => {
                let json = self.downloader.fetch_text(url).await?;
                let fields = parse_submitted_fields(&json)?;
                process_submitted_fields(&fields, self.submissions.as_ref())
            }
            None => {
                log::warn!("Form submission for {} without formsdataurl", file.name);
                Vec::new()
            }
        };

        // The editable template stays untouched; submissions get their own file.
        let target = naming::form_copy_name(&file.name);
        let saved = self.persist(&target, payload).await?;
        Ok(CallbackOutcome::FormSubmitted { saved, records })
    }

    /// Downloads `url` over `target` and archives `changesurl`. `None` when
    /// the payload has no `url`.
    async fn persist(
        &self,
        target: &str,
        payload: &CallbackPayload,
    ) -> Result<Option<SavedDocument>, DocumentError> {
        let Some(url) = payload.url.as_deref() else {
            log::warn!("Callback for {} carries no document url", target);
            return Ok(None);
        };

        let bytes = self.downloader.fetch_bytes(url).await?;
        self.store.write(target, &bytes)?;
        log::info!("Saved {} ({} bytes)", target, bytes.len());

        let archive = match payload.changesurl.as_deref() {
            Some(changes) => self.archive_changes(target, changes).await,
            None => None,
        };
        Ok(Some(SavedDocument {
            name: target.to_string(),
            archive,
        }))
    }

    async fn archive_changes(&self, target: &str, url: &str) -> Option<String> {
        let name = naming::history_archive_name(target, &Local::now());
        let result = match self.downloader.fetch_bytes(url).await {
            Ok(bytes) => self.store.write(&name, &bytes),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                log::info!("Saved change history of {} to {}", target, name);
                Some(name)
            }
            Err(e) => {
                log::error!("Failed to save change history of {}: {}", target, e);
                None
            }
        }
    }
}

fn connections(file: &FileDescriptor, payload: &CallbackPayload) -> Vec<ConnectionEvent> {
    payload
        .actions
        .iter()
        .flatten()
        .map(|action| {
            let user_id = action.userid.clone().unwrap_or_default();
            log::info!(
                "Document {}: user {} performed action type {}",
                file.name,
                user_id,
                action.action_type
            );
            ConnectionEvent {
                action_type: action.action_type,
                user_id,
            }
        })
        .collect()
}
