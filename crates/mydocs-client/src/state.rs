//! Application state shared by every command.
//!
//! [`AppState`] is wrapped in `Arc<Mutex<>>` ([`SharedState`]) and handed to
//! each command function by reference. The login state is mirrored to
//! `session.json` so a restart lands where the user left off.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use mydocs_shared::DocumentId;
use mydocs_store::{Document, LocalStore, SessionRecord};

pub type SharedState = Arc<Mutex<AppState>>;

/// A logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub started_at: DateTime<Utc>,
}

/// Central application state.
pub struct AppState {
    /// Handle to the on-disk store.
    pub store: LocalStore,

    /// In-memory working set, mirrored to `documents.json` after every
    /// change.
    pub documents: Vec<Document>,

    /// `None` until the user logs in.
    pub session: Option<Session>,

    /// Last email used to create an account or log in, offered as the
    /// default on the login form.
    pub remembered_email: Option<String>,
}

impl AppState {
    /// Create the state, load the working set from `store` and restore the
    /// login state of the previous run.
    pub fn open(store: LocalStore) -> Self {
        let mut documents = store.load_documents();
        let rebased = store.rebase_attachment_paths(&mut documents);
        if rebased > 0 {
            info!(count = rebased, "attachment paths moved to the current store root");
            if let Err(e) = store.save_documents(&documents) {
                warn!(error = %e, "could not save rebased attachment paths");
            }
        }

        let record = store.load_session();
        let session = restore_session(&store, &record);

        Self {
            store,
            documents,
            session,
            remembered_email: record.user_email,
        }
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn require_session(&self) -> Result<&Session, String> {
        self.session.as_ref().ok_or_else(|| "Not logged in".to_string())
    }

    /// Mirror the session and remembered email to `session.json`. The login
    /// itself does not depend on it, so failures are only logged.
    pub fn persist_session(&self) {
        let result = if self.session.is_none() && self.remembered_email.is_none() {
            self.store.clear_session().map(|_| ())
        } else {
            self.store.save_session(&SessionRecord {
                is_logged_in: self.session.is_some(),
                user_email: self.remembered_email.clone(),
                started_at: self.session.as_ref().map(|s| s.started_at),
            })
        };
        if let Err(e) = result {
            warn!(error = %e, "could not persist login state");
        }
    }

    /// Apply `change` to the working set and persist the whole collection.
    ///
    /// When `change` fails nothing is written. When the write fails the
    /// working set is restored, so memory and disk never disagree.
    pub fn commit<T, F>(&mut self, change: F) -> Result<T, String>
    where
        F: FnOnce(&mut Vec<Document>) -> Result<T, String>,
    {
        let snapshot = self.documents.clone();
        let value = change(&mut self.documents)?;

        if let Err(e) = self.store.save_documents(&self.documents) {
            self.documents = snapshot;
            return Err(format!("Failed to save documents: {e}"));
        }
        Ok(value)
    }
}

/// A stored login counts only while the account it names still exists.
fn restore_session(store: &LocalStore, record: &SessionRecord) -> Option<Session> {
    if !record.is_logged_in {
        return None;
    }
    let email = record.user_email.as_deref()?;
    match store.load_user() {
        Some(user) if user.email == email => {
            debug!(email, "session restored");
            Some(Session {
                email: user.email,
                started_at: record.started_at.unwrap_or_else(Utc::now),
            })
        }
        _ => {
            warn!(email, "stored session has no matching account, logged out");
            None
        }
    }
}

/// Lock the shared state.
pub fn lock(state: &SharedState) -> Result<MutexGuard<'_, AppState>, String> {
    state.lock().map_err(|e| format!("Lock poisoned: {e}"))
}
