//! The single user record (`user.json`).

use tracing::{debug, error, warn};

use crate::atomic::write_json_atomic;
use crate::error::Result;
use crate::models::User;
use crate::store::{read_json, LocalStore};

impl LocalStore {
    /// Replace the stored user.
    pub fn save_user(&self, user: &User) -> Result<()> {
        write_json_atomic(self.user_path(), user).map_err(|e| {
            error!(path = %self.user_path().display(), error = %e, "failed to save user");
            e
        })?;
        debug!(email = %user.email, "user saved");
        Ok(())
    }

    /// Stored user, or `None` when there is none or the file is unreadable.
    pub fn load_user(&self) -> Option<User> {
        self.try_load_user().unwrap_or_else(|e| {
            warn!(path = %self.user_path().display(), error = %e, "ignoring unreadable user file");
            None
        })
    }

    /// Like [`LocalStore::load_user`] but reports a corrupt file as an error.
    pub fn try_load_user(&self) -> Result<Option<User>> {
        read_json(self.user_path())
    }

    /// Remove the user record. Returns whether one existed.
    pub fn delete_user(&self) -> Result<bool> {
        match std::fs::remove_file(self.user_path()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
