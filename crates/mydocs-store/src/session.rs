//! Login state kept across restarts (`session.json`).

use tracing::{debug, error, warn};

use crate::atomic::write_json_atomic;
use crate::error::Result;
use crate::models::SessionRecord;
use crate::store::{read_json, LocalStore};

impl LocalStore {
    pub fn save_session(&self, session: &SessionRecord) -> Result<()> {
        write_json_atomic(self.session_path(), session).map_err(|e| {
            error!(path = %self.session_path().display(), error = %e, "failed to save session");
            e
        })?;
        debug!(logged_in = session.is_logged_in, "session saved");
        Ok(())
    }

    /// Stored session, or the logged-out default when there is none or the
    /// file is unreadable.
    pub fn load_session(&self) -> SessionRecord {
        match read_json(self.session_path()) {
            Ok(record) => record.unwrap_or_default(),
            Err(e) => {
                warn!(path = %self.session_path().display(), error = %e, "ignoring unreadable session file");
                SessionRecord::default()
            }
        }
    }

    /// Forget the login state. Returns whether a record existed.
    pub fn clear_session(&self) -> Result<bool> {
        match std::fs::remove_file(self.session_path()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_logged_out_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open_at(dir.path()).unwrap();

        assert_eq!(store.load_session(), SessionRecord::default());
        assert!(!store.clear_session().unwrap());
    }

    #[test]
    fn test_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let record = SessionRecord {
            is_logged_in: true,
            user_email: Some("ana@example.com".into()),
            started_at: Some(Utc::now()),
        };
        LocalStore::open_at(dir.path())
            .unwrap()
            .save_session(&record)
            .unwrap();

        let store = LocalStore::open_at(dir.path()).unwrap();
        assert_eq!(store.load_session(), record);

        assert!(store.clear_session().unwrap());
        assert_eq!(store.load_session(), SessionRecord::default());
    }

    #[test]
    fn test_corrupt_file_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open_at(dir.path()).unwrap();
        std::fs::write(store.session_path(), b"{\"isLoggedIn\": tr").unwrap();

        assert!(!store.load_session().is_logged_in);
    }
}
