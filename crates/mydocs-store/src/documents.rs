//! The document collection (`documents.json`).
//!
//! The collection is persisted as a whole: every save rewrites the file with
//! the full list, attachments inline.

use tracing::{debug, error, warn};

use crate::atomic::write_json_atomic;
use crate::error::Result;
use crate::models::Document;
use crate::store::{read_json, LocalStore};

impl LocalStore {
    /// Replace the stored collection with `documents`.
    pub fn save_documents(&self, documents: &[Document]) -> Result<()> {
        write_json_atomic(self.documents_path(), documents).map_err(|e| {
            error!(
                path = %self.documents_path().display(),
                error = %e,
                "failed to save documents"
            );
            e
        })?;
        debug!(count = documents.len(), "documents saved");
        Ok(())
    }

    /// Stored collection; empty when the file is missing or unreadable.
    pub fn load_documents(&self) -> Vec<Document> {
        self.try_load_documents().unwrap_or_else(|e| {
            warn!(
                path = %self.documents_path().display(),
                error = %e,
                "ignoring unreadable documents file"
            );
            Vec::new()
        })
    }

    /// Like [`LocalStore::load_documents`] but reports a corrupt file as an
    /// error instead of an empty list.
    pub fn try_load_documents(&self) -> Result<Vec<Document>> {
        let documents: Vec<Document> = read_json(self.documents_path())?.unwrap_or_default();
        debug!(count = documents.len(), "documents loaded");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};
    use mydocs_shared::AttachmentId;

    use super::*;
    use crate::models::Attachment;

    fn sample() -> Vec<Document> {
        let mut contrato = Document::new("Contrato", "PDF", "Contrato de alquiler");
        contrato.date = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        contrato.attachments.push(Attachment {
            id: AttachmentId::new(),
            path: PathBuf::from("/store/attachments/a.pdf"),
            is_image: false,
            label: "contrato.pdf".into(),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            original_name: Some("contrato.pdf".into()),
            mime_type: Some("application/pdf".into()),
            content_hash: Some("ab".repeat(32)),
        });
        let dni = Document::new("DNI", "Imagen", "");
        vec![contrato, dni]
    }

    #[test]
    fn test_empty_on_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open_at(dir.path()).unwrap();
        assert!(store.load_documents().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open_at(dir.path()).unwrap();
        let documents = sample();

        store.save_documents(&documents).unwrap();
        assert_eq!(store.load_documents(), documents);
    }

    #[test]
    fn test_save_replaces_whole_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open_at(dir.path()).unwrap();
        let mut documents = sample();

        store.save_documents(&documents).unwrap();
        documents.remove(0);
        store.save_documents(&documents).unwrap();

        let loaded = store.load_documents();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "DNI");
    }

    #[test]
    fn test_malformed_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open_at(dir.path()).unwrap();
        std::fs::write(store.documents_path(), b"[{\"id\": 3}]").unwrap();

        assert!(store.load_documents().is_empty());
        assert!(store.try_load_documents().is_err());
    }

    #[test]
    fn test_save_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open_at(dir.path()).unwrap();
        // documents.json taken by a non-empty directory
        std::fs::create_dir(store.documents_path()).unwrap();
        std::fs::write(store.documents_path().join("x"), b"x").unwrap();

        assert!(store.save_documents(&sample()).is_err());
    }
}
