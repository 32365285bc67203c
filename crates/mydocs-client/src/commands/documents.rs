//! Document commands.
//!
//! Every mutation rewrites the whole collection through
//! [`AppState::commit`](crate::state::AppState::commit).

use serde::Deserialize;
use tracing::{info, warn};

use mydocs_shared::error::{Field, Reason, ValidationErrors};
use mydocs_shared::validation::is_valid_document_name;
use mydocs_shared::DocumentId;
use mydocs_store::Document;

use super::parse_id;
use crate::state::{lock, SharedState};

/// Editable fields of a document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub description: String,
}

impl DocumentInput {
    fn validate(&self) -> Result<(), String> {
        let mut errors = ValidationErrors::default();
        if !is_valid_document_name(&self.name) {
            errors.push(Field::Name, Reason::Empty);
        }
        errors.into_result().map_err(|e| e.to_string())
    }
}

/// Documents whose name contains `search`, ignoring case. No search (or a
/// blank one) lists everything.
pub fn list_documents(state: &SharedState, search: Option<&str>) -> Result<Vec<Document>, String> {
    let guard = lock(state)?;
    guard.require_session()?;

    let query = search.map(str::trim).filter(|q| !q.is_empty());
    let Some(query) = query else {
        return Ok(guard.documents.clone());
    };

    let needle = query.to_lowercase();
    Ok(guard
        .documents
        .iter()
        .filter(|d| d.name.to_lowercase().contains(&needle))
        .cloned()
        .collect())
}

pub fn get_document(state: &SharedState, document_id: &str) -> Result<Document, String> {
    let id: DocumentId = parse_id(document_id, "document_id")?;
    let guard = lock(state)?;
    guard.require_session()?;

    guard
        .document(id)
        .cloned()
        .ok_or_else(|| format!("Document not found: {id}"))
}

pub fn create_document(state: &SharedState, input: DocumentInput) -> Result<Document, String> {
    input.validate()?;

    let mut guard = lock(state)?;
    guard.require_session()?;

    let document = Document::new(input.name, input.doc_type, input.description);
    let created = document.clone();
    guard.commit(move |docs| {
        docs.push(document);
        Ok(())
    })?;

    info!(id = %created.id, name = %created.name, "document created");
    Ok(created)
}

/// Replace name, type and description. Id, date and attachments are kept.
pub fn update_document(
    state: &SharedState,
    document_id: &str,
    input: DocumentInput,
) -> Result<Document, String> {
    let id: DocumentId = parse_id(document_id, "document_id")?;
    input.validate()?;

    let mut guard = lock(state)?;
    guard.require_session()?;

    let updated = guard.commit(|docs| {
        let doc = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| format!("Document not found: {id}"))?;
        doc.name = input.name;
        doc.doc_type = input.doc_type;
        doc.description = input.description;
        Ok(doc.clone())
    })?;

    info!(id = %id, "document updated");
    Ok(updated)
}

/// Remove a document, then release the files of its attachments.
pub fn delete_document(state: &SharedState, document_id: &str) -> Result<(), String> {
    let id: DocumentId = parse_id(document_id, "document_id")?;

    let mut guard = lock(state)?;
    guard.require_session()?;

    let removed = guard.commit(|docs| {
        let index = docs
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| format!("Document not found: {id}"))?;
        Ok(docs.remove(index))
    })?;

    for attachment in &removed.attachments {
        if let Err(e) = guard.store.release_attachment_file(attachment, &guard.documents) {
            warn!(attachment = %attachment.id, error = %e, "could not delete attachment file");
        }
    }

    info!(id = %id, attachments = removed.attachments.len(), "document deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, Utc};
    use mydocs_store::LocalStore;

    use super::*;
    use crate::state::{AppState, Session};

    fn setup() -> (SharedState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::open(LocalStore::open_at(dir.path()).unwrap());
        state.session = Some(Session {
            email: "ana@example.com".into(),
            started_at: Utc::now(),
        });
        (Arc::new(Mutex::new(state)), dir)
    }

    fn input(name: &str) -> DocumentInput {
        DocumentInput {
            name: name.into(),
            doc_type: "PDF".into(),
            description: "Contrato de alquiler".into(),
        }
    }

    #[test]
    fn test_requires_session() {
        let (state, _dir) = setup();
        lock(&state).unwrap().session = None;

        assert_eq!(list_documents(&state, None).unwrap_err(), "Not logged in");
        assert!(create_document(&state, input("Contrato")).is_err());
    }

    #[test]
    fn test_create_persists() {
        let (state, _dir) = setup();
        let doc = create_document(&state, input("Contrato")).unwrap();

        let guard = lock(&state).unwrap();
        assert_eq!(guard.store.load_documents(), vec![doc]);
    }

    #[test]
    fn test_blank_name_rejected() {
        let (state, _dir) = setup();
        assert!(create_document(&state, input("   ")).is_err());
        assert!(lock(&state).unwrap().documents.is_empty());
    }

    #[test]
    fn test_update_keeps_id_and_date() {
        let (state, _dir) = setup();
        let doc = create_document(&state, input("Contrato")).unwrap();
        let original_date = doc.date - Duration::days(3);
        {
            let mut guard = lock(&state).unwrap();
            guard.documents[0].date = original_date;
        }

        let updated = update_document(
            &state,
            &doc.id.to_string(),
            DocumentInput {
                name: "Contrato firmado".into(),
                doc_type: "Legal".into(),
                description: String::new(),
            },
        )
        .unwrap();

        assert_eq!(updated.id, doc.id);
        assert_eq!(updated.date, original_date);
        assert_eq!(updated.name, "Contrato firmado");

        let stored = lock(&state).unwrap().store.load_documents();
        assert_eq!(stored[0], updated);
    }

    #[test]
    fn test_update_and_delete_unknown() {
        let (state, _dir) = setup();
        let unknown = DocumentId::new().to_string();

        assert!(update_document(&state, &unknown, input("X")).is_err());
        assert!(delete_document(&state, &unknown).is_err());
        assert!(get_document(&state, "not-a-uuid")
            .unwrap_err()
            .starts_with("Invalid document_id"));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let (state, _dir) = setup();
        create_document(&state, input("Contrato de alquiler")).unwrap();
        create_document(&state, input("Pasaporte")).unwrap();
        create_document(&state, input("CONTRATO laboral")).unwrap();

        let found = list_documents(&state, Some("contrato")).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(list_documents(&state, Some("  ")).unwrap().len(), 3);
        assert_eq!(list_documents(&state, None).unwrap().len(), 3);
        assert!(list_documents(&state, Some("factura")).unwrap().is_empty());
    }

    #[test]
    fn test_delete() {
        let (state, _dir) = setup();
        let a = create_document(&state, input("Contrato")).unwrap();
        let b = create_document(&state, input("Pasaporte")).unwrap();

        delete_document(&state, &a.id.to_string()).unwrap();

        let stored = lock(&state).unwrap().store.load_documents();
        assert_eq!(stored, vec![b]);
    }
}
