//! Attachment commands.
//!
//! Imports copy the picked or captured file into managed storage before the
//! record is added to its document. Removing a record releases the managed
//! file unless another attachment still points at it.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use mydocs_shared::error::{Field, Reason, ValidationErrors};
use mydocs_shared::labels::next_default_label;
use mydocs_shared::{AttachmentId, DocumentId};
use mydocs_store::{Attachment, ImportedFile};

use super::parse_id;
use crate::state::{lock, AppState, SharedState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingAttachmentDto {
    pub document_id: String,
    pub attachment_id: String,
}

/// Import a picked file. The label defaults to the file's own name.
pub fn add_attachment(
    state: &SharedState,
    document_id: &str,
    source_path: &str,
    label: Option<String>,
) -> Result<Attachment, String> {
    let doc_id: DocumentId = parse_id(document_id, "document_id")?;

    let mut guard = lock(state)?;
    guard.require_session()?;
    ensure_document(&guard, doc_id)?;

    let imported = import(&guard, source_path)?;
    let attachment = match label.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        Some(label) => imported.into_attachment(label),
        None => imported.into_named_attachment(),
    };

    attach(&mut guard, doc_id, attachment)
}

/// Import a camera capture, labelled with the next free `"Archivo N"`.
pub fn add_captured_attachment(
    state: &SharedState,
    document_id: &str,
    source_path: &str,
) -> Result<Attachment, String> {
    let doc_id: DocumentId = parse_id(document_id, "document_id")?;

    let mut guard = lock(state)?;
    guard.require_session()?;
    let label = next_default_label(ensure_document(&guard, doc_id)?.labels());

    let attachment = import(&guard, source_path)?.into_attachment(label);
    attach(&mut guard, doc_id, attachment)
}

/// The label the next capture would receive.
pub fn next_capture_label(state: &SharedState, document_id: &str) -> Result<String, String> {
    let doc_id: DocumentId = parse_id(document_id, "document_id")?;
    let guard = lock(state)?;
    guard.require_session()?;
    Ok(next_default_label(ensure_document(&guard, doc_id)?.labels()))
}

pub fn rename_attachment(
    state: &SharedState,
    document_id: &str,
    attachment_id: &str,
    label: &str,
) -> Result<Attachment, String> {
    let doc_id: DocumentId = parse_id(document_id, "document_id")?;
    let att_id: AttachmentId = parse_id(attachment_id, "attachment_id")?;

    let label = label.trim();
    if label.is_empty() {
        let mut errors = ValidationErrors::default();
        errors.push(Field::Label, Reason::Empty);
        return Err(errors.to_string());
    }

    let mut guard = lock(state)?;
    guard.require_session()?;

    let renamed = guard.commit(|docs| {
        let attachment = docs
            .iter_mut()
            .find(|d| d.id == doc_id)
            .ok_or_else(|| format!("Document not found: {doc_id}"))?
            .attachment_mut(att_id)
            .ok_or_else(|| format!("Attachment not found: {att_id}"))?;
        attachment.label = label.to_string();
        Ok(attachment.clone())
    })?;

    info!(document = %doc_id, attachment = %att_id, label, "attachment renamed");
    Ok(renamed)
}

pub fn remove_attachment(
    state: &SharedState,
    document_id: &str,
    attachment_id: &str,
) -> Result<(), String> {
    let doc_id: DocumentId = parse_id(document_id, "document_id")?;
    let att_id: AttachmentId = parse_id(attachment_id, "attachment_id")?;

    let mut guard = lock(state)?;
    guard.require_session()?;

    let removed = guard.commit(|docs| {
        let doc = docs
            .iter_mut()
            .find(|d| d.id == doc_id)
            .ok_or_else(|| format!("Document not found: {doc_id}"))?;
        let index = doc
            .attachments
            .iter()
            .position(|a| a.id == att_id)
            .ok_or_else(|| format!("Attachment not found: {att_id}"))?;
        Ok(doc.attachments.remove(index))
    })?;

    if let Err(e) = guard.store.release_attachment_file(&removed, &guard.documents) {
        warn!(attachment = %att_id, error = %e, "could not delete attachment file");
    }

    info!(document = %doc_id, attachment = %att_id, "attachment removed");
    Ok(())
}

/// Delete managed files no attachment refers to. Returns the removed paths.
pub fn collect_orphans(state: &SharedState) -> Result<Vec<String>, String> {
    let guard = lock(state)?;
    guard.require_session()?;
    let removed = guard
        .store
        .collect_orphans(&guard.documents)
        .map_err(|e| format!("Failed to clean attachment storage: {e}"))?;
    Ok(removed.iter().map(|p| p.display().to_string()).collect())
}

/// Attachments whose backing file has gone missing.
pub fn find_missing_attachments(state: &SharedState) -> Result<Vec<MissingAttachmentDto>, String> {
    let guard = lock(state)?;
    guard.require_session()?;
    Ok(guard
        .store
        .verify_attachments(&guard.documents)
        .into_iter()
        .map(|(doc_id, att_id)| MissingAttachmentDto {
            document_id: doc_id.to_string(),
            attachment_id: att_id.to_string(),
        })
        .collect())
}

fn ensure_document(state: &AppState, id: DocumentId) -> Result<&mydocs_store::Document, String> {
    state
        .document(id)
        .ok_or_else(|| format!("Document not found: {id}"))
}

fn import(state: &AppState, source_path: &str) -> Result<ImportedFile, String> {
    state
        .store
        .import_attachment(Path::new(source_path))
        .map_err(|e| format!("Failed to import attachment: {e}"))
}

/// Append `attachment` to its document and persist. A failed save deletes
/// the freshly imported file again.
fn attach(state: &mut AppState, doc_id: DocumentId, attachment: Attachment) -> Result<Attachment, String> {
    let added = attachment.clone();
    let result = state.commit(move |docs| {
        let doc = docs
            .iter_mut()
            .find(|d| d.id == doc_id)
            .ok_or_else(|| format!("Document not found: {doc_id}"))?;
        doc.attachments.push(attachment);
        Ok(())
    });

    if let Err(e) = result {
        if let Err(cleanup) = state.store.release_attachment_file(&added, &state.documents) {
            warn!(attachment = %added.id, error = %cleanup, "could not delete imported file");
        }
        return Err(e);
    }

    info!(
        document = %doc_id,
        attachment = %added.id,
        label = %added.label,
        is_image = added.is_image,
        "attachment added"
    );
    Ok(added)
}
