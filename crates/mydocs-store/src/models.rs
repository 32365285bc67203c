//! Records persisted by the store.
//!
//! Field names on disk are camelCase. Fields added after the first release
//! carry `#[serde(default)]` so older files keep loading.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mydocs_shared::{AttachmentId, DocumentId};

use crate::media::AttachmentKind;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// The single local account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub full_name: String,
    pub email: String,
    /// Argon2 PHC string. Records from older versions may hold clear text;
    /// see `mydocs_shared::credentials`.
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Login state that outlives the process (`session.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default)]
    pub is_logged_in: bool,
    /// Email offered on the login form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Assigned at creation, never reassigned.
    pub id: DocumentId,
    pub name: String,
    /// Free-text classification, e.g. "PDF".
    #[serde(rename = "type")]
    pub doc_type: String,
    pub description: String,
    /// Creation time. Edits do not touch it.
    pub date: DateTime<Utc>,
    /// Display order.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Document {
    pub fn new(
        name: impl Into<String>,
        doc_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            doc_type: doc_type.into(),
            description: description.into(),
            date: Utc::now(),
            attachments: Vec::new(),
        }
    }

    pub fn attachment(&self, id: AttachmentId) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.id == id)
    }

    pub fn attachment_mut(&mut self, id: AttachmentId) -> Option<&mut Attachment> {
        self.attachments.iter_mut().find(|a| a.id == id)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.attachments.iter().map(|a| a.label.as_str())
    }

    pub fn has_duplicate_attachment_ids(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.attachments.len());
        !self.attachments.iter().all(|a| seen.insert(a.id))
    }
}

/// `true` when document ids are unique across the collection and attachment
/// ids are unique within each document.
pub fn collection_has_unique_ids(documents: &[Document]) -> bool {
    let mut seen = HashSet::with_capacity(documents.len());
    documents
        .iter()
        .all(|d| seen.insert(d.id) && !d.has_duplicate_attachment_ids())
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: AttachmentId,
    /// Backing file. Points into managed storage once imported.
    #[serde(rename = "url")]
    pub path: PathBuf,
    /// Decided at import from the content type, never recomputed.
    pub is_image: bool,
    /// User-editable display name.
    pub label: String,
    /// Capture / import time.
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// BLAKE3 hash of the stored bytes (hex).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl Attachment {
    pub fn kind(&self) -> AttachmentKind {
        match self.mime_type.as_deref() {
            Some(mime) => AttachmentKind::from_mime(mime),
            None if self.is_image => AttachmentKind::Image,
            None => AttachmentKind::Other,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(label: &str) -> Attachment {
        Attachment {
            id: AttachmentId::new(),
            path: PathBuf::from(format!("/data/attachments/{label}.pdf")),
            is_image: false,
            label: label.to_string(),
            date: Utc::now(),
            original_name: None,
            mime_type: Some("application/pdf".into()),
            content_hash: None,
        }
    }

    #[test]
    fn test_document_json_layout() {
        let mut doc = Document::new("Contrato", "PDF", "Contrato de alquiler");
        doc.attachments.push(attachment("Archivo 1"));

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["type"], "PDF");
        assert_eq!(value["name"], "Contrato");
        assert!(value["attachments"][0]["url"].is_string());
        assert_eq!(value["attachments"][0]["isImage"], false);
        assert!(value["attachments"][0].get("originalName").is_none());
    }

    #[test]
    fn test_user_json_layout() {
        let user = User {
            full_name: "Ana".into(),
            email: "ana@example.com".into(),
            password_hash: "$argon2id$...".into(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["fullName"], "Ana");
        assert_eq!(value["password"], "$argon2id$...");
    }

    #[test]
    fn test_older_records_still_load() {
        let user: User = serde_json::from_str(
            r#"{"fullName":"Ana","email":"ana@example.com","password":"secreto"}"#,
        )
        .unwrap();
        assert_eq!(user.password_hash, "secreto");

        let doc: Document = serde_json::from_str(
            r#"{"id":"7d8f1c7e-4c59-4a8e-9d38-1f0f0b7c2a11","name":"Contrato","type":"PDF",
                "description":"","date":"2024-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(doc.attachments.is_empty());
    }

    #[test]
    fn test_unique_ids() {
        let mut doc = Document::new("Contrato", "PDF", "");
        let a = attachment("Archivo 1");
        doc.attachments.push(a.clone());
        assert!(collection_has_unique_ids(std::slice::from_ref(&doc)));

        doc.attachments.push(a);
        assert!(doc.has_duplicate_attachment_ids());
        assert!(!collection_has_unique_ids(std::slice::from_ref(&doc)));

        let mut fixed = doc.clone();
        fixed.attachments.truncate(1);
        assert!(!collection_has_unique_ids(&[fixed.clone(), fixed]));
    }

    #[test]
    fn test_kind_falls_back_to_flag() {
        let mut a = attachment("foto");
        a.mime_type = None;
        a.is_image = true;
        assert_eq!(a.kind(), AttachmentKind::Image);
        a.mime_type = Some("application/pdf".into());
        assert_eq!(a.kind(), AttachmentKind::Pdf);
    }
}
