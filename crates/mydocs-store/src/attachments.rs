//! Managed attachment storage (`attachments/`).
//!
//! Imports copy the source file into the managed directory; documents then
//! reference the copy by path. Files are written through a temp file and
//! renamed into place, hashed with BLAKE3 on the way.
//!
//! A stored path is matched to its managed file by file name, so records
//! keep resolving after the store root moves.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use mydocs_shared::constants::{ATTACHMENTS_DIR, TEMP_FILE_PREFIX};
use mydocs_shared::{AttachmentId, DocumentId};

use crate::atomic::is_temp_file;
use crate::error::{Result, StoreError};
use crate::media;
use crate::models::{Attachment, Document};
use crate::store::{AttachmentNaming, LocalStore};

const COPY_BUF_SIZE: usize = 64 * 1024;

/// Result of a successful import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportedFile {
    pub id: AttachmentId,
    pub stored_path: PathBuf,
    pub original_name: String,
    pub is_image: bool,
    pub mime_type: String,
    /// BLAKE3 hash of the copied bytes (hex).
    pub content_hash: String,
    pub size: u64,
    /// Creation time of the source file, else its modification time, else
    /// the time of the import.
    pub date: DateTime<Utc>,
}

impl ImportedFile {
    pub fn into_attachment(self, label: impl Into<String>) -> Attachment {
        Attachment {
            id: self.id,
            path: self.stored_path,
            is_image: self.is_image,
            label: label.into(),
            date: self.date,
            original_name: Some(self.original_name),
            mime_type: Some(self.mime_type),
            content_hash: Some(self.content_hash),
        }
    }

    /// Attachment labelled with the source's file name.
    pub fn into_named_attachment(self) -> Attachment {
        let label = self.original_name.clone();
        self.into_attachment(label)
    }
}

impl LocalStore {
    /// Copy `source` into managed storage under a fresh attachment id.
    pub fn import_attachment(&self, source: &Path) -> Result<ImportedFile> {
        self.import_attachment_as(AttachmentId::new(), source)
    }

    /// Copy `source` into managed storage for the attachment `id`.
    pub fn import_attachment_as(&self, id: AttachmentId, source: &Path) -> Result<ImportedFile> {
        let metadata = match fs::metadata(source) {
            Ok(m) if m.is_file() => m,
            _ => return Err(StoreError::SourceNotFound(source.to_path_buf())),
        };

        let max = self.config().max_attachment_size;
        if metadata.len() > max {
            return Err(StoreError::AttachmentTooLarge {
                size: metadata.len(),
                max,
            });
        }

        let original_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let naming = self.config().attachment_naming;
        let file_name = match naming {
            AttachmentNaming::ByFileName if is_temp_file(&original_name) => {
                warn!(
                    file = %original_name,
                    "file name clashes with temp file prefix, storing by id"
                );
                stored_file_name(id, source)
            }
            AttachmentNaming::ById => stored_file_name(id, source),
            AttachmentNaming::ByFileName => original_name.clone(),
        };
        let destination = self.attachments_dir().join(&file_name);

        if naming == AttachmentNaming::ByFileName && destination.exists() {
            warn!(
                file = %file_name,
                "attachment with the same file name exists, replacing it"
            );
        }

        let media = media::detect(source);
        let (content_hash, size) = copy_into(source, &destination, max)?;

        info!(
            id = %id,
            source = %source.display(),
            stored = %destination.display(),
            size,
            mime = %media.mime_type,
            "attachment imported"
        );

        Ok(ImportedFile {
            id,
            stored_path: destination,
            original_name,
            is_image: media.is_image(),
            mime_type: media.mime_type,
            content_hash,
            size,
            date: file_date(&metadata),
        })
    }

    /// Import and return only the stored path; failures are logged and
    /// reported as `None`.
    pub fn import_attachment_path(&self, source: &Path) -> Option<PathBuf> {
        match self.import_attachment(source) {
            Ok(imported) => Some(imported.stored_path),
            Err(e) => {
                error!(source = %source.display(), error = %e, "failed to import attachment");
                None
            }
        }
    }

    /// Whether `path` points directly into `attachments/`, this store's or
    /// the one it was moved from.
    pub fn is_managed(&self, path: &Path) -> bool {
        self.managed_file_name(path).is_some()
    }

    /// Where the file behind a stored path lives now. Paths outside managed
    /// storage are returned unchanged.
    pub fn resolve_attachment_path(&self, path: &Path) -> PathBuf {
        match self.managed_file_name(path) {
            Some(name) => self.attachments_dir().join(name),
            None => path.to_path_buf(),
        }
    }

    /// Point attachments recorded under a previous store root at the current
    /// `attachments/`. Returns how many records changed.
    pub fn rebase_attachment_paths(&self, documents: &mut [Document]) -> usize {
        let mut changed = 0;
        for attachment in documents.iter_mut().flat_map(|d| d.attachments.iter_mut()) {
            let resolved = self.resolve_attachment_path(&attachment.path);
            if resolved != attachment.path {
                debug!(
                    id = %attachment.id,
                    from = %attachment.path.display(),
                    to = %resolved.display(),
                    "attachment path rebased"
                );
                attachment.path = resolved;
                changed += 1;
            }
        }
        changed
    }

    /// Delete the managed file behind `attachment`. Returns whether a file
    /// was removed. Paths outside `attachments/` are refused.
    pub fn remove_attachment_file(&self, attachment: &Attachment) -> Result<bool> {
        let name = self
            .managed_file_name(&attachment.path)
            .ok_or_else(|| StoreError::OutsideAttachmentDir(attachment.path.clone()))?;
        let path = self.attachments_dir().join(name);

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(id = %attachment.id, path = %path.display(), "attachment file removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the managed file behind `attachment` unless another attachment
    /// in `remaining` still points at it.
    pub fn release_attachment_file(
        &self,
        attachment: &Attachment,
        remaining: &[Document],
    ) -> Result<bool> {
        let Some(name) = self.managed_file_name(&attachment.path) else {
            return Ok(false);
        };

        let still_used = remaining
            .iter()
            .flat_map(|d| d.attachments.iter())
            .any(|a| a.id != attachment.id && self.managed_file_name(&a.path) == Some(name));
        if still_used {
            debug!(id = %attachment.id, "attachment file still referenced, keeping it");
            return Ok(false);
        }

        self.remove_attachment_file(attachment)
    }

    /// Regular files currently in `attachments/`, temp files excluded.
    pub fn list_attachment_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(self.attachments_dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() || is_temp_file(&entry.file_name().to_string_lossy())
            {
                continue;
            }
            files.push(entry.path());
        }
        files.sort();
        Ok(files)
    }

    /// Delete every file in `attachments/` that no attachment of `documents`
    /// references, plus temp files left by interrupted writes. Returns the
    /// removed paths.
    pub fn collect_orphans(&self, documents: &[Document]) -> Result<Vec<PathBuf>> {
        let referenced: HashSet<OsString> = documents
            .iter()
            .flat_map(|d| d.attachments.iter())
            .filter_map(|a| self.managed_file_name(&a.path))
            .map(OsStr::to_os_string)
            .collect();

        let mut removed = Vec::new();

        for entry in fs::read_dir(self.attachments_dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if is_temp_file(&name.to_string_lossy()) || !referenced.contains(&name) {
                fs::remove_file(entry.path())?;
                removed.push(entry.path());
            }
        }

        for entry in fs::read_dir(self.root())? {
            let entry = entry?;
            if entry.file_type()?.is_file() && is_temp_file(&entry.file_name().to_string_lossy()) {
                fs::remove_file(entry.path())?;
                removed.push(entry.path());
            }
        }

        if !removed.is_empty() {
            info!(count = removed.len(), "orphaned files removed");
        }
        Ok(removed)
    }

    /// Attachments whose backing file no longer exists.
    pub fn verify_attachments(&self, documents: &[Document]) -> Vec<(DocumentId, AttachmentId)> {
        let missing: Vec<_> = documents
            .iter()
            .flat_map(|d| d.attachments.iter().map(move |a| (d.id, a)))
            .filter(|(_, a)| !self.resolve_attachment_path(&a.path).is_file())
            .map(|(doc_id, a)| (doc_id, a.id))
            .collect();

        for (doc_id, att_id) in &missing {
            warn!(document = %doc_id, attachment = %att_id, "attachment file missing");
        }
        missing
    }

    fn managed_file_name<'a>(&self, path: &'a Path) -> Option<&'a OsStr> {
        let name = path.file_name()?;
        let parent = path.parent()?;
        if parent == self.attachments_dir() {
            return Some(name);
        }
        // recorded under an earlier root
        if parent.file_name() == Some(OsStr::new(ATTACHMENTS_DIR)) {
            return Some(name);
        }
        // tolerate differently spelled paths to the same directory
        let parent = parent.canonicalize().ok()?;
        let dir = self.attachments_dir().canonicalize().ok()?;
        (parent == dir).then_some(name)
    }
}

/// `<id>.<ext>`, or the bare id when the source has no usable extension.
fn stored_file_name(id: AttachmentId, source: &Path) -> String {
    match source.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()) => {
            format!("{id}.{}", ext.to_ascii_lowercase())
        }
        _ => id.to_string(),
    }
}

/// Copy `source` to `destination` through a temp file in the destination's
/// directory. Returns the BLAKE3 hash (hex) and the number of bytes copied.
/// Nothing is written when the source turns out larger than `max`.
fn copy_into(source: &Path, destination: &Path, max: u64) -> Result<(String, u64)> {
    let dir = destination
        .parent()
        .ok_or_else(|| StoreError::OutsideAttachmentDir(destination.to_path_buf()))?;

    let mut input = File::open(source)?;
    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_FILE_PREFIX)
        .tempfile_in(dir)?;

    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut size: u64 = 0;
    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            break;
        }
        size += n as u64;
        if size > max {
            // the source grew after it was measured
            return Err(StoreError::AttachmentTooLarge { size, max });
        }
        hasher.update(&buf[..n]);
        temp.write_all(&buf[..n])?;
    }
    temp.as_file().sync_all()?;

    temp.persist(destination).map_err(|e| StoreError::Persist {
        path: destination.to_path_buf(),
        source: e.error,
    })?;

    Ok((hex::encode(hasher.finalize().as_bytes()), size))
}

fn file_date(metadata: &fs::Metadata) -> DateTime<Utc> {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}
