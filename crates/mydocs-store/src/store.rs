//! Store construction and on-disk layout.
//!
//! The [`LocalStore`] owns nothing but paths: every operation opens, acts on
//! and closes its files within the call.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::de::DeserializeOwned;

use mydocs_shared::constants::{
    APP_DIR_NAME, APP_ORGANIZATION, APP_QUALIFIER, ATTACHMENTS_DIR, DOCUMENTS_FILE,
    MAX_ATTACHMENT_SIZE, SESSION_FILE, USER_FILE,
};

use crate::error::{Result, StoreError};

/// How imported files are named inside `attachments/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentNaming {
    /// `<attachment-id>.<ext>`; two imports never share a file.
    #[default]
    ById,
    /// The source's own file name. Importing a second file with the same
    /// name replaces the first one on disk.
    ByFileName,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding `user.json`, `documents.json`, `session.json` and
    /// `attachments/`.
    pub root: PathBuf,
    pub attachment_naming: AttachmentNaming,
    /// Imports larger than this are rejected.
    pub max_attachment_size: u64,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            attachment_naming: AttachmentNaming::default(),
            max_attachment_size: MAX_ATTACHMENT_SIZE,
        }
    }

    /// Configuration rooted at the platform data directory:
    /// - Linux:   `~/.local/share/my-documents`
    /// - macOS:   `~/Library/Application Support/com.mydocs.my-documents`
    /// - Windows: `{FOLDERID_RoamingAppData}\mydocs\my-documents\data`
    pub fn platform_default() -> Result<Self> {
        let project_dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_DIR_NAME)
            .ok_or(StoreError::NoDataDir)?;
        Ok(Self::new(project_dirs.data_dir()))
    }

    pub fn with_naming(mut self, naming: AttachmentNaming) -> Self {
        self.attachment_naming = naming;
        self
    }

    pub fn with_max_attachment_size(mut self, max: u64) -> Self {
        self.max_attachment_size = max;
        self
    }
}

/// Handle to one store directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    config: StoreConfig,
    user_path: PathBuf,
    documents_path: PathBuf,
    session_path: PathBuf,
    attachments_dir: PathBuf,
}

impl LocalStore {
    /// Open (or create) the store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(StoreConfig::platform_default()?)
    }

    /// Open (or create) a store rooted at `root` with default settings.
    pub fn open_at(root: &Path) -> Result<Self> {
        Self::open(StoreConfig::new(root))
    }

    pub fn open(config: StoreConfig) -> Result<Self> {
        let attachments_dir = config.root.join(ATTACHMENTS_DIR);
        std::fs::create_dir_all(&attachments_dir)?;

        tracing::info!(
            root = %config.root.display(),
            naming = ?config.attachment_naming,
            "opening local store"
        );

        Ok(Self {
            user_path: config.root.join(USER_FILE),
            documents_path: config.root.join(DOCUMENTS_FILE),
            session_path: config.root.join(SESSION_FILE),
            attachments_dir,
            config,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn user_path(&self) -> &Path {
        &self.user_path
    }

    pub fn documents_path(&self) -> &Path {
        &self.documents_path
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    pub fn attachments_dir(&self) -> &Path {
        &self.attachments_dir
    }
}

/// Read and decode a JSON file. A missing file is `Ok(None)`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}
