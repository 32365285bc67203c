//! Client configuration loaded from environment variables.
//!
//! Every setting has a default, so an empty environment opens the store in
//! the platform data directory.

use std::path::PathBuf;

use mydocs_shared::constants::MAX_ATTACHMENT_SIZE;
use mydocs_store::{AttachmentNaming, StoreConfig, StoreError};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Store root.
    /// Env: `MYDOCS_DATA_DIR`
    /// Default: platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Naming of imported files.
    /// Env: `MYDOCS_ATTACHMENT_NAMING` (`id` | `filename`)
    /// Default: `id`
    pub attachment_naming: AttachmentNaming,

    /// Largest accepted import, in bytes.
    /// Env: `MYDOCS_MAX_ATTACHMENT_SIZE`
    /// Default: 50 MiB
    pub max_attachment_size: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            attachment_naming: AttachmentNaming::ById,
            max_attachment_size: MAX_ATTACHMENT_SIZE,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("MYDOCS_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(val) = lookup("MYDOCS_ATTACHMENT_NAMING") {
            match parse_naming(&val) {
                Some(naming) => config.attachment_naming = naming,
                None => {
                    tracing::warn!(value = %val, "Invalid MYDOCS_ATTACHMENT_NAMING, using default");
                }
            }
        }

        if let Some(val) = lookup("MYDOCS_MAX_ATTACHMENT_SIZE") {
            match val.trim().parse::<u64>() {
                Ok(n) if n > 0 => config.max_attachment_size = n,
                _ => {
                    tracing::warn!(value = %val, "Invalid MYDOCS_MAX_ATTACHMENT_SIZE, using default");
                }
            }
        }

        // RUST_LOG is read by tracing-subscriber's EnvFilter directly.

        config
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn store_config(&self) -> Result<StoreConfig, StoreError> {
        let base = match &self.data_dir {
            Some(dir) => StoreConfig::new(dir),
            None => StoreConfig::platform_default()?,
        };
        Ok(base
            .with_naming(self.attachment_naming)
            .with_max_attachment_size(self.max_attachment_size))
    }
}

fn parse_naming(value: &str) -> Option<AttachmentNaming> {
    match value.trim().to_ascii_lowercase().as_str() {
        "id" => Some(AttachmentNaming::ById),
        "filename" | "name" => Some(AttachmentNaming::ByFileName),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert!(config.data_dir.is_none());
        assert_eq!(config.attachment_naming, AttachmentNaming::ById);
        assert_eq!(config.max_attachment_size, MAX_ATTACHMENT_SIZE);
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("MYDOCS_DATA_DIR", "/tmp/mydocs"),
            ("MYDOCS_ATTACHMENT_NAMING", "FileName"),
            ("MYDOCS_MAX_ATTACHMENT_SIZE", "1024"),
        ]));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/mydocs")));
        assert_eq!(config.attachment_naming, AttachmentNaming::ByFileName);
        assert_eq!(config.max_attachment_size, 1024);

        let store = config.store_config().unwrap();
        assert_eq!(store.root, PathBuf::from("/tmp/mydocs"));
        assert_eq!(store.attachment_naming, AttachmentNaming::ByFileName);
        assert_eq!(store.max_attachment_size, 1024);
    }

    #[test]
    fn test_invalid_values_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("MYDOCS_DATA_DIR", "  "),
            ("MYDOCS_ATTACHMENT_NAMING", "hash"),
            ("MYDOCS_MAX_ATTACHMENT_SIZE", "-3"),
        ]));
        assert!(config.data_dir.is_none());
        assert_eq!(config.attachment_naming, AttachmentNaming::ById);
        assert_eq!(config.max_attachment_size, MAX_ATTACHMENT_SIZE);
    }
}
