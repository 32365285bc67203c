/// Application name
pub const APP_NAME: &str = "my-documents";

/// `directories::ProjectDirs` qualifiers
pub const APP_QUALIFIER: &str = "com";
pub const APP_ORGANIZATION: &str = "mydocs";
pub const APP_DIR_NAME: &str = "my-documents";

/// Single user credential record
pub const USER_FILE: &str = "user.json";

/// Whole document collection, attachments inline
pub const DOCUMENTS_FILE: &str = "documents.json";

/// Login state kept across restarts
pub const SESSION_FILE: &str = "session.json";

/// Managed attachment storage, relative to the store root
pub const ATTACHMENTS_DIR: &str = "attachments";

/// Prefix of temp files created next to a destination during atomic writes
pub const TEMP_FILE_PREFIX: &str = ".mydocs-tmp";

/// Default maximum attachment size in bytes (50 MiB)
pub const MAX_ATTACHMENT_SIZE: u64 = 50 * 1024 * 1024;

/// Default label prefix for captured attachments ("Archivo 1", "Archivo 2", ...)
pub const DEFAULT_LABEL_PREFIX: &str = "Archivo";

/// Minimum password length accepted by the account forms
pub const MIN_PASSWORD_LEN: usize = 6;

/// Extensions treated as images when content sniffing is inconclusive
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "heic", "heif", "bmp", "tif", "tiff",
];
