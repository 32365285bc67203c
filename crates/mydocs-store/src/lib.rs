//! # mydocs-store
//!
//! Local, file-backed storage for the my-documents application.
//!
//! A [`LocalStore`] owns one directory holding the single user record
//! (`user.json`), the whole document collection (`documents.json`), the
//! login state (`session.json`) and the managed attachment files
//! (`attachments/`).
//! Every JSON write goes through a temp file that is renamed over the
//! destination, so a reader never sees a half-written file.
//!
//! The store is constructed explicitly and passed around by reference; tests
//! open one per temporary directory.

pub mod atomic;
pub mod attachments;
pub mod documents;
pub mod media;
pub mod models;
pub mod session;
pub mod store;
pub mod users;

mod error;

pub use attachments::ImportedFile;
pub use error::{Result, StoreError};
pub use media::{AttachmentKind, MediaType};
pub use models::*;
pub use store::{AttachmentNaming, LocalStore, StoreConfig};
