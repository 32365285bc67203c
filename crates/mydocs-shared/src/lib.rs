//! # mydocs-shared
//!
//! Types and rules shared by the store and the client layer: typed
//! identifiers, file-layout constants, form validation, default attachment
//! labels and credential hashing.

pub mod constants;
pub mod credentials;
pub mod error;
pub mod labels;
pub mod types;
pub mod validation;

pub use error::{CredentialError, ValidationErrors};
pub use types::{AttachmentId, DocumentId};
