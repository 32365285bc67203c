use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// A form field checked by [`crate::validation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    Email,
    Password,
    ConfirmPassword,
    Terms,
    DataConsent,
    Name,
    Label,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Empty,
    InvalidFormat,
    TooShort,
    Mismatch,
    NotAccepted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub reason: Reason,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self.reason {
            Reason::Empty => "must not be empty",
            Reason::InvalidFormat => "has an invalid format",
            Reason::TooShort => "is too short",
            Reason::Mismatch => "does not match",
            Reason::NotAccepted => "must be accepted",
        };
        write!(f, "{:?} {}", self.field, reason)
    }
}

/// Every failing field of a form, in the order the fields were checked.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[error("{}", display_errors(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: Field, reason: Reason) {
        self.errors.push(FieldError { field, reason });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn reason(&self, field: Field) -> Option<Reason> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.reason)
    }

    /// `Ok(())` when nothing was pushed.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn display_errors(errors: &[FieldError]) -> String {
    let parts: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    format!("Validation failed: {}", parts.join("; "))
}
