//! Form rules applied before anything reaches the store.
//!
//! The store itself accepts any string; these checks belong to the layer
//! that collects user input.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::constants::MIN_PASSWORD_LEN;
use crate::error::{Field, Reason, ValidationErrors};

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Input of the account creation form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accept_terms: bool,
    pub data_consent: bool,
}

pub fn is_valid_email(value: &str) -> bool {
    let re = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Z0-9a-z._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid regex")
    });
    re.is_match(value)
}

pub fn is_valid_password(value: &str) -> bool {
    value.chars().count() >= MIN_PASSWORD_LEN
}

pub fn is_valid_document_name(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn validate_account(form: &AccountForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if form.full_name.is_empty() {
        errors.push(Field::FullName, Reason::Empty);
    }
    if !is_valid_email(&form.email) {
        errors.push(Field::Email, Reason::InvalidFormat);
    }
    if !is_valid_password(&form.password) {
        errors.push(Field::Password, Reason::TooShort);
    }
    if form.confirm_password != form.password {
        errors.push(Field::ConfirmPassword, Reason::Mismatch);
    }
    if !form.accept_terms {
        errors.push(Field::Terms, Reason::NotAccepted);
    }
    if !form.data_consent {
        errors.push(Field::DataConsent, Reason::NotAccepted);
    }

    errors.into_result()
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !is_valid_email(email) {
        errors.push(Field::Email, Reason::InvalidFormat);
    }
    if !is_valid_password(password) {
        errors.push(Field::Password, Reason::TooShort);
    }
    errors.into_result()
}

pub fn validate_password_reset(password: &str, confirm: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !is_valid_password(password) {
        errors.push(Field::Password, Reason::TooShort);
    }
    if confirm != password {
        errors.push(Field::ConfirmPassword, Reason::Mismatch);
    }
    errors.into_result()
}
