use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use mydocs_shared::credentials::{hash_password, is_password_hash, verify_password};
use mydocs_shared::validation::{
    is_valid_email, validate_account, validate_login, validate_password_reset, AccountForm,
};
use mydocs_store::User;

use crate::state::{lock, Session, SharedState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub full_name: String,
    pub email: String,
    pub created_at: String,
    pub logged_in: bool,
}

fn make_account_dto(user: &User, logged_in: bool) -> AccountDto {
    AccountDto {
        full_name: user.full_name.clone(),
        email: user.email.clone(),
        created_at: user.created_at.to_rfc3339(),
        logged_in,
    }
}

/// Create the local account, replacing any previous one.
pub fn create_account(state: &SharedState, form: AccountForm) -> Result<AccountDto, String> {
    validate_account(&form).map_err(|e| e.to_string())?;

    let password_hash =
        hash_password(&form.password).map_err(|e| format!("Failed to hash password: {e}"))?;
    let user = User {
        full_name: form.full_name,
        email: form.email,
        password_hash,
        created_at: Utc::now(),
    };

    let mut guard = lock(state)?;
    guard
        .store
        .save_user(&user)
        .map_err(|e| format!("Failed to save account: {e}"))?;
    guard.remembered_email = Some(user.email.clone());
    guard.persist_session();

    info!(email = %user.email, "account created");
    Ok(make_account_dto(&user, false))
}

pub fn login(state: &SharedState, email: &str, password: &str) -> Result<AccountDto, String> {
    validate_login(email, password).map_err(|e| e.to_string())?;

    let mut guard = lock(state)?;
    let user = guard
        .store
        .load_user()
        .filter(|u| u.email == email && verify_password(password, &u.password_hash))
        .ok_or_else(|| {
            warn!(email, "login rejected");
            "Invalid credentials".to_string()
        })?;

    if !is_password_hash(&user.password_hash) {
        upgrade_legacy_password(&guard.store, &user, password);
    }

    guard.session = Some(Session {
        email: user.email.clone(),
        started_at: Utc::now(),
    });
    guard.remembered_email = Some(user.email.clone());
    guard.persist_session();

    info!(email = %user.email, "logged in");
    Ok(make_account_dto(&user, true))
}

// best effort: the login itself already succeeded
fn upgrade_legacy_password(store: &mydocs_store::LocalStore, user: &User, password: &str) {
    let upgraded = hash_password(password).map(|password_hash| User {
        password_hash,
        ..user.clone()
    });
    match upgraded {
        Ok(u) => match store.save_user(&u) {
            Ok(()) => info!(email = %u.email, "plaintext password replaced by hash"),
            Err(e) => warn!(error = %e, "could not rewrite legacy user record"),
        },
        Err(e) => warn!(error = %e, "could not hash legacy password"),
    }
}

pub fn logout(state: &SharedState) -> Result<(), String> {
    let mut guard = lock(state)?;
    if let Some(session) = guard.session.take() {
        info!(email = %session.email, "logged out");
    }
    guard.remembered_email = None;
    guard.persist_session();
    Ok(())
}

/// The stored account, when a user is logged in.
pub fn current_account(state: &SharedState) -> Result<Option<AccountDto>, String> {
    let guard = lock(state)?;
    if !guard.is_logged_in() {
        return Ok(None);
    }
    Ok(guard.store.load_user().map(|u| make_account_dto(&u, true)))
}

pub fn remembered_email(state: &SharedState) -> Result<Option<String>, String> {
    Ok(lock(state)?.remembered_email.clone())
}

/// Set a new password for the stored account.
pub fn reset_password(
    state: &SharedState,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), String> {
    if !is_valid_email(email) {
        return Err("Invalid email".to_string());
    }
    validate_password_reset(password, confirm_password).map_err(|e| e.to_string())?;

    let guard = lock(state)?;
    let user = guard
        .store
        .load_user()
        .filter(|u| u.email == email)
        .ok_or_else(|| "No account for this email".to_string())?;

    let password_hash =
        hash_password(password).map_err(|e| format!("Failed to hash password: {e}"))?;
    guard
        .store
        .save_user(&User {
            password_hash,
            ..user
        })
        .map_err(|e| format!("Failed to save account: {e}"))?;

    info!(email, "password reset");
    Ok(())
}
