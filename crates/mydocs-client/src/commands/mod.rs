//! Command handlers invoked by the screens.
//!
//! Each sub-module groups related commands by domain. Every command takes
//! the [`crate::state::SharedState`] first and returns `Result<_, String>`.

pub mod account;
pub mod attachments;
pub mod documents;

use std::str::FromStr;

fn parse_id<T>(value: &str, what: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| format!("Invalid {what}: {e}"))
}
