//! Default labels for captured attachments.
//!
//! A captured photo gets `"Archivo N"` where `N` is one more than the highest
//! number already used in the same document. The value is always derived from
//! the current attachment list, so deleting the last numbered attachment frees
//! its number again.

use crate::constants::DEFAULT_LABEL_PREFIX;

/// Number `N` of a label of the exact form `"Archivo N"`.
pub fn parse_numbered_label(label: &str) -> Option<u32> {
    let rest = label.strip_prefix(DEFAULT_LABEL_PREFIX)?;
    let digits = rest.strip_prefix(' ')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Next free default label: highest `N` found plus one, gaps ignored.
pub fn next_default_label<'a, I>(labels: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let next = labels
        .into_iter()
        .filter_map(parse_numbered_label)
        .max()
        .map_or(1, |max| max.saturating_add(1));
    format!("{DEFAULT_LABEL_PREFIX} {next}")
}
