//! Key normalization for document file names.
//!
//! A key becomes part of a file name, so it is held to a strict whitelist:
//! - Must be non-empty
//! - Must consist only of `[A-Za-z0-9_-]`
//! - Is never case-folded, truncated, or otherwise rewritten
//!
//! Anything outside the whitelist (`/`, `.`, whitespace, NUL, non-ASCII) is
//! rejected rather than stripped, so two distinct valid keys can never name
//! the same file and no key can reach outside its collection directory.
//!
//! Numeric keys (player ids) must additionally be canonical decimal
//! integers greater than zero.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// How a collection interprets its keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// Any non-empty whitelisted token (company ids).
    Text,
    /// A canonical decimal integer greater than zero (player ids).
    PositiveInteger,
}

impl KeyKind {
    /// Normalize `raw` according to this kind.
    pub fn normalize(self, raw: &str) -> StoreResult<SafeKey> {
        match self {
            Self::Text => normalize(raw),
            Self::PositiveInteger => normalize_numeric(raw),
        }
    }
}

/// A key that has passed normalization and is safe to embed in a file name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SafeKey(String);

impl SafeKey {
    /// Build a key from a numeric id. Zero is rejected.
    pub fn from_id(id: u64) -> StoreResult<Self> {
        if id == 0 {
            return Err(StoreError::invalid_key("0", "must be greater than zero"));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SafeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SafeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_allowed(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

/// Normalize a caller-supplied key.
///
/// # Examples
///
/// ```
/// use rovernet_store::key::normalize;
///
/// assert_eq!(normalize("acme-co_1").unwrap().as_str(), "acme-co_1");
/// assert!(normalize("../../etc").is_err());
/// assert!(normalize("").is_err());
/// ```
pub fn normalize(raw: &str) -> StoreResult<SafeKey> {
    if raw.is_empty() {
        return Err(StoreError::invalid_key(raw, "key must not be empty"));
    }

    let filtered: String = raw.chars().filter(|ch| is_allowed(*ch)).collect();
    if filtered != raw {
        let bad = raw.chars().find(|ch| !is_allowed(*ch)).unwrap_or_default();
        return Err(StoreError::invalid_key(
            raw,
            format!("contains forbidden character: {bad:?}"),
        ));
    }

    Ok(SafeKey(filtered))
}

/// Normalize a numeric key such as a player id.
///
/// Only canonical spellings are accepted: `"42"` is valid, `"042"`, `"+42"`
/// and `"42.0"` are not, so every id has exactly one file.
pub fn normalize_numeric(raw: &str) -> StoreResult<SafeKey> {
    let key = normalize(raw)?;

    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoreError::invalid_key(raw, "must be a positive whole number"));
    }
    if raw.starts_with('0') {
        let reason = if raw.bytes().all(|b| b == b'0') {
            "must be greater than zero"
        } else {
            "must not have leading zeros"
        };
        return Err(StoreError::invalid_key(raw, reason));
    }
    raw.parse::<u64>()
        .map_err(|e| StoreError::invalid_key(raw, format!("out of range: {e}")))?;

    Ok(key)
}
