//! Text envelope codec.
//!
//! Token layout: `PREFIX || base58(gzip(canonical JSON))`, where the
//! 4-character prefix is `"REQ:"` for requests and `"LIC:"` for licenses.

use crate::base58;
use crate::error::{LicenseError, LicenseResult};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use hwbind_crypto::to_canonical_bytes;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::io::{Read, Write};

/// Length of every tag prefix.
pub const PREFIX_LEN: usize = 4;

/// Largest decompressed record accepted from a token.
pub const MAX_RECORD_SIZE: u64 = 1024 * 1024;

/// What a token carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A license request (`"REQ:"`).
    Request,
    /// A license (`"LIC:"`).
    License,
}

impl Tag {
    /// The token prefix for this tag.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Request => "REQ:",
            Self::License => "LIC:",
        }
    }

    /// Parses a token prefix.
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "REQ:" => Some(Self::Request),
            "LIC:" => Some(Self::License),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::License => f.write_str("license"),
        }
    }
}

/// Encodes a record as a tagged text token.
///
/// # Errors
///
/// Fails only if the record cannot be serialized or compressed.
pub fn encode<T: Serialize>(record: &T, tag: Tag) -> LicenseResult<String> {
    let json = to_canonical_bytes(record)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    Ok(format!("{}{}", tag.prefix(), base58::encode(&compressed)))
}

/// Decodes a token of either tag.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// - [`LicenseError::Format`] if the token is shorter than the prefix or
///   the prefix is unknown
/// - [`LicenseError::Encoding`] on a character outside the base-58 alphabet
/// - [`LicenseError::Corruption`] if decompression or deserialization fails
pub fn decode<T: DeserializeOwned>(token: &str) -> LicenseResult<(T, Tag)> {
    let (tag, body) = split_token(token)?;
    Ok((decode_body(body, tag)?, tag))
}

/// Decodes a token that must carry `expected`.
///
/// # Errors
///
/// As [`decode`], plus [`LicenseError::Format`] when the token carries the
/// other tag. The tag is checked before the body is touched.
pub fn decode_as<T: DeserializeOwned>(token: &str, expected: Tag) -> LicenseResult<T> {
    let (tag, body) = split_token(token)?;
    if tag != expected {
        return Err(LicenseError::Format(format!(
            "expected a {expected} token, found a {tag} token"
        )));
    }
    decode_body(body, tag)
}

fn split_token(token: &str) -> LicenseResult<(Tag, &str)> {
    let token = token.trim();
    if token.len() < PREFIX_LEN {
        return Err(LicenseError::Format(format!(
            "token too short ({} bytes)",
            token.len()
        )));
    }

    let (prefix, body) = token
        .split_at_checked(PREFIX_LEN)
        .ok_or_else(|| LicenseError::Format("token prefix is not ASCII".to_string()))?;
    let tag = Tag::from_prefix(prefix)
        .ok_or_else(|| LicenseError::Format(format!("unknown token prefix {prefix:?}")))?;

    Ok((tag, body))
}

fn decode_body<T: DeserializeOwned>(body: &str, tag: Tag) -> LicenseResult<T> {
    let compressed = base58::decode(body)?;

    let mut json = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .take(MAX_RECORD_SIZE + 1)
        .read_to_end(&mut json)
        .map_err(|e| LicenseError::Corruption(format!("decompression failed: {e}")))?;
    if json.len() as u64 > MAX_RECORD_SIZE {
        return Err(LicenseError::Corruption(format!(
            "{tag} record exceeds {MAX_RECORD_SIZE} bytes"
        )));
    }

    serde_json::from_slice(&json)
        .map_err(|e| LicenseError::Corruption(format!("invalid {tag} record: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_four_bytes() {
        assert_eq!(Tag::Request.prefix().len(), PREFIX_LEN);
        assert_eq!(Tag::License.prefix().len(), PREFIX_LEN);
    }

    #[test]
    fn prefix_roundtrip() {
        for tag in [Tag::Request, Tag::License] {
            assert_eq!(Tag::from_prefix(tag.prefix()), Some(tag));
        }
        assert_eq!(Tag::from_prefix("req:"), None);
    }
}
