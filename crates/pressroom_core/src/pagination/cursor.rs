//! Opaque cursor codec.
//!
//! Token format: base64url (no padding) of `"<id>:<created_at epoch seconds>"`.
//! The encoding only keeps clients from casually editing fields; it carries no
//! integrity check.
//!
//! # Invariants
//! - `decode_cursor(&encode_cursor(id, t)) == Ok((id, t))` for every `i64` pair.
//! - Decoding any input returns a value or a [`CursorError`]; it never panics.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;

const FIELD_SEPARATOR: char = ':';

/// Accepts tokens with or without trailing `=` padding.
const DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Malformed cursor token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// Token is not valid base64url.
    Encoding(base64::DecodeError),
    /// Decoded payload is not UTF-8.
    Utf8,
    /// Payload does not split into exactly two `:`-separated fields.
    FieldCount(usize),
    /// A field is not a base-10 integer.
    InvalidNumber {
        field: &'static str,
        source: ParseIntError,
    },
}

impl Display for CursorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encoding(err) => write!(f, "malformed cursor: {err}"),
            Self::Utf8 => write!(f, "malformed cursor: payload is not valid UTF-8"),
            Self::FieldCount(count) => {
                write!(f, "malformed cursor: expected 2 fields, found {count}")
            }
            Self::InvalidNumber { field, source } => {
                write!(f, "malformed cursor: invalid {field}: {source}")
            }
        }
    }
}

impl Error for CursorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encoding(err) => Some(err),
            Self::InvalidNumber { source, .. } => Some(source),
            Self::Utf8 | Self::FieldCount(_) => None,
        }
    }
}

/// Encodes an article position into an opaque token.
pub fn encode_cursor(id: i64, created_at: i64) -> String {
    URL_SAFE_NO_PAD.encode(format!("{id}{FIELD_SEPARATOR}{created_at}"))
}

/// Decodes a token produced by [`encode_cursor`] into `(id, created_at)`.
///
/// # Errors
/// - [`CursorError`] for any token that is not a well-formed encoding.
pub fn decode_cursor(token: &str) -> Result<(i64, i64), CursorError> {
    let bytes = DECODER.decode(token).map_err(CursorError::Encoding)?;
    let payload = String::from_utf8(bytes).map_err(|_| CursorError::Utf8)?;

    let fields = payload.split(FIELD_SEPARATOR).collect::<Vec<_>>();
    let [id, created_at] = fields.as_slice() else {
        return Err(CursorError::FieldCount(fields.len()));
    };

    let id = id
        .parse::<i64>()
        .map_err(|source| CursorError::InvalidNumber { field: "id", source })?;
    let created_at = created_at
        .parse::<i64>()
        .map_err(|source| CursorError::InvalidNumber {
            field: "created_at",
            source,
        })?;

    Ok((id, created_at))
}
