//! Encoding helpers for the wire representation used across the privilege
//! boundary.
//!
//! Every binary field on the wire is base64url without padding. Decoding
//! accepts optional trailing padding for compatibility with backends that
//! emit it, but is otherwise strict: an input whose unpadded length leaves a
//! remainder of 1 has no valid padding at all and is rejected, as is any byte
//! outside the base64url alphabet.

use std::fmt;

use data_encoding::{Specification, BASE64URL, BASE64URL_NOPAD};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// The reason a wire string failed to decode into bytes.
///
/// Decode failures are fatal to the single call they occur in; they are never
/// coerced into empty or truncated buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare(serialized_as = "String")]
pub enum DecodeError {
    /// The input length leaves a remainder of 1 when divided by 4; no
    /// padding makes such a string valid base64.
    IllegalLength,
    /// The input contains a character outside the base64url alphabet.
    InvalidSymbol,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::IllegalLength => write!(f, "illegal base64url string length"),
            DecodeError::InvalidSymbol => write!(f, "invalid base64url character"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Convert bytes to base64url without padding.
pub fn base64url(data: &[u8]) -> String {
    BASE64URL_NOPAD.encode(data)
}

/// Decode a base64url string, with or without padding, into bytes.
///
/// This is total over its documented input domain: every well-formed
/// base64url string of length remainder 0, 2 or 3 decodes, and everything
/// else yields a [`DecodeError`].
pub fn decode_base64url(input: &str) -> Result<Vec<u8>, DecodeError> {
    let specs = BASE64URL.specification();
    let padding = specs.padding.unwrap();
    let specs = Specification {
        check_trailing_bits: false,
        padding: None,
        ..specs
    };
    let encoding = specs.encoding().unwrap();

    let sane_string = input.trim_end_matches(padding);
    if sane_string.len() % 4 == 1 {
        return Err(DecodeError::IllegalLength);
    }
    encoding
        .decode(sane_string.as_bytes())
        .map_err(|_| DecodeError::InvalidSymbol)
}
