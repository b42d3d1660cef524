//! The closed error taxonomy shared across the privilege boundary.
//!
//! The bridge protocol cannot propagate live error objects between
//! processes, so the backend reports failures as an [`ErrorCode`] carried as
//! plain data. A single layer on the calling side converts the code into a
//! caller-facing [`WebauthnException`] with the matching standard message.

use std::fmt;

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Error codes a bridged operation can fail with.
///
/// The set is closed and mirrors the exception taxonomy of the credential
/// management API; no free-form error strings cross the boundary. Codes
/// serialize to their DOMException names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[typeshare(serialized_as = "String")]
pub enum ErrorCode {
    /// The operation either timed out or was declined.
    #[serde(rename = "NotAllowedError")]
    NotAllowed,

    /// The calling origin is not valid for the claimed relying party
    /// identifier.
    #[serde(rename = "SecurityError")]
    Security,

    /// The request arguments could not be parsed.
    #[serde(rename = "TypeError")]
    Type,

    /// The operation was cancelled.
    #[serde(rename = "AbortError")]
    Abort,

    /// The backend, feature, or mediation mode is unsupported.
    #[serde(rename = "NotSupportedError")]
    NotSupported,

    /// The user attempted to register a credential that already exists on
    /// this authenticator for the relying party.
    #[serde(rename = "InvalidStateError")]
    InvalidState,
}

impl ErrorCode {
    /// The DOMException name this code maps to.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::NotAllowed => "NotAllowedError",
            ErrorCode::Security => "SecurityError",
            ErrorCode::Type => "TypeError",
            ErrorCode::Abort => "AbortError",
            ErrorCode::NotSupported => "NotSupportedError",
            ErrorCode::InvalidState => "InvalidStateError",
        }
    }

    /// The caller-facing message for this code.
    ///
    /// The wording mirrors what mainstream browsers raise for the same
    /// conditions, so developers see the errors they already expect.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::NotAllowed => {
                "The operation either timed out or was not allowed. \
                 See: https://www.w3.org/TR/webauthn-2/#sctn-privacy-considerations-client."
            }
            ErrorCode::Security => "The calling domain is not a valid domain.",
            ErrorCode::Type => "Failed to parse arguments.",
            ErrorCode::Abort => "The operation was aborted.",
            ErrorCode::NotSupported => "The user agent does not support this operation.",
            ErrorCode::InvalidState => {
                "The user attempted to register an authenticator that contains one \
                 of the credentials already registered with the relying party."
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The caller-facing exception produced from an [`ErrorCode`].
///
/// Constructed exclusively at the compatibility layer; everything below it
/// passes codes around as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebauthnException {
    code: ErrorCode,
    message: &'static str,
}

impl WebauthnException {
    /// The code this exception was converted from.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The standard message for the code.
    pub fn message(&self) -> &'static str {
        self.message
    }
}

impl From<ErrorCode> for WebauthnException {
    fn from(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.message(),
        }
    }
}

impl fmt::Display for WebauthnException {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.code.name(), self.message)
    }
}

impl std::error::Error for WebauthnException {}
