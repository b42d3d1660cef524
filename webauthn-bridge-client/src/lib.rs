//! Rendering-side half of a privileged WebAuthn bridge.
//!
//! Web content in a sandboxed rendering context cannot talk to the platform
//! authenticator directly. This crate supplies the pieces that sit on the
//! rendering side of that privilege boundary:
//!
//! - [`origin`]: resolves which origin is claiming the operation, including
//!   nested cross-origin frames, and the public suffix policy check.
//! - [`service`]: lazy, single-flight loading of the privileged backend,
//!   gated to the one supported platform.
//! - [`bridge`]: the request/response protocol that carries options and
//!   origin context across the boundary as one unit.
//! - [`container`]: the decorated credential entry points that intercept
//!   public-key requests and fall back to the native implementation for
//!   everything else.
//!
//! Wire records, credential mapping and the error taxonomy live in
//! [`webauthn_bridge_types`].

pub mod bridge;
pub mod container;
pub mod origin;
pub mod service;

pub use bridge::{AuthenticatorBackend, BridgeResult, RequestBridge, RequestContext};
pub use container::{CredentialsContainer, NativeCredentials};
pub use origin::{is_public_suffix, resolve, Frame, FrameId};
pub use service::{AuthenticatorServiceHandle, BackendLoader, LoadError, Platform};

use std::fmt;

use webauthn_bridge_types::{
    error::{ErrorCode, WebauthnException},
    DecodeError,
};

/// Error raised by the decorated credential entry points.
///
/// Backend refusals arrive as exception values with the standard messages;
/// a malformed wire field in an otherwise successful response is a distinct
/// decode failure, never coerced into the closed exception set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The operation failed with a caller-facing exception.
    Webauthn(WebauthnException),

    /// A binary field of the response was not valid base64url.
    Decode(DecodeError),
}

impl From<WebauthnException> for BridgeError {
    fn from(exception: WebauthnException) -> Self {
        Self::Webauthn(exception)
    }
}

impl From<ErrorCode> for BridgeError {
    fn from(code: ErrorCode) -> Self {
        Self::Webauthn(code.into())
    }
}

impl From<DecodeError> for BridgeError {
    fn from(error: DecodeError) -> Self {
        Self::Decode(error)
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Webauthn(exception) => write!(f, "{exception}"),
            Self::Decode(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for BridgeError {}

#[cfg(test)]
mod tests;
