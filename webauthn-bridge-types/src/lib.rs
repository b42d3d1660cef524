//! # WebAuthn Bridge Types
//!
//! Type definitions shared by both sides of the privileged WebAuthn bridge:
//! the wire-safe serialized records that cross the privilege boundary, the
//! closed error taxonomy, and the in-memory credential objects the calling
//! context receives after decoding.
//!
//! Binary material is carried on the wire as base64url strings without
//! padding. The [`Bytes`] newtype decodes those strings strictly; malformed
//! input surfaces as a [`DecodeError`] rather than being silently truncated.

mod utils;

pub mod credential;
pub mod error;
pub mod wire;

// Re-exports
pub use utils::{
    bytes::Bytes,
    encoding::{self, DecodeError},
};
