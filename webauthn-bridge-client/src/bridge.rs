//! The request/response protocol across the privilege boundary.
//!
//! Requests travel with their resolved origin context as one unit; the
//! backend never sees a request without the context that authorizes it.
//! Errors come back as plain [`ErrorCode`] data, never as live exceptions;
//! the container layer turns them into caller-facing exceptions.

use async_trait::async_trait;
use webauthn_bridge_types::{
    error::ErrorCode,
    wire::{
        AssertedCredentialData, CreatedCredentialData, Mediation, NativeWindowHandle,
        OriginContext, PublicKeyAssertionOptions, PublicKeyCreationOptions,
    },
};

use crate::service::{AuthenticatorServiceHandle, BackendLoader};

/// Everything a backend call carries besides the raw request options.
///
/// Sent as one atomic unit so the backend always observes origin context,
/// suffix policy and UI anchor together.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Resolved origin context of the calling frame.
    pub origin: OriginContext,

    /// Predicate the backend uses to refuse relying party identifiers that
    /// are themselves public suffixes.
    pub is_public_suffix: fn(&str) -> bool,

    /// Native window handle anchoring any authenticator UI, passed through
    /// unmodified.
    pub window_handle: NativeWindowHandle,
}

/// Outcome of one bridged request. Exactly one variant applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeResult<T> {
    /// The backend completed the operation.
    Success(T),

    /// The backend refused the operation with a code from the closed set.
    Failure(ErrorCode),

    /// No backend exists on this platform, or loading it failed.
    Unavailable,
}

/// The privileged authenticator, seen from the rendering side.
///
/// The concrete implementation wraps whatever transport crosses the
/// privilege boundary; tests substitute a fake.
#[async_trait]
pub trait AuthenticatorBackend: Send + Sync {
    /// Create a credential for the relying party claimed in `options`.
    async fn create_credential(
        &self,
        options: PublicKeyCreationOptions,
        context: &RequestContext,
    ) -> Result<CreatedCredentialData, ErrorCode>;

    /// Assert an existing credential for the relying party claimed in
    /// `options`.
    async fn get_credential(
        &self,
        options: PublicKeyAssertionOptions,
        context: &RequestContext,
    ) -> Result<AssertedCredentialData, ErrorCode>;
}

/// Carries credential requests across the privilege boundary.
#[derive(Debug)]
pub struct RequestBridge<L> {
    service: AuthenticatorServiceHandle<L>,
}

impl<L: BackendLoader> RequestBridge<L> {
    /// Build a bridge over the given service handle.
    pub fn new(service: AuthenticatorServiceHandle<L>) -> Self {
        Self { service }
    }

    /// Whether a backend can be obtained at all. Triggers the lazy load.
    pub async fn is_available(&self) -> bool {
        self.service.acquire().await.is_some()
    }

    /// Perform a bridged credential creation.
    pub async fn create(
        &self,
        options: PublicKeyCreationOptions,
        context: &RequestContext,
    ) -> BridgeResult<CreatedCredentialData> {
        let Some(backend) = self.service.acquire().await else {
            return BridgeResult::Unavailable;
        };
        match backend.create_credential(options, context).await {
            Ok(data) => BridgeResult::Success(data),
            Err(code) => BridgeResult::Failure(code),
        }
    }

    /// Perform a bridged credential assertion.
    ///
    /// Conditional mediation is refused before any backend work; the backend
    /// has no model of conditional UI.
    pub async fn get(
        &self,
        options: PublicKeyAssertionOptions,
        mediation: Mediation,
        context: &RequestContext,
    ) -> BridgeResult<AssertedCredentialData> {
        if mediation == Mediation::Conditional {
            return BridgeResult::Failure(ErrorCode::NotSupported);
        }
        let Some(backend) = self.service.acquire().await else {
            return BridgeResult::Unavailable;
        };
        match backend.get_credential(options, context).await {
            Ok(data) => BridgeResult::Success(data),
            Err(code) => BridgeResult::Failure(code),
        }
    }
}
