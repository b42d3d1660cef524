//! The credential container installed in front of the native entry points.
//!
//! [`CredentialsContainer`] decorates whatever credential implementation the
//! environment already provides. A call is intercepted only when the bridged
//! backend is usable and the request actually carries public-key options;
//! everything else delegates to the wrapped implementation untouched. This
//! is the one layer that turns [`ErrorCode`] data into thrown
//! [`WebauthnException`] values.

use tokio::sync::OnceCell;

use async_trait::async_trait;
use webauthn_bridge_types::{
    credential::{AssertedCredential, RegisteredCredential},
    error::{ErrorCode, WebauthnException},
    wire::{CredentialCreationOptions, CredentialRequestOptions, Mediation},
};

use crate::{
    bridge::{BridgeResult, RequestBridge, RequestContext},
    origin::{self, Frame},
    service::BackendLoader,
    BridgeError,
};

/// The credential implementation that was installed before this container.
///
/// `Ok(None)` is the native "no result" outcome and is passed through
/// unchanged.
#[async_trait]
pub trait NativeCredentials: Send + Sync {
    /// The native credential creation entry point.
    async fn create(
        &self,
        options: CredentialCreationOptions,
    ) -> Result<Option<RegisteredCredential>, WebauthnException>;

    /// The native credential assertion entry point.
    async fn get(
        &self,
        options: CredentialRequestOptions,
    ) -> Result<Option<AssertedCredential>, WebauthnException>;

    /// The native user-verifying platform authenticator probe.
    async fn is_user_verifying_platform_authenticator_available(&self) -> bool;

    /// The native conditional mediation probe.
    async fn is_conditional_mediation_available(&self) -> bool;
}

/// Bridged drop-in for the standard credential container.
///
/// One container serves one frame. The availability probe runs once per
/// container and its outcome, usable or not, is cached for the container's
/// lifetime.
pub struct CredentialsContainer<F, N, L> {
    frame: F,
    native: N,
    bridge: RequestBridge<L>,
    backend_usable: OnceCell<bool>,
}

impl<F, N, L> CredentialsContainer<F, N, L>
where
    F: Frame + Sync,
    N: NativeCredentials,
    L: BackendLoader,
{
    /// Wrap `native` with the bridged backend for requests from `frame`.
    pub fn new(frame: F, native: N, bridge: RequestBridge<L>) -> Self {
        Self {
            frame,
            native,
            bridge,
            backend_usable: OnceCell::new(),
        }
    }

    /// Create a credential, bridging when the backend is usable and the
    /// request carries public-key options.
    ///
    /// `Ok(None)` means the operation could not even be attempted, matching
    /// the calling API's silent no-result behavior.
    pub async fn create(
        &self,
        options: CredentialCreationOptions,
    ) -> Result<Option<RegisteredCredential>, BridgeError> {
        if !self.backend_usable().await {
            return self.native.create(options).await.map_err(Into::into);
        }
        let Some(public_key) = options.public_key else {
            return self
                .native
                .create(CredentialCreationOptions { public_key: None })
                .await
                .map_err(Into::into);
        };
        let Some(context) = self.request_context() else {
            return Ok(None);
        };
        match self.bridge.create(public_key, &context).await {
            BridgeResult::Success(data) => Ok(Some(RegisteredCredential::try_from(data)?)),
            BridgeResult::Failure(code) => Err(code.into()),
            BridgeResult::Unavailable => Err(ErrorCode::NotSupported.into()),
        }
    }

    /// Assert a credential, bridging when the backend is usable and the
    /// request carries public-key options.
    ///
    /// Conditional mediation is refused here, before the bridge is reached.
    pub async fn get(
        &self,
        options: CredentialRequestOptions,
    ) -> Result<Option<AssertedCredential>, BridgeError> {
        if !self.backend_usable().await {
            return self.native.get(options).await.map_err(Into::into);
        }
        if options.mediation == Mediation::Conditional {
            return Err(ErrorCode::NotSupported.into());
        }
        let Some(public_key) = options.public_key else {
            return self
                .native
                .get(CredentialRequestOptions {
                    public_key: None,
                    mediation: options.mediation,
                })
                .await
                .map_err(Into::into);
        };
        let Some(context) = self.request_context() else {
            return Ok(None);
        };
        match self.bridge.get(public_key, options.mediation, &context).await {
            BridgeResult::Success(data) => Ok(Some(AssertedCredential::try_from(data)?)),
            BridgeResult::Failure(code) => Err(code.into()),
            BridgeResult::Unavailable => Err(ErrorCode::NotSupported.into()),
        }
    }

    /// Whether a user-verifying platform authenticator is available.
    ///
    /// Unconditionally true while the bridged backend is usable, otherwise
    /// the native probe answers.
    pub async fn is_user_verifying_platform_authenticator_available(&self) -> bool {
        if self.backend_usable().await {
            true
        } else {
            self.native
                .is_user_verifying_platform_authenticator_available()
                .await
        }
    }

    /// Whether conditional mediation is available.
    ///
    /// Unconditionally false while the bridged backend is usable, since the
    /// backend has no conditional UI; otherwise the native probe answers.
    pub async fn is_conditional_mediation_available(&self) -> bool {
        if self.backend_usable().await {
            false
        } else {
            self.native.is_conditional_mediation_available().await
        }
    }

    async fn backend_usable(&self) -> bool {
        *self
            .backend_usable
            .get_or_init(|| self.bridge.is_available())
            .await
    }

    fn request_context(&self) -> Option<RequestContext> {
        let origin = origin::resolve(&self.frame)?;
        let window_handle = self.frame.window_handle()?;
        Some(RequestContext {
            origin,
            is_public_suffix: origin::is_public_suffix,
            window_handle,
        })
    }
}
