//! # WebAuthn Bridge
//!
//! Web content running in a sandboxed rendering context cannot reach the
//! platform authenticator on its own. This library bridges that gap: it
//! intercepts the standard credential creation and assertion entry points,
//! resolves which origin is claiming the operation (including nested
//! cross-origin iframe cases), carries the request across the privilege
//! boundary to a platform authenticator service, and converts the wire-safe
//! serialized result back into the credential object graph the calling
//! context expects. It is comprised of two sub-libraries:
//!
//! - `webauthn-bridge-client` - usable as [`client`], the rendering-side
//!   logic: origin resolution, lazy single-flight backend loading, the
//!   request bridge, and the decorated credential container.
//! - `webauthn-bridge-types` - usable as [`types`], the wire records,
//!   base64url codec, mapped credential objects, and the closed error
//!   taxonomy shared across the boundary.
//!
//! You can think of a bridged request as the following chain:
//!
//! web content <-> [`CredentialsContainer`](client::CredentialsContainer) <->
//! [`RequestBridge`](client::RequestBridge) <->
//! [`AuthenticatorBackend`](client::AuthenticatorBackend)
//!
//! The [`CredentialsContainer`](client::CredentialsContainer) decorates the
//! environment's native credential implementation. A call is only
//! intercepted when it carries public-key options and the privileged backend
//! is usable; everything else, and every call on a platform without a
//! backend, delegates to the wrapped native implementation so absence of the
//! backend degrades gracefully instead of breaking unrelated callers.
//!
//! The privileged side of the boundary is abstracted as two capability
//! traits: [`BackendLoader`](client::BackendLoader) performs the one-time
//! expensive initialization through
//! [`AuthenticatorServiceHandle`](client::AuthenticatorServiceHandle), and
//! [`AuthenticatorBackend`](client::AuthenticatorBackend) performs the
//! actual create/get operations. Both are injected, so the whole bridge is
//! testable with fakes and the transport crossing the boundary stays an
//! implementation detail of the embedding application.
//!
//! ### Example: bridging a creation request
//!
//! The calling frame, the native fallback and the backend loader are all
//! supplied by the embedding environment; stubs stand in for them here.
//!
//! ```
//! use webauthn_bridge::{
//!     client::{
//!         AuthenticatorBackend, AuthenticatorServiceHandle, BackendLoader, CredentialsContainer,
//!         Frame, FrameId, LoadError, Platform, RequestBridge, RequestContext,
//!     },
//!     types::{
//!         wire::{CredentialCreationOptions, NativeWindowHandle, PublicKeyCreationOptions},
//!         Bytes,
//!     },
//! };
//! # use std::sync::Arc;
//! # use webauthn_bridge::{
//! #     client::NativeCredentials,
//! #     types::{
//! #         credential::{AssertedCredential, RegisteredCredential},
//! #         encoding,
//! #         error::{ErrorCode, WebauthnException},
//! #         wire::{
//! #             AssertedCredentialData, CreatedCredentialData, CredentialRequestOptions,
//! #             PublicKeyAssertionOptions,
//! #         },
//! #     },
//! # };
//! #
//! # struct StubBackend;
//! # #[async_trait::async_trait]
//! # impl AuthenticatorBackend for StubBackend {
//! #     async fn create_credential(
//! #         &self,
//! #         _options: PublicKeyCreationOptions,
//! #         _context: &RequestContext,
//! #     ) -> Result<CreatedCredentialData, ErrorCode> {
//! #         Ok(CreatedCredentialData {
//! #             credential_id: encoding::base64url(&[1, 2, 3, 4]),
//! #             client_data_json: encoding::base64url(b"{}"),
//! #             auth_data: encoding::base64url(&[9; 37]),
//! #             attestation_object: encoding::base64url(&[7; 16]),
//! #             public_key: encoding::base64url(&[5; 12]),
//! #             public_key_algorithm: -7,
//! #             transports: vec!["internal".into()],
//! #             extensions: Default::default(),
//! #         })
//! #     }
//! #     async fn get_credential(
//! #         &self,
//! #         _options: PublicKeyAssertionOptions,
//! #         _context: &RequestContext,
//! #     ) -> Result<AssertedCredentialData, ErrorCode> {
//! #         Err(ErrorCode::NotAllowed)
//! #     }
//! # }
//! #
//! # struct StubLoader;
//! # #[async_trait::async_trait]
//! # impl BackendLoader for StubLoader {
//! #     async fn load(&self) -> Result<Arc<dyn AuthenticatorBackend>, LoadError> {
//! #         Ok(Arc::new(StubBackend))
//! #     }
//! # }
//! #
//! # struct NoNative;
//! # #[async_trait::async_trait]
//! # impl NativeCredentials for NoNative {
//! #     async fn create(
//! #         &self,
//! #         _options: CredentialCreationOptions,
//! #     ) -> Result<Option<RegisteredCredential>, WebauthnException> {
//! #         Ok(None)
//! #     }
//! #     async fn get(
//! #         &self,
//! #         _options: CredentialRequestOptions,
//! #     ) -> Result<Option<AssertedCredential>, WebauthnException> {
//! #         Ok(None)
//! #     }
//! #     async fn is_user_verifying_platform_authenticator_available(&self) -> bool {
//! #         false
//! #     }
//! #     async fn is_conditional_mediation_available(&self) -> bool {
//! #         false
//! #     }
//! # }
//! #
//! # #[derive(Clone)]
//! # struct PageFrame;
//! # impl Frame for PageFrame {
//! #     fn id(&self) -> FrameId {
//! #         FrameId(1)
//! #     }
//! #     fn origin(&self) -> Option<String> {
//! #         Some("https://rp.example".into())
//! #     }
//! #     fn top(&self) -> Option<Self> {
//! #         Some(PageFrame)
//! #     }
//! #     fn window_handle(&self) -> Option<NativeWindowHandle> {
//! #         Some(NativeWindowHandle(Bytes::from(vec![0; 8])))
//! #     }
//! # }
//! #
//! # tokio_test::block_on(async {
//! let service = AuthenticatorServiceHandle::with_platform(StubLoader, Platform::MacOs);
//! let container = CredentialsContainer::new(PageFrame, NoNative, RequestBridge::new(service));
//!
//! let options = CredentialCreationOptions {
//!     public_key: Some(PublicKeyCreationOptions(serde_json::json!({
//!         "rp": { "id": "rp.example" },
//!         "challenge": "AQIDBA",
//!     }))),
//! };
//!
//! let credential = container.create(options).await.unwrap().unwrap();
//! assert_eq!(credential.id(), "AQIDBA");
//! assert_eq!(credential.raw_id().as_slice(), &[1, 2, 3, 4]);
//! # })
//! ```

pub use webauthn_bridge_client as client;
pub use webauthn_bridge_types as types;
