use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Semaphore;
use webauthn_bridge_types::{
    encoding,
    error::{ErrorCode, WebauthnException},
    wire::{
        AssertedCredentialData, AssertionExtensionsData, CreatedCredentialData,
        CreationExtensionsData, CredentialCreationOptions, CredentialRequestOptions, Mediation,
        NativeWindowHandle, OriginContext, PublicKeyAssertionOptions, PublicKeyCreationOptions,
    },
    Bytes,
};

use crate::{
    bridge::{AuthenticatorBackend, BridgeResult, RequestBridge, RequestContext},
    container::{CredentialsContainer, NativeCredentials},
    origin::{self, Frame, FrameId},
    service::{AuthenticatorServiceHandle, BackendLoader, LoadError, Platform},
    BridgeError,
};

#[derive(Clone)]
struct TestFrame {
    id: u64,
    origin: Option<String>,
    top: Option<Box<TestFrame>>,
    handle: Option<NativeWindowHandle>,
}

impl TestFrame {
    fn main(origin: &str) -> Self {
        let mut frame = TestFrame {
            id: 1,
            origin: Some(origin.into()),
            top: None,
            handle: Some(NativeWindowHandle(Bytes::from(vec![0xab; 8]))),
        };
        frame.top = Some(Box::new(frame.clone()));
        frame
    }

    fn nested(origin: &str, parent_origin: Option<&str>) -> Self {
        TestFrame {
            id: 2,
            origin: Some(origin.into()),
            top: Some(Box::new(TestFrame {
                id: 1,
                origin: parent_origin.map(Into::into),
                top: None,
                handle: None,
            })),
            handle: Some(NativeWindowHandle(Bytes::from(vec![0xab; 8]))),
        }
    }
}

impl Frame for TestFrame {
    fn id(&self) -> FrameId {
        FrameId(self.id)
    }

    fn origin(&self) -> Option<String> {
        self.origin.clone()
    }

    fn top(&self) -> Option<Self> {
        self.top.as_deref().cloned()
    }

    fn window_handle(&self) -> Option<NativeWindowHandle> {
        self.handle.clone()
    }
}

struct FakeBackend {
    creates: AtomicUsize,
    gets: AtomicUsize,
    credential_id: String,
    create_error: Option<ErrorCode>,
    get_error: Option<ErrorCode>,
    seen_origin: Mutex<Option<OriginContext>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            creates: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
            credential_id: encoding::base64url(&[1, 2, 3, 4]),
            create_error: None,
            get_error: None,
            seen_origin: Mutex::new(None),
        }
    }
}

impl FakeBackend {
    fn created_data(&self) -> CreatedCredentialData {
        CreatedCredentialData {
            credential_id: self.credential_id.clone(),
            client_data_json: encoding::base64url(br#"{"type":"webauthn.create"}"#),
            auth_data: encoding::base64url(&[9; 37]),
            attestation_object: encoding::base64url(&[7; 16]),
            public_key: encoding::base64url(&[5; 12]),
            public_key_algorithm: -7,
            transports: vec!["internal".into()],
            extensions: CreationExtensionsData::default(),
        }
    }

    fn asserted_data(&self) -> AssertedCredentialData {
        AssertedCredentialData {
            credential_id: self.credential_id.clone(),
            client_data_json: encoding::base64url(br#"{"type":"webauthn.get"}"#),
            authenticator_data: encoding::base64url(&[9; 37]),
            signature: encoding::base64url(&[13; 32]),
            user_handle: None,
            extensions: AssertionExtensionsData::default(),
        }
    }
}

#[async_trait]
impl AuthenticatorBackend for FakeBackend {
    async fn create_credential(
        &self,
        _options: PublicKeyCreationOptions,
        context: &RequestContext,
    ) -> Result<CreatedCredentialData, ErrorCode> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        *self.seen_origin.lock().unwrap() = Some(context.origin.clone());
        match self.create_error {
            Some(code) => Err(code),
            None => Ok(self.created_data()),
        }
    }

    async fn get_credential(
        &self,
        _options: PublicKeyAssertionOptions,
        context: &RequestContext,
    ) -> Result<AssertedCredentialData, ErrorCode> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        *self.seen_origin.lock().unwrap() = Some(context.origin.clone());
        match self.get_error {
            Some(code) => Err(code),
            None => Ok(self.asserted_data()),
        }
    }
}

struct TestLoader {
    loads: Arc<AtomicUsize>,
    gate: Option<Arc<Semaphore>>,
    failures_left: AtomicUsize,
    backend: Arc<FakeBackend>,
}

impl TestLoader {
    fn new(backend: Arc<FakeBackend>) -> Self {
        Self {
            loads: Arc::new(AtomicUsize::new(0)),
            gate: None,
            failures_left: AtomicUsize::new(0),
            backend,
        }
    }

    fn failing_first(backend: Arc<FakeBackend>, failures: usize) -> Self {
        let loader = Self::new(backend);
        loader.failures_left.store(failures, Ordering::SeqCst);
        loader
    }

    fn gated(backend: Arc<FakeBackend>, gate: Arc<Semaphore>) -> Self {
        let mut loader = Self::new(backend);
        loader.gate = Some(gate);
        loader
    }
}

#[async_trait]
impl BackendLoader for TestLoader {
    async fn load(&self) -> Result<Arc<dyn AuthenticatorBackend>, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.unwrap();
            permit.forget();
        }
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok()
        {
            return Err(LoadError::new("scripted failure"));
        }
        let backend: Arc<dyn AuthenticatorBackend> = self.backend.clone();
        Ok(backend)
    }
}

#[derive(Clone, Default)]
struct FakeNative {
    creates: Arc<AtomicUsize>,
    gets: Arc<AtomicUsize>,
    uvpa: bool,
    conditional: bool,
}

#[async_trait]
impl NativeCredentials for FakeNative {
    async fn create(
        &self,
        _options: CredentialCreationOptions,
    ) -> Result<Option<webauthn_bridge_types::credential::RegisteredCredential>, WebauthnException>
    {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    async fn get(
        &self,
        _options: CredentialRequestOptions,
    ) -> Result<Option<webauthn_bridge_types::credential::AssertedCredential>, WebauthnException>
    {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    async fn is_user_verifying_platform_authenticator_available(&self) -> bool {
        self.uvpa
    }

    async fn is_conditional_mediation_available(&self) -> bool {
        self.conditional
    }
}

fn request_context(origin: &str) -> RequestContext {
    RequestContext {
        origin: OriginContext {
            current_origin: origin.into(),
            top_frame_origin: None,
            is_main_frame: true,
        },
        is_public_suffix: origin::is_public_suffix,
        window_handle: NativeWindowHandle(Bytes::from(vec![0xab; 8])),
    }
}

fn creation_options() -> CredentialCreationOptions {
    CredentialCreationOptions {
        public_key: Some(PublicKeyCreationOptions(
            json!({ "rp": { "id": "rp.example" } }),
        )),
    }
}

fn request_options(mediation: Mediation) -> CredentialRequestOptions {
    CredentialRequestOptions {
        public_key: Some(PublicKeyAssertionOptions(
            json!({ "rpId": "rp.example" }),
        )),
        mediation,
    }
}

fn bridged_container(
    platform: Platform,
    backend: Arc<FakeBackend>,
    native: FakeNative,
    frame: TestFrame,
) -> (
    CredentialsContainer<TestFrame, FakeNative, TestLoader>,
    Arc<AtomicUsize>,
) {
    let loader = TestLoader::new(backend);
    let loads = loader.loads.clone();
    let service = AuthenticatorServiceHandle::with_platform(loader, platform);
    let container = CredentialsContainer::new(frame, native, RequestBridge::new(service));
    (container, loads)
}

mod origin_resolution {
    use super::*;

    #[test]
    fn nested_frame_carries_both_origins() {
        let frame = TestFrame::nested("https://embed.example", Some("https://parent.example"));
        assert_eq!(
            origin::resolve(&frame),
            Some(OriginContext {
                current_origin: "https://embed.example".into(),
                top_frame_origin: Some("https://parent.example".into()),
                is_main_frame: false,
            })
        );
    }

    #[test]
    fn main_frame_omits_top_origin() {
        let frame = TestFrame::main("https://rp.example");
        assert_eq!(
            origin::resolve(&frame),
            Some(OriginContext {
                current_origin: "https://rp.example".into(),
                top_frame_origin: None,
                is_main_frame: true,
            })
        );
    }

    #[test]
    fn unreadable_ancestor_origin_is_tolerated() {
        let frame = TestFrame::nested("https://embed.example", None);
        let context = origin::resolve(&frame).unwrap();
        assert!(!context.is_main_frame);
        assert!(context.top_frame_origin.is_none());
        assert_eq!(context.current_origin, "https://embed.example");
    }

    #[test]
    fn unreachable_top_frame_aborts() {
        let mut frame = TestFrame::main("https://rp.example");
        frame.top = None;
        assert_eq!(origin::resolve(&frame), None);
    }

    #[test]
    fn missing_or_empty_origin_aborts() {
        let mut frame = TestFrame::main("https://rp.example");
        frame.origin = None;
        assert_eq!(origin::resolve(&frame), None);

        let mut frame = TestFrame::main("https://rp.example");
        frame.origin = Some(String::new());
        assert_eq!(origin::resolve(&frame), None);
    }

    #[test]
    fn public_suffixes_have_no_registrable_portion() {
        for suffix in ["com", "co.uk", "\u{440}\u{444}", "xn--p1ai"] {
            assert!(origin::is_public_suffix(suffix), "{suffix}");
        }
        for registrable in [
            "example.com",
            "bbc.co.uk",
            "news.bbc.co.uk",
            "\u{43f}\u{440}\u{438}\u{43c}\u{435}\u{440}.\u{440}\u{444}",
        ] {
            assert!(!origin::is_public_suffix(registrable), "{registrable}");
        }
    }

    #[test]
    fn invalid_domains_are_conservatively_suffixes() {
        assert!(origin::is_public_suffix(""));
        assert!(origin::is_public_suffix("..."));
    }
}

mod service_handle {
    use super::*;

    #[tokio::test]
    async fn concurrent_acquires_share_one_load() {
        let gate = Arc::new(Semaphore::new(0));
        let loader = TestLoader::gated(Arc::new(FakeBackend::default()), gate.clone());
        let loads = loader.loads.clone();
        let handle = Arc::new(AuthenticatorServiceHandle::with_platform(
            loader,
            Platform::MacOs,
        ));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let handle = handle.clone();
                tokio::spawn(async move { handle.acquire().await })
            })
            .collect();

        // Let the first requester reach the loader before releasing it.
        while loads.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        gate.add_permits(1);

        for task in tasks {
            assert!(task.await.unwrap().is_some());
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_is_not_cached() {
        let loader = TestLoader::failing_first(Arc::new(FakeBackend::default()), 1);
        let loads = loader.loads.clone();
        let handle = AuthenticatorServiceHandle::with_platform(loader, Platform::MacOs);

        assert!(handle.acquire().await.is_none());
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        assert!(handle.acquire().await.is_some());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn successful_load_is_cached() {
        let loader = TestLoader::new(Arc::new(FakeBackend::default()));
        let loads = loader.loads.clone();
        let handle = AuthenticatorServiceHandle::with_platform(loader, Platform::MacOs);

        let first = handle.acquire().await.unwrap();
        let second = handle.acquire().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsupported_platforms_never_load() {
        for platform in [Platform::Windows, Platform::Linux, Platform::Other] {
            let loader = TestLoader::new(Arc::new(FakeBackend::default()));
            let loads = loader.loads.clone();
            let handle = AuthenticatorServiceHandle::with_platform(loader, platform);

            assert!(handle.acquire().await.is_none());
            assert!(handle.acquire().await.is_none());
            assert_eq!(loads.load(Ordering::SeqCst), 0);
        }
    }
}

mod request_bridge {
    use super::*;

    #[tokio::test]
    async fn conditional_mediation_is_rejected_before_any_backend_work() {
        let backend = Arc::new(FakeBackend::default());
        let loader = TestLoader::new(backend.clone());
        let loads = loader.loads.clone();
        let bridge = RequestBridge::new(AuthenticatorServiceHandle::with_platform(
            loader,
            Platform::MacOs,
        ));

        let result = bridge
            .get(
                PublicKeyAssertionOptions(json!({})),
                Mediation::Conditional,
                &request_context("https://rp.example"),
            )
            .await;
        assert_eq!(result, BridgeResult::Failure(ErrorCode::NotSupported));
        assert_eq!(loads.load(Ordering::SeqCst), 0);
        assert_eq!(backend.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unsupported_platform_reports_unavailable() {
        let loader = TestLoader::new(Arc::new(FakeBackend::default()));
        let bridge = RequestBridge::new(AuthenticatorServiceHandle::with_platform(
            loader,
            Platform::Linux,
        ));

        let result = bridge
            .create(
                PublicKeyCreationOptions(json!({})),
                &request_context("https://rp.example"),
            )
            .await;
        assert_eq!(result, BridgeResult::Unavailable);
    }

    #[tokio::test]
    async fn create_passes_origin_context_through() {
        let backend = Arc::new(FakeBackend::default());
        let loader = TestLoader::new(backend.clone());
        let bridge = RequestBridge::new(AuthenticatorServiceHandle::with_platform(
            loader,
            Platform::MacOs,
        ));

        let result = bridge
            .create(
                PublicKeyCreationOptions(json!({})),
                &request_context("https://rp.example"),
            )
            .await;
        assert!(matches!(result, BridgeResult::Success(_)));
        let seen = backend.seen_origin.lock().unwrap().clone().unwrap();
        assert_eq!(seen.current_origin, "https://rp.example");
    }
}

mod container {
    use super::*;

    #[tokio::test]
    async fn requests_without_public_key_options_delegate() {
        let backend = Arc::new(FakeBackend::default());
        let native = FakeNative::default();
        let native_creates = native.creates.clone();
        let (container, _) = bridged_container(
            Platform::MacOs,
            backend.clone(),
            native,
            TestFrame::main("https://rp.example"),
        );

        let result = container
            .create(CredentialCreationOptions { public_key: None })
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(native_creates.load(Ordering::SeqCst), 1);
        assert_eq!(backend.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn conditional_get_raises_not_supported() {
        let backend = Arc::new(FakeBackend::default());
        let (container, _) = bridged_container(
            Platform::MacOs,
            backend.clone(),
            FakeNative::default(),
            TestFrame::main("https://rp.example"),
        );

        let err = container
            .get(request_options(Mediation::Conditional))
            .await
            .unwrap_err();
        let BridgeError::Webauthn(exception) = err else {
            panic!("expected an exception");
        };
        assert_eq!(exception.code(), ErrorCode::NotSupported);
        assert_eq!(
            exception.message(),
            "The user agent does not support this operation."
        );
        assert_eq!(backend.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_refusals_surface_with_standard_wording() {
        let backend = Arc::new(FakeBackend {
            create_error: Some(ErrorCode::NotAllowed),
            ..FakeBackend::default()
        });
        let (container, _) = bridged_container(
            Platform::MacOs,
            backend,
            FakeNative::default(),
            TestFrame::main("https://rp.example"),
        );

        let err = container.create(creation_options()).await.unwrap_err();
        let BridgeError::Webauthn(exception) = err else {
            panic!("expected an exception");
        };
        assert_eq!(exception.code(), ErrorCode::NotAllowed);
        assert_eq!(
            exception.message(),
            "The operation either timed out or was not allowed. \
             See: https://www.w3.org/TR/webauthn-2/#sctn-privacy-considerations-client."
        );
    }

    #[tokio::test]
    async fn successful_create_maps_the_credential() {
        let raw_id: [u8; 16] = rand::random();
        let backend = Arc::new(FakeBackend {
            credential_id: encoding::base64url(&raw_id),
            ..FakeBackend::default()
        });
        let (container, _) = bridged_container(
            Platform::MacOs,
            backend.clone(),
            FakeNative::default(),
            TestFrame::nested("https://embed.example", Some("https://parent.example")),
        );

        let credential = container
            .create(creation_options())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credential.raw_id().as_slice(), &raw_id);
        assert_eq!(credential.id(), encoding::base64url(&raw_id));

        let seen = backend.seen_origin.lock().unwrap().clone().unwrap();
        assert_eq!(seen.current_origin, "https://embed.example");
        assert_eq!(seen.top_frame_origin.as_deref(), Some("https://parent.example"));
        assert!(!seen.is_main_frame);
    }

    #[tokio::test]
    async fn missing_window_handle_resolves_to_no_result() {
        let backend = Arc::new(FakeBackend::default());
        let mut frame = TestFrame::main("https://rp.example");
        frame.handle = None;
        let (container, _) = bridged_container(
            Platform::MacOs,
            backend.clone(),
            FakeNative::default(),
            frame,
        );

        let result = container.create(creation_options()).await.unwrap();
        assert!(result.is_none());
        assert_eq!(backend.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn availability_probe_is_cached() {
        let (container, loads) = bridged_container(
            Platform::MacOs,
            Arc::new(FakeBackend::default()),
            FakeNative::default(),
            TestFrame::main("https://rp.example"),
        );

        for _ in 0..3 {
            assert!(
                container
                    .is_user_verifying_platform_authenticator_available()
                    .await
            );
        }
        assert!(container.create(creation_options()).await.unwrap().is_some());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bridged_probes_override_the_native_answers() {
        let native = FakeNative {
            uvpa: false,
            conditional: true,
            ..FakeNative::default()
        };
        let (container, _) = bridged_container(
            Platform::MacOs,
            Arc::new(FakeBackend::default()),
            native,
            TestFrame::main("https://rp.example"),
        );

        assert!(
            container
                .is_user_verifying_platform_authenticator_available()
                .await
        );
        assert!(!container.is_conditional_mediation_available().await);
    }

    #[tokio::test]
    async fn unusable_backend_delegates_everything() {
        let native = FakeNative {
            uvpa: true,
            conditional: true,
            ..FakeNative::default()
        };
        let native_creates = native.creates.clone();
        let native_gets = native.gets.clone();
        let (container, loads) = bridged_container(
            Platform::Linux,
            Arc::new(FakeBackend::default()),
            native,
            TestFrame::main("https://rp.example"),
        );

        assert!(container.create(creation_options()).await.unwrap().is_none());
        assert!(container
            .get(request_options(Mediation::Optional))
            .await
            .unwrap()
            .is_none());
        assert_eq!(native_creates.load(Ordering::SeqCst), 1);
        assert_eq!(native_gets.load(Ordering::SeqCst), 1);

        assert!(
            container
                .is_user_verifying_platform_authenticator_available()
                .await
        );
        assert!(container.is_conditional_mediation_available().await);
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_wire_response_is_a_decode_error() {
        let backend = Arc::new(FakeBackend {
            credential_id: "AAAAA".into(),
            ..FakeBackend::default()
        });
        let (container, _) = bridged_container(
            Platform::MacOs,
            backend,
            FakeNative::default(),
            TestFrame::main("https://rp.example"),
        );

        let err = container.create(creation_options()).await.unwrap_err();
        assert!(matches!(err, BridgeError::Decode(_)));
    }
}
