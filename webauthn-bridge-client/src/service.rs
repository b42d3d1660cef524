//! Lifecycle of the privileged authenticator backend.
//!
//! Loading the backend is expensive and must happen at most once per handle.
//! The handle is a three-state machine (unloaded, loading, loaded) guarded by
//! a mutex; concurrent requesters arriving mid-load all await the same
//! in-flight outcome over a watch channel. A failed load resets the state so
//! the next request retries; failures are logged and never cached, and never
//! surface to the caller as anything other than "no backend".

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::bridge::AuthenticatorBackend;

/// The operating systems a rendering process can run on.
///
/// The backend integrates with exactly one platform authenticator; every
/// other platform reports unavailable without any load attempt. Carried as a
/// value rather than a compile-time gate so the gating itself is observable
/// in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// macOS, the only platform with a supported backend.
    MacOs,
    /// Windows.
    Windows,
    /// Linux.
    Linux,
    /// Anything else.
    Other,
}

impl Platform {
    /// The platform this process was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    fn supports_backend(self) -> bool {
        matches!(self, Self::MacOs)
    }
}

/// Why a backend load attempt failed.
///
/// Only ever logged; callers observe a failed load as an absent backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    reason: String,
}

impl LoadError {
    /// Describe a failed load attempt.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "authenticator backend failed to load: {}", self.reason)
    }
}

impl std::error::Error for LoadError {}

/// Capability for performing the expensive backend initialization.
///
/// Called at most once per in-flight load; the handle owns all caching and
/// retry policy.
#[async_trait]
pub trait BackendLoader: Send + Sync {
    /// Initialize the platform authenticator backend.
    async fn load(&self) -> Result<Arc<dyn AuthenticatorBackend>, LoadError>;
}

/// Shared outcome of an in-flight load. The outer `Option` is the watch
/// channel's "not resolved yet" marker.
type LoadOutcome = Option<Option<Arc<dyn AuthenticatorBackend>>>;

enum LoadState {
    Unloaded,
    Loading(watch::Receiver<LoadOutcome>),
    Loaded(Arc<dyn AuthenticatorBackend>),
}

enum Acquire {
    Done(Option<Arc<dyn AuthenticatorBackend>>),
    Wait(watch::Receiver<LoadOutcome>),
    Load(watch::Sender<LoadOutcome>),
}

/// Process-lifetime handle to the lazily loaded authenticator backend.
///
/// Construct one per application context and share it; every credential
/// request goes through [`AuthenticatorServiceHandle::acquire`].
pub struct AuthenticatorServiceHandle<L> {
    loader: L,
    platform: Platform,
    state: Mutex<LoadState>,
}

impl<L> fmt::Debug for AuthenticatorServiceHandle<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatorServiceHandle")
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl<L: BackendLoader> AuthenticatorServiceHandle<L> {
    /// Create a handle gated on the compiled-for platform.
    pub fn new(loader: L) -> Self {
        Self::with_platform(loader, Platform::current())
    }

    /// Create a handle gated on an explicit platform.
    pub fn with_platform(loader: L, platform: Platform) -> Self {
        Self {
            loader,
            platform,
            state: Mutex::new(LoadState::Unloaded),
        }
    }

    /// The backend, loading it first if this is the first request.
    ///
    /// Returns `None` without any load attempt on unsupported platforms, and
    /// after a failed load. Concurrent calls during a load all share the one
    /// outstanding attempt's outcome.
    pub async fn acquire(&self) -> Option<Arc<dyn AuthenticatorBackend>> {
        if !self.platform.supports_backend() {
            return None;
        }
        loop {
            let action = {
                // Poisoned only if a transition panicked; propagate.
                let mut state = self.state.lock().unwrap();
                match &*state {
                    LoadState::Loaded(backend) => Acquire::Done(Some(backend.clone())),
                    LoadState::Loading(rx) => Acquire::Wait(rx.clone()),
                    LoadState::Unloaded => {
                        let (tx, rx) = watch::channel(None);
                        *state = LoadState::Loading(rx);
                        Acquire::Load(tx)
                    }
                }
            };
            match action {
                Acquire::Done(outcome) => return outcome,
                Acquire::Load(tx) => return self.run_load(tx).await,
                Acquire::Wait(mut rx) => {
                    match rx.wait_for(|outcome| outcome.is_some()).await {
                        Ok(outcome) => return outcome.clone().flatten(),
                        // The loading call was dropped mid-flight. Reset the
                        // state if it still points at the dead channel, then
                        // start over.
                        Err(_) => self.reset_dead_load(),
                    }
                }
            }
        }
    }

    async fn run_load(&self, tx: watch::Sender<LoadOutcome>) -> Option<Arc<dyn AuthenticatorBackend>> {
        let outcome = match self.loader.load().await {
            Ok(backend) => Some(backend),
            Err(err) => {
                log::error!("{err}");
                None
            }
        };
        {
            let mut state = self.state.lock().unwrap();
            *state = match &outcome {
                Some(backend) => LoadState::Loaded(backend.clone()),
                None => LoadState::Unloaded,
            };
        }
        let _ = tx.send(Some(outcome.clone()));
        outcome
    }

    fn reset_dead_load(&self) {
        let mut state = self.state.lock().unwrap();
        if let LoadState::Loading(rx) = &*state {
            if rx.has_changed().is_err() {
                *state = LoadState::Unloaded;
            }
        }
    }
}
