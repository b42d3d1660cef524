//! Origin resolution for requests arriving from a rendering context.
//!
//! The backend cannot inspect frame ancestry itself; it depends entirely on
//! the [`OriginContext`] resolved here from the calling frame. Resolution is
//! fallible without being an error: a frame that cannot produce an origin
//! yields no context and the request resolves to no result, matching the
//! calling API's behavior when an operation cannot even be attempted.

use std::borrow::Cow;

use public_suffix::{EffectiveTLDProvider, DEFAULT_PROVIDER};
use webauthn_bridge_types::wire::{NativeWindowHandle, OriginContext};

/// Identity of a frame within a page hierarchy.
///
/// Two frames are the same frame exactly when their ids are equal. The value
/// is meaningful only within a single hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Capability view of the calling frame.
///
/// Implemented over whatever the embedding environment uses to represent a
/// rendering frame. Every accessor is fallible since a frame can be torn
/// down at any point between the call and the resolution.
pub trait Frame: Sized {
    /// The frame's identity within its page hierarchy.
    fn id(&self) -> FrameId;

    /// The frame's serialized origin, if it can be determined.
    fn origin(&self) -> Option<String>;

    /// The top-level frame of the same page hierarchy, if reachable.
    fn top(&self) -> Option<Self>;

    /// Opaque handle of the native window hosting this frame, used to anchor
    /// authenticator UI.
    fn window_handle(&self) -> Option<NativeWindowHandle>;
}

/// Resolve the [`OriginContext`] for a request originating in `frame`.
///
/// Returns `None` when the top-level frame is unreachable or the frame's own
/// origin cannot be determined; the whole request then resolves to no
/// result. A nested frame whose ancestor origin is unreadable still
/// proceeds with `top_frame_origin` absent, leaving the policy decision to
/// the backend.
pub fn resolve<F: Frame>(frame: &F) -> Option<OriginContext> {
    let top = frame.top()?;
    let current_origin = frame.origin().filter(|origin| !origin.is_empty())?;
    let is_main_frame = frame.id() == top.id();
    let top_frame_origin = if is_main_frame {
        None
    } else {
        top.origin().filter(|origin| !origin.is_empty())
    };
    Some(OriginContext {
        current_origin,
        top_frame_origin,
        is_main_frame,
    })
}

/// Whether `domain` has no registrable portion beneath the public suffix
/// boundary.
///
/// True for suffix entries themselves (`com`, `co.uk`) and for any input
/// that fails punycode decoding or suffix lookup; callers use this to
/// refuse relying party identifiers that span an entire registry. Never
/// panics.
pub fn is_public_suffix(domain: &str) -> bool {
    let Some(decoded) = decode_host(domain) else {
        return true;
    };
    DEFAULT_PROVIDER.effective_tld_plus_one(&decoded).is_err()
}

/// The suffix list is keyed on unicode labels, so punycode hosts are
/// decoded before lookup.
fn decode_host(host: &str) -> Option<Cow<'_, str>> {
    if host.split('.').any(|label| label.starts_with("xn--")) {
        let (decoded, result) = idna::domain_to_unicode(host);
        result.ok().map(|_| Cow::from(decoded))
    } else {
        Some(Cow::from(host))
    }
}
