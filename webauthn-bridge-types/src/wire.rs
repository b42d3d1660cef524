//! Records that cross the privilege boundary.
//!
//! Everything here is JSON-shaped and wire-safe: binary fields travel as
//! base64url strings without padding, and optional sub-records that are
//! absent stay absent, since absence carries its own meaning. The privileged
//! backend produces the `*CredentialData` records; [`crate::credential`]
//! maps them into the in-memory objects the calling context expects.

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::Bytes;

/// Origin context resolved on the calling side of the boundary.
///
/// The backend cannot determine frame ancestry on its own; it depends
/// entirely on this record, which always travels alongside the request it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct OriginContext {
    /// Origin of the frame that issued the request. Never empty; a request
    /// whose origin cannot be determined is aborted before this record is
    /// built.
    pub current_origin: String,

    /// Origin of the top-level frame of the same page hierarchy. Present
    /// only when the calling frame is embedded; an embedded frame whose
    /// ancestor origin is unreadable proceeds with this absent, leaving
    /// policy to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_frame_origin: Option<String>,

    /// Whether the calling frame is itself the top-level frame.
    pub is_main_frame: bool,
}

/// Opaque handle of the native window hosting the calling frame.
///
/// Passed through unmodified so the backend can anchor any authenticator UI;
/// the bridge never manages window lifecycle.
#[typeshare(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeWindowHandle(pub Bytes);

/// Mediation requirements of a credential request.
///
/// <https://w3c.github.io/webappsec-credential-management/#mediation-requirements>
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum Mediation {
    /// The operation must complete without user mediation.
    Silent,

    /// User mediation where needed. This is the default.
    #[default]
    Optional,

    /// Credentials are offered through non-modal UI, typically autofill.
    /// The bridged backend has no model of conditional UI and always rejects
    /// this mode.
    Conditional,

    /// The user must always be involved.
    Required,
}

/// The options given to a `create()` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialCreationOptions {
    /// The member marking this as a request for a public-key credential.
    /// Requests without it are never intercepted by the bridge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKeyCreationOptions>,
}

/// The options given to a `get()` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequestOptions {
    /// The member marking this as a request for a public-key assertion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKeyAssertionOptions>,

    /// Requested mediation mode.
    #[serde(default)]
    pub mediation: Mediation,
}

/// Public-key creation options, carried verbatim across the boundary.
///
/// The bridge never interprets these beyond noticing their presence; parsing
/// and validation is the backend's job, and malformed contents come back as
/// [`crate::error::ErrorCode::Type`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKeyCreationOptions(pub serde_json::Value);

/// Public-key assertion options, carried verbatim across the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKeyAssertionOptions(pub serde_json::Value);

/// Payload returned by the backend for a successful credential creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct CreatedCredentialData {
    /// The new credential's id, base64url encoded. This doubles as the wire
    /// `rawId`.
    pub credential_id: String,

    /// JSON serialization of the collected client data, encoded.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,

    /// The authenticator data contained within the attestation object,
    /// encoded.
    pub auth_data: String,

    /// The attestation object, opaque to the bridge, encoded.
    pub attestation_object: String,

    /// DER SubjectPublicKeyInfo of the new credential, encoded.
    pub public_key: String,

    /// COSE algorithm identifier of the new credential.
    #[typeshare(serialized_as = "I54")]
    pub public_key_algorithm: i64,

    /// Transports the authenticator is believed to support. Unknown values
    /// are carried through untouched.
    pub transports: Vec<String>,

    /// Client extension outputs produced by the backend.
    #[serde(default, skip_serializing_if = "CreationExtensionsData::is_empty")]
    pub extensions: CreationExtensionsData,
}

/// Payload returned by the backend for a successful assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AssertedCredentialData {
    /// The asserted credential's id, base64url encoded.
    pub credential_id: String,

    /// JSON serialization of the collected client data, encoded.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,

    /// The authenticator data covered by the signature, encoded.
    pub authenticator_data: String,

    /// The assertion signature, encoded.
    pub signature: String,

    /// The user handle associated with the credential, encoded. Absent when
    /// the authenticator did not store one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,

    /// Client extension outputs produced by the backend.
    #[serde(default, skip_serializing_if = "AssertionExtensionsData::is_empty")]
    pub extensions: AssertionExtensionsData,
}

/// Client extension outputs of a creation result, in wire form.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct CreationExtensionsData {
    /// Credential properties reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_props: Option<CredentialPropertiesData>,

    /// Pseudo-random function extension outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prf: Option<PrfOutputsData>,

    /// Large blob storage extension outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_blob: Option<LargeBlobCreationData>,
}

impl CreationExtensionsData {
    /// True when no extension produced an output.
    pub fn is_empty(&self) -> bool {
        self.cred_props.is_none() && self.prf.is_none() && self.large_blob.is_none()
    }
}

/// Client extension outputs of an assertion result, in wire form.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AssertionExtensionsData {
    /// Pseudo-random function extension outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prf: Option<PrfOutputsData>,

    /// Large blob storage extension outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_blob: Option<LargeBlobAssertionData>,
}

impl AssertionExtensionsData {
    /// True when no extension produced an output.
    pub fn is_empty(&self) -> bool {
        self.prf.is_none() && self.large_blob.is_none()
    }
}

/// Output of the credential properties extension.
///
/// <https://w3c.github.io/webauthn/#sctn-authenticator-credential-properties-extension>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct CredentialPropertiesData {
    /// Whether the created credential is client-side discoverable. Absence
    /// means the property is unknown.
    #[serde(rename = "rk", default, skip_serializing_if = "Option::is_none")]
    pub discoverable: Option<bool>,
}

/// Outputs of the pseudo-random function extension, in wire form.
///
/// <https://w3c.github.io/webauthn/#prf-extension>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PrfOutputsData {
    /// Whether the PRF is available for use with the credential. Only
    /// reported during creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Results of evaluating the PRF, when inputs were supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<PrfValuesData>,
}

/// Evaluated PRF values, in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PrfValuesData {
    /// The first PRF output, encoded.
    pub first: String,

    /// The second PRF output, encoded, when two inputs were evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,
}

/// Creation-side output of the large blob storage extension.
///
/// <https://w3c.github.io/webauthn/#sctn-large-blob-extension>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct LargeBlobCreationData {
    /// Whether the created credential supports large blob storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported: Option<bool>,
}

/// Assertion-side output of the large blob storage extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct LargeBlobAssertionData {
    /// The blob read from the credential, encoded, for read requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,

    /// Whether a write request stored the blob, for write requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub written: Option<bool>,
}
