//! In-memory credential objects mapped from the wire records.
//!
//! The mapping is one half of the credential codec: the backend already
//! encodes on its side of the boundary, so this module only decodes inbound
//! wire strings to binary and shapes the result. Cheap fields are
//! materialized eagerly; the expensive attestation fields stay encoded and
//! decode through accessors, matching the calling API's lazy-accessor
//! contract for authenticator data, public key bytes and the algorithm.
//!
//! A mapped credential must satisfy the same structural contract as one
//! produced by a non-bridged implementation: its type tag is always the
//! public-key kind, its attachment is always platform (this backend never
//! represents a roaming authenticator), and it re-serializes to the exact
//! wire JSON shape it came from via [`RegisteredCredential::to_json`] and
//! [`AssertedCredential::to_json`].

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::{
    utils::encoding::DecodeError,
    wire::{
        AssertedCredentialData, AssertionExtensionsData, CreatedCredentialData,
        CreationExtensionsData, CredentialPropertiesData, LargeBlobCreationData, PrfOutputsData,
    },
    Bytes,
};

/// The valid credential types.
///
/// <https://w3c.github.io/webauthn/#enumdef-publickeycredentialtype>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[typeshare(serialized_as = "String")]
pub enum PublicKeyCredentialType {
    /// The public counterpart of an asymmetric key pair. Currently the only
    /// defined type.
    PublicKey,
}

/// Authenticator attachment modalities.
///
/// <https://w3c.github.io/webauthn/#enumdef-authenticatorattachment>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[typeshare(serialized_as = "String")]
pub enum AuthenticatorAttachment {
    /// Attached through a client device-specific transport and not removable
    /// from the device. Every credential this bridge produces is
    /// platform-bound.
    Platform,

    /// Removable authenticators that can roam between devices. Never
    /// produced by this bridge.
    CrossPlatform,
}

/// A public-key credential produced by a successful creation request.
///
/// Built from a [`CreatedCredentialData`] wire record via `TryFrom`. The
/// source record is retained so the credential can re-serialize to the exact
/// wire shape it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredCredential {
    source: CreatedCredentialData,
    raw_id: Bytes,
    response: AttestationResponse,
    extensions: CreationExtensionOutputs,
}

impl RegisteredCredential {
    /// The credential id as the base64url encoding of [`Self::raw_id`].
    pub fn id(&self) -> &str {
        &self.source.credential_id
    }

    /// The raw binary credential id.
    pub fn raw_id(&self) -> &Bytes {
        &self.raw_id
    }

    /// Always the public-key kind.
    pub fn ty(&self) -> PublicKeyCredentialType {
        PublicKeyCredentialType::PublicKey
    }

    /// Always platform; this bridge only fronts a platform authenticator.
    pub fn authenticator_attachment(&self) -> AuthenticatorAttachment {
        AuthenticatorAttachment::Platform
    }

    /// The attestation response sub-object.
    pub fn response(&self) -> &AttestationResponse {
        &self.response
    }

    /// Client extension outputs with binary fields materialized. Extensions
    /// absent on the wire are absent here too.
    pub fn client_extension_results(&self) -> &CreationExtensionOutputs {
        &self.extensions
    }

    /// Re-serialize to the wire JSON shape of a creation result.
    pub fn to_json(&self) -> RegistrationResponseJson {
        RegistrationResponseJson {
            id: self.source.credential_id.clone(),
            raw_id: self.source.credential_id.clone(),
            ty: PublicKeyCredentialType::PublicKey,
            authenticator_attachment: AuthenticatorAttachment::Platform,
            response: AttestationResponseJson {
                client_data_json: self.source.client_data_json.clone(),
                authenticator_data: self.source.auth_data.clone(),
                transports: self.source.transports.clone(),
                public_key: self.source.public_key.clone(),
                public_key_algorithm: self.source.public_key_algorithm,
                attestation_object: self.source.attestation_object.clone(),
            },
            client_extension_results: self.source.extensions.clone(),
        }
    }
}

impl TryFrom<CreatedCredentialData> for RegisteredCredential {
    type Error = DecodeError;

    fn try_from(data: CreatedCredentialData) -> Result<Self, Self::Error> {
        let raw_id = Bytes::try_from(data.credential_id.as_str())?;
        let response = AttestationResponse {
            client_data_json: Bytes::try_from(data.client_data_json.as_str())?,
            attestation_object: Bytes::try_from(data.attestation_object.as_str())?,
            auth_data: data.auth_data.clone(),
            public_key: data.public_key.clone(),
            public_key_algorithm: data.public_key_algorithm,
            transports: data.transports.clone(),
        };
        let extensions = CreationExtensionOutputs::try_from(&data.extensions)?;
        Ok(Self {
            source: data,
            raw_id,
            response,
            extensions,
        })
    }
}

/// The response sub-object of a creation result.
///
/// Client data and the attestation object are materialized eagerly. The
/// remaining fields decode on access; a malformed field surfaces its
/// [`DecodeError`] from the accessor rather than failing the whole mapping
/// up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationResponse {
    client_data_json: Bytes,
    attestation_object: Bytes,
    auth_data: String,
    public_key: String,
    public_key_algorithm: i64,
    transports: Vec<String>,
}

impl AttestationResponse {
    /// JSON serialization of the collected client data.
    pub fn client_data_json(&self) -> &Bytes {
        &self.client_data_json
    }

    /// The attestation object, opaque to the bridge.
    pub fn attestation_object(&self) -> &Bytes {
        &self.attestation_object
    }

    /// Decode the authenticator data contained in the attestation object.
    pub fn authenticator_data(&self) -> Result<Bytes, DecodeError> {
        Bytes::try_from(self.auth_data.as_str())
    }

    /// Decode the DER SubjectPublicKeyInfo of the new credential.
    pub fn public_key(&self) -> Result<Bytes, DecodeError> {
        Bytes::try_from(self.public_key.as_str())
    }

    /// COSE algorithm identifier of the new credential.
    pub fn public_key_algorithm(&self) -> i64 {
        self.public_key_algorithm
    }

    /// Transports the authenticator is believed to support.
    pub fn transports(&self) -> &[String] {
        &self.transports
    }
}

/// A public-key credential produced by a successful assertion request.
///
/// Unlike the creation side, every binary field of an assertion response is
/// materialized at mapping time; the calling API defines no lazy accessors
/// here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertedCredential {
    source: AssertedCredentialData,
    raw_id: Bytes,
    response: AssertionResponse,
    extensions: AssertionExtensionOutputs,
}

impl AssertedCredential {
    /// The credential id as the base64url encoding of [`Self::raw_id`].
    pub fn id(&self) -> &str {
        &self.source.credential_id
    }

    /// The raw binary credential id.
    pub fn raw_id(&self) -> &Bytes {
        &self.raw_id
    }

    /// Always the public-key kind.
    pub fn ty(&self) -> PublicKeyCredentialType {
        PublicKeyCredentialType::PublicKey
    }

    /// Always platform; this bridge only fronts a platform authenticator.
    pub fn authenticator_attachment(&self) -> AuthenticatorAttachment {
        AuthenticatorAttachment::Platform
    }

    /// The assertion response sub-object.
    pub fn response(&self) -> &AssertionResponse {
        &self.response
    }

    /// Client extension outputs with binary fields materialized.
    pub fn client_extension_results(&self) -> &AssertionExtensionOutputs {
        &self.extensions
    }

    /// Re-serialize to the wire JSON shape of an assertion result.
    pub fn to_json(&self) -> AssertionResponseJson {
        AssertionResponseJson {
            id: self.source.credential_id.clone(),
            raw_id: self.source.credential_id.clone(),
            ty: PublicKeyCredentialType::PublicKey,
            authenticator_attachment: AuthenticatorAttachment::Platform,
            response: AssertionResponseFieldsJson {
                client_data_json: self.source.client_data_json.clone(),
                authenticator_data: self.source.authenticator_data.clone(),
                signature: self.source.signature.clone(),
                user_handle: self.source.user_handle.clone(),
            },
            client_extension_results: self.source.extensions.clone(),
        }
    }
}

impl TryFrom<AssertedCredentialData> for AssertedCredential {
    type Error = DecodeError;

    fn try_from(data: AssertedCredentialData) -> Result<Self, Self::Error> {
        let raw_id = Bytes::try_from(data.credential_id.as_str())?;
        let response = AssertionResponse {
            client_data_json: Bytes::try_from(data.client_data_json.as_str())?,
            authenticator_data: Bytes::try_from(data.authenticator_data.as_str())?,
            signature: Bytes::try_from(data.signature.as_str())?,
            user_handle: data
                .user_handle
                .as_deref()
                .map(Bytes::try_from)
                .transpose()?,
        };
        let extensions = AssertionExtensionOutputs::try_from(&data.extensions)?;
        Ok(Self {
            source: data,
            raw_id,
            response,
            extensions,
        })
    }
}

/// The response sub-object of an assertion result, fully materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResponse {
    /// JSON serialization of the collected client data.
    pub client_data_json: Bytes,

    /// The authenticator data covered by the signature.
    pub authenticator_data: Bytes,

    /// The assertion signature.
    pub signature: Bytes,

    /// The user handle stored with the credential, when present.
    pub user_handle: Option<Bytes>,
}

/// Creation extension outputs with binary fields materialized.
///
/// Sub-records that were absent on the wire stay absent; they are never
/// coerced into present-but-empty records.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CreationExtensionOutputs {
    /// Credential properties reported by the backend.
    pub cred_props: Option<CredentialPropertiesData>,

    /// Pseudo-random function outputs.
    pub prf: Option<PrfOutputs>,

    /// Large blob storage support.
    pub large_blob: Option<LargeBlobCreationData>,
}

impl TryFrom<&CreationExtensionsData> for CreationExtensionOutputs {
    type Error = DecodeError;

    fn try_from(data: &CreationExtensionsData) -> Result<Self, Self::Error> {
        Ok(Self {
            cred_props: data.cred_props.clone(),
            prf: data.prf.as_ref().map(PrfOutputs::try_from).transpose()?,
            large_blob: data.large_blob.clone(),
        })
    }
}

/// Assertion extension outputs with binary fields materialized.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssertionExtensionOutputs {
    /// Pseudo-random function outputs.
    pub prf: Option<PrfOutputs>,

    /// Large blob read or write outcome.
    pub large_blob: Option<LargeBlobOutputs>,
}

impl TryFrom<&AssertionExtensionsData> for AssertionExtensionOutputs {
    type Error = DecodeError;

    fn try_from(data: &AssertionExtensionsData) -> Result<Self, Self::Error> {
        Ok(Self {
            prf: data.prf.as_ref().map(PrfOutputs::try_from).transpose()?,
            large_blob: data
                .large_blob
                .as_ref()
                .map(|blob| {
                    Ok(LargeBlobOutputs {
                        blob: blob.blob.as_deref().map(Bytes::try_from).transpose()?,
                        written: blob.written,
                    })
                })
                .transpose()?,
        })
    }
}

/// Materialized pseudo-random function outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrfOutputs {
    /// Whether the PRF is available for use with the credential.
    pub enabled: Option<bool>,

    /// Evaluated PRF values.
    pub results: Option<PrfValues>,
}

impl TryFrom<&PrfOutputsData> for PrfOutputs {
    type Error = DecodeError;

    fn try_from(data: &PrfOutputsData) -> Result<Self, Self::Error> {
        Ok(Self {
            enabled: data.enabled,
            results: data
                .results
                .as_ref()
                .map(|values| {
                    Ok(PrfValues {
                        first: Bytes::try_from(values.first.as_str())?,
                        second: values.second.as_deref().map(Bytes::try_from).transpose()?,
                    })
                })
                .transpose()?,
        })
    }
}

/// Materialized PRF values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrfValues {
    /// The first PRF output.
    pub first: Bytes,

    /// The second PRF output, when two inputs were evaluated.
    pub second: Option<Bytes>,
}

/// Materialized large blob assertion outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LargeBlobOutputs {
    /// The blob read from the credential, for read requests.
    pub blob: Option<Bytes>,

    /// Whether a write request stored the blob.
    pub written: Option<bool>,
}

/// Wire JSON shape of a creation result, as exposed to the calling context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct RegistrationResponseJson {
    /// Base64url encoding of the credential id.
    pub id: String,

    /// Identical to [`Self::id`]; the binary form is the decoding of the
    /// same string.
    pub raw_id: String,

    /// Always `"public-key"`.
    #[serde(rename = "type")]
    pub ty: PublicKeyCredentialType,

    /// Always `"platform"`.
    pub authenticator_attachment: AuthenticatorAttachment,

    /// The attestation response fields.
    pub response: AttestationResponseJson,

    /// Client extension outputs, in wire form.
    pub client_extension_results: CreationExtensionsData,
}

/// Response fields of a creation result in wire JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AttestationResponseJson {
    /// JSON serialization of the collected client data, encoded.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,

    /// The authenticator data, encoded.
    pub authenticator_data: String,

    /// Transports the authenticator is believed to support.
    pub transports: Vec<String>,

    /// DER SubjectPublicKeyInfo of the new credential, encoded.
    pub public_key: String,

    /// COSE algorithm identifier of the new credential.
    #[typeshare(serialized_as = "I54")]
    pub public_key_algorithm: i64,

    /// The attestation object, encoded.
    pub attestation_object: String,
}

/// Wire JSON shape of an assertion result, as exposed to the calling
/// context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AssertionResponseJson {
    /// Base64url encoding of the credential id.
    pub id: String,

    /// Identical to [`Self::id`].
    pub raw_id: String,

    /// Always `"public-key"`.
    #[serde(rename = "type")]
    pub ty: PublicKeyCredentialType,

    /// Always `"platform"`.
    pub authenticator_attachment: AuthenticatorAttachment,

    /// The assertion response fields.
    pub response: AssertionResponseFieldsJson,

    /// Client extension outputs, in wire form. Present even when empty.
    pub client_extension_results: AssertionExtensionsData,
}

/// Response fields of an assertion result in wire JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AssertionResponseFieldsJson {
    /// JSON serialization of the collected client data, encoded.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,

    /// The authenticator data covered by the signature, encoded.
    pub authenticator_data: String,

    /// The assertion signature, encoded.
    pub signature: String,

    /// The user handle stored with the credential, encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}
