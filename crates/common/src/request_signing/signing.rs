//! Request signing and verification utilities.
//!
//! This module provides Ed25519 signing of outbound CDS requests using the
//! current identity of a [`KeyStore`], and the matching verification used to
//! check signatures against a registered public key.

use base64::{engine::general_purpose, Engine};
use ed25519_dalek::{Signature, Signer as Ed25519Signer, Verifier, VerifyingKey};
use error_stack::Report;

use crate::error::DiscoveryError;
use crate::request_signing::digest::digest_header_value;
use crate::request_signing::headers::{compose_headers, SignedHeaders};
use crate::request_signing::key_store::{KeyStore, SigningIdentity};
use crate::request_signing::signing_string::{build_signing_string, SignatureWindow};

/// Signs with a snapshot of the identity that was current when it was built.
///
/// Taking the snapshot up front means a key switch on the store cannot
/// change the key halfway through signing a request.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    identity: SigningIdentity,
}

impl RequestSigner {
    #[must_use]
    pub fn new(identity: SigningIdentity) -> Self {
        Self { identity }
    }

    /// Builds a signer from the current identity of `store`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::NoKeyLoaded`] if no identity is current.
    pub fn from_store(store: &KeyStore) -> Result<Self, Report<DiscoveryError>> {
        store
            .current_identity()
            .cloned()
            .map(Self::new)
            .ok_or_else(|| Report::new(DiscoveryError::NoKeyLoaded))
    }

    #[must_use]
    pub fn identity(&self) -> &SigningIdentity {
        &self.identity
    }

    /// Detached Ed25519 signature over `payload`, standard base64 encoded.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::SigningFailure`] if the signing primitive fails.
    pub fn sign(&self, payload: &[u8]) -> Result<String, Report<DiscoveryError>> {
        let signature = self
            .identity
            .signing_key()
            .try_sign(payload)
            .map_err(|e| {
                Report::new(DiscoveryError::SigningFailure {
                    message: format!("Ed25519 signing failed: {}", e),
                })
            })?;

        Ok(general_purpose::STANDARD.encode(signature.to_bytes()))
    }

    /// Produces the `Digest` and `Authorization` headers for `body`.
    ///
    /// `body` must be the exact bytes that will be sent.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::SigningFailure`] if the signing primitive fails.
    pub fn sign_body(
        &self,
        body: &[u8],
        window: SignatureWindow,
    ) -> Result<SignedHeaders, Report<DiscoveryError>> {
        let digest = digest_header_value(body);
        let signing_string = build_signing_string(window.created, window.expires, &digest);
        let signature = self.sign(signing_string.as_bytes())?;

        log::debug!(
            "Signed request for {} (created={}, expires={}, digest={}..., signature={}...)",
            self.identity.composite_key_id(),
            window.created,
            window.expires,
            preview(&digest),
            preview(&signature)
        );

        Ok(compose_headers(&self.identity, window, &digest, &signature))
    }
}

/// Signs `body` with the current identity of `store`, valid from now.
///
/// # Errors
///
/// Returns [`DiscoveryError::NoKeyLoaded`] if no identity is current, or
/// [`DiscoveryError::SigningFailure`] if signing fails.
pub fn sign_request(
    store: &KeyStore,
    body: &[u8],
) -> Result<SignedHeaders, Report<DiscoveryError>> {
    sign_request_at(store, body, SignatureWindow::now())
}

/// Signs `body` with the current identity of `store` for a fixed window.
///
/// # Errors
///
/// Same as [`sign_request`].
pub fn sign_request_at(
    store: &KeyStore,
    body: &[u8],
    window: SignatureWindow,
) -> Result<SignedHeaders, Report<DiscoveryError>> {
    RequestSigner::from_store(store)?.sign_body(body, window)
}

/// Decodes a standard base64 Ed25519 public key.
///
/// # Errors
///
/// Returns an error if the key is not base64 or not a valid 32-byte point.
pub fn decode_verifying_key(public_key_b64: &str) -> Result<VerifyingKey, Report<DiscoveryError>> {
    let public_key_bytes = general_purpose::STANDARD
        .decode(public_key_b64.trim())
        .map_err(|e| {
            Report::new(DiscoveryError::InvalidKeyEncoding {
                message: format!("Failed to decode public key: {}", e),
            })
        })?;

    let actual = public_key_bytes.len();
    let verifying_key_bytes: [u8; 32] = public_key_bytes
        .try_into()
        .map_err(|_| Report::new(DiscoveryError::InvalidKeyLength { actual }))?;

    VerifyingKey::from_bytes(&verifying_key_bytes).map_err(|e| {
        Report::new(DiscoveryError::InvalidKeyEncoding {
            message: format!("Failed to create verifying key: {}", e),
        })
    })
}

/// Checks a base64 signature over `payload`.
///
/// # Errors
///
/// Returns an error if the signature is not base64 or not 64 bytes long.
pub fn verify_signature(
    verifying_key: &VerifyingKey,
    payload: &[u8],
    signature_b64: &str,
) -> Result<bool, Report<DiscoveryError>> {
    let signature_bytes = general_purpose::STANDARD
        .decode(signature_b64)
        .map_err(|e| {
            Report::new(DiscoveryError::SigningFailure {
                message: format!("Failed to decode signature: {}", e),
            })
        })?;

    let signature_array: [u8; 64] = signature_bytes.try_into().map_err(|_| {
        Report::new(DiscoveryError::SigningFailure {
            message: "Signature must be 64 bytes".into(),
        })
    })?;

    let signature = Signature::from_bytes(&signature_array);

    Ok(verifying_key.verify(payload, &signature).is_ok())
}

fn preview(value: &str) -> &str {
    value.get(..16).unwrap_or(value)
}
