//! `Digest` and `Authorization` header composition.
//!
//! The `Authorization` value uses space separated `key="value"` pairs in a
//! fixed order. Classic HTTP signatures separate pairs with commas; the CDS
//! verifier expects spaces, so the layout here must not change.

use http::header::{HeaderName, AUTHORIZATION};

use crate::constants::{HEADER_DIGEST, SIGNATURE_ALGORITHM, SIGNED_HEADERS};
use crate::request_signing::key_store::SigningIdentity;
use crate::request_signing::signing_string::SignatureWindow;

/// Headers attached to a signed request. Recomputed for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub digest: String,
    pub authorization: String,
}

impl SignedHeaders {
    #[must_use]
    pub fn header_pairs(&self) -> [(HeaderName, &str); 2] {
        [
            (HEADER_DIGEST, self.digest.as_str()),
            (AUTHORIZATION, self.authorization.as_str()),
        ]
    }
}

/// `<subscriberId>|<keyId>|xed25519`
#[must_use]
pub fn composite_key_id(subscriber_id: &str, key_id: &str) -> String {
    format!("{subscriber_id}|{key_id}|{SIGNATURE_ALGORITHM}")
}

/// Splits a composite key id into `(subscriber_id, key_id, algorithm)`.
///
/// Returns `None` unless the value has exactly three pipe separated fields.
#[must_use]
pub fn split_composite_key_id(value: &str) -> Option<(&str, &str, &str)> {
    let mut parts = value.split('|');
    let subscriber_id = parts.next()?;
    let key_id = parts.next()?;
    let algorithm = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((subscriber_id, key_id, algorithm))
}

#[must_use]
pub fn build_authorization_header(
    composite_key_id: &str,
    window: SignatureWindow,
    signature_b64: &str,
) -> String {
    format!(
        "Signature keyId=\"{}\" algorithm=\"{}\" created=\"{}\" expires=\"{}\" headers=\"{}\" signature=\"{}\"",
        composite_key_id,
        SIGNATURE_ALGORITHM,
        window.created,
        window.expires,
        SIGNED_HEADERS,
        signature_b64
    )
}

/// Assembles the signed headers from an already computed digest and signature.
#[must_use]
pub fn compose_headers(
    identity: &SigningIdentity,
    window: SignatureWindow,
    digest_header_value: &str,
    signature_b64: &str,
) -> SignedHeaders {
    SignedHeaders {
        digest: digest_header_value.to_string(),
        authorization: build_authorization_header(
            &identity.composite_key_id(),
            window,
            signature_b64,
        ),
    }
}
