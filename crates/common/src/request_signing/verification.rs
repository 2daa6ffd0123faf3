//! Parsing and verification of signed request headers.
//!
//! Mirrors what the CDS does on receipt, so signed requests can be checked
//! locally against a registered public key before they are sent.

use ed25519_dalek::VerifyingKey;
use error_stack::{Report, ResultExt};

use crate::error::DiscoveryError;
use crate::request_signing::digest::digest_header_value;
use crate::request_signing::headers::SignedHeaders;
use crate::request_signing::signing::verify_signature;
use crate::request_signing::signing_string::build_signing_string;

/// Parameters of a `Signature ...` authorization header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationParams {
    pub key_id: String,
    pub algorithm: String,
    pub created: i64,
    pub expires: i64,
    pub headers: String,
    pub signature: String,
}

/// Parses the space separated `key="value"` list of an authorization header.
///
/// # Errors
///
/// Returns [`DiscoveryError::BadRequest`] if the scheme is not `Signature`,
/// a pair is malformed, or a required parameter is missing.
pub fn parse_authorization(header: &str) -> Result<AuthorizationParams, Report<DiscoveryError>> {
    let mut rest = header
        .trim()
        .strip_prefix("Signature ")
        .ok_or_else(|| bad_request("Authorization scheme must be Signature"))?;

    let mut key_id = None;
    let mut algorithm = None;
    let mut created = None;
    let mut expires = None;
    let mut headers = None;
    let mut signature = None;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let (name, after_name) = rest
            .split_once("=\"")
            .ok_or_else(|| bad_request("Expected key=\"value\" pair"))?;
        let (value, after_value) = after_name
            .split_once('"')
            .ok_or_else(|| bad_request("Unterminated quoted value"))?;
        rest = after_value;

        let value = value.to_string();
        match name {
            "keyId" => key_id = Some(value),
            "algorithm" => algorithm = Some(value),
            "created" => created = Some(parse_timestamp("created", &value)?),
            "expires" => expires = Some(parse_timestamp("expires", &value)?),
            "headers" => headers = Some(value),
            "signature" => signature = Some(value),
            other => log::debug!("Ignoring unknown authorization parameter: {}", other),
        }
    }

    Ok(AuthorizationParams {
        key_id: key_id.ok_or_else(|| missing("keyId"))?,
        algorithm: algorithm.ok_or_else(|| missing("algorithm"))?,
        created: created.ok_or_else(|| missing("created"))?,
        expires: expires.ok_or_else(|| missing("expires"))?,
        headers: headers.ok_or_else(|| missing("headers"))?,
        signature: signature.ok_or_else(|| missing("signature"))?,
    })
}

/// Checks signed headers against `body` and a public key.
///
/// Returns `Ok(false)` when the digest does not match the body or the
/// signature does not verify.
///
/// # Errors
///
/// Returns an error if the authorization header cannot be parsed or the
/// signature is not well formed.
pub fn verify_signed_headers(
    body: &[u8],
    headers: &SignedHeaders,
    verifying_key: &VerifyingKey,
) -> Result<bool, Report<DiscoveryError>> {
    if headers.digest != digest_header_value(body) {
        log::warn!("Digest header does not match request body");
        return Ok(false);
    }

    let params = parse_authorization(&headers.authorization)?;
    let signing_string = build_signing_string(params.created, params.expires, &headers.digest);

    verify_signature(verifying_key, signing_string.as_bytes(), &params.signature)
        .attach(format!("while verifying signature for {}", params.key_id))
}

fn parse_timestamp(name: &str, value: &str) -> Result<i64, Report<DiscoveryError>> {
    value
        .parse::<i64>()
        .change_context(DiscoveryError::BadRequest {
            message: format!("Parameter {name} is not a unix timestamp"),
        })
}

fn bad_request(message: &str) -> Report<DiscoveryError> {
    Report::new(DiscoveryError::BadRequest {
        message: message.to_string(),
    })
}

fn missing(name: &str) -> Report<DiscoveryError> {
    bad_request(&format!("Authorization header is missing {name}"))
}
