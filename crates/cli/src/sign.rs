//! Offline signing of a request body.

use std::fs;
use std::path::Path;

use beckn_discovery_common::request_signing::{
    sign_request_at, verify_signed_headers, SignatureWindow, SignedHeaders,
};

use crate::error::CliError;
use crate::keys::load_store;

/// Sign the bytes of `body` with the key in `key_file`.
///
/// `created` pins the signature window, which makes the output reproducible.
pub fn sign_body(
    key_file: &Path,
    body: &Path,
    created: Option<i64>,
    verify: bool,
) -> Result<SignedHeaders, CliError> {
    let store = load_store(key_file)?;
    let body = fs::read(body)?;
    let window = created.map_or_else(SignatureWindow::now, SignatureWindow::starting_at);

    let headers = sign_request_at(&store, &body, window)?;

    if verify {
        let identity = store
            .current_identity()
            .ok_or_else(|| CliError::Signing("No signing key loaded".into()))?;
        if !verify_signed_headers(&body, &headers, &identity.verifying_key())? {
            return Err(CliError::Signing(
                "Signature did not verify against the key's public key".into(),
            ));
        }
        log::info!("Signature verified with public key {}", identity.public_key_base64());
    }

    Ok(headers)
}

pub fn print_headers(headers: &SignedHeaders) {
    println!("Digest: {}", headers.digest);
    println!("Authorization: {}", headers.authorization);
}
