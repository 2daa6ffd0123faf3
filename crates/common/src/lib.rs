//! Common functionality for Beckn catalog discovery clients.
//!
//! This crate provides request signing, protocol envelopes, role based
//! response filtering and the CDS client used by the `bdcli` binary.
//!
//! # Modules
//!
//! - [`client`]: Signed discover and publish calls over a pluggable transport
//! - [`constants`]: Protocol literals, header names and context URIs
//! - [`context`]: Protocol envelope construction
//! - [`discovery`]: Discover query and publish payloads
//! - [`error`]: Error types and error handling utilities
//! - [`filter`]: Role based filtering of CDS responses
//! - [`request_signing`]: Key store, digests and Ed25519 request signatures
//! - [`role`]: Caller roles and their semantic contexts
//! - [`settings`]: Configuration management and validation
//! - [`test_support`]: Testing utilities and fixtures

pub mod client;
pub mod constants;
pub mod context;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod request_signing;
pub mod role;
pub mod settings;
