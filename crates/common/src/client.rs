//! Signed calls to the Catalog Discovery Service.
//!
//! [`CdsClient`] builds the envelope, serializes the body once, signs those
//! exact bytes and hands the request to an [`HttpTransport`]. Network and
//! protocol failures come back as [`CallOutcome::Failure`] carrying the
//! request body for replay; only local failures (bad query, missing key,
//! signing) are returned as `Err`.

use error_stack::{Report, ResultExt};
use http::header::{HeaderName, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;

use crate::constants::HEADER_X_API_KEY;
use crate::context::{Action, ContextBuilder};
use crate::discovery::{DiscoverQuery, DiscoverRequest, PublishMessage, PublishRequest};
use crate::error::DiscoveryError;
use crate::filter::filter_response;
use crate::request_signing::{KeyStore, RequestSigner, SignatureWindow, SignedHeaders};
use crate::role::Role;
use crate::settings::{Cds, Settings};

/// What to do when a request must go out and no identity is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningPolicy {
    /// Fail the call with [`DiscoveryError::NoKeyLoaded`].
    Required,
    /// Send without `Digest` and `Authorization`, logging a warning.
    AllowUnsigned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: Vec<(HeaderName, String)>,
    pub body: String,
}

impl OutboundRequest {
    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a prepared POST request.
///
/// Implementations report any HTTP status as a [`TransportResponse`] and
/// reserve `Err` for failures where no response was received.
pub trait HttpTransport {
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Transport`] if the request could not be
    /// delivered.
    fn send(&self, request: &OutboundRequest)
        -> Result<TransportResponse, Report<DiscoveryError>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Success {
        data: Value,
        request_body: String,
        signed: bool,
    },
    Failure {
        error: String,
        request_body: String,
    },
}

impl CallOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    #[must_use]
    pub fn request_body(&self) -> &str {
        match self {
            Self::Success { request_body, .. } | Self::Failure { request_body, .. } => {
                request_body
            }
        }
    }

    fn map_data(self, f: impl FnOnce(Value) -> Value) -> Self {
        match self {
            Self::Success {
                data,
                request_body,
                signed,
            } => Self::Success {
                data: f(data),
                request_body,
                signed,
            },
            failure @ Self::Failure { .. } => failure,
        }
    }
}

pub struct CdsClient<T> {
    cds: Cds,
    contexts: ContextBuilder,
    policy: SigningPolicy,
    transport: T,
}

impl<T: HttpTransport> CdsClient<T> {
    #[must_use]
    pub fn new(settings: &Settings, transport: T) -> Self {
        Self {
            cds: settings.cds.clone(),
            contexts: ContextBuilder::new(settings.participant.clone()),
            policy: settings.signing.policy(),
            transport,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SigningPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> SigningPolicy {
        self.policy
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs a discover call and filters the result for `role`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query has no criteria, or if the request
    /// cannot be signed under the configured [`SigningPolicy`].
    pub fn discover(
        &self,
        keys: &KeyStore,
        query: &DiscoverQuery,
        role: Option<Role>,
    ) -> Result<CallOutcome, Report<DiscoveryError>> {
        let request = DiscoverRequest {
            context: self.contexts.build(Action::Discover, role),
            message: query.to_message(role)?,
        };

        let outcome = self.execute(keys, &self.cds.discover_path, &request)?;
        Ok(outcome.map_data(|data| filter_response(&data, role)))
    }

    /// Publishes catalogs on behalf of the configured responder.
    ///
    /// # Errors
    ///
    /// Returns an error if `catalogs` is empty, or if the request cannot be
    /// signed under the configured [`SigningPolicy`].
    pub fn publish(
        &self,
        keys: &KeyStore,
        catalogs: Vec<Value>,
    ) -> Result<CallOutcome, Report<DiscoveryError>> {
        if catalogs.is_empty() {
            return Err(Report::new(DiscoveryError::BadRequest {
                message: "At least one catalog is required to publish".into(),
            }));
        }

        let request = PublishRequest {
            context: self.contexts.build(Action::CatalogPublish, None),
            message: PublishMessage { catalogs },
        };

        self.execute(keys, &self.cds.publish_path, &request)
    }

    fn execute<B: Serialize>(
        &self,
        keys: &KeyStore,
        path: &str,
        payload: &B,
    ) -> Result<CallOutcome, Report<DiscoveryError>> {
        let body = serde_json::to_string(payload).change_context(DiscoveryError::BadRequest {
            message: "Failed to serialize request body".into(),
        })?;
        let signed_headers = self.sign(keys, body.as_bytes())?;
        let signed = signed_headers.is_some();

        let mut headers = vec![(CONTENT_TYPE, "application/json".to_string())];
        if let Some(api_key) = self.cds.api_key() {
            headers.push((HEADER_X_API_KEY, api_key.to_string()));
        }
        if let Some(signed_headers) = &signed_headers {
            headers.extend(
                signed_headers
                    .header_pairs()
                    .into_iter()
                    .map(|(name, value)| (name, value.to_string())),
            );
        }

        let request = OutboundRequest {
            url: self.cds.endpoint(path),
            headers,
            body,
        };
        log::info!(
            "Sending {} request to {}",
            if signed { "signed" } else { "unsigned" },
            request.url
        );

        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(report) => {
                log::error!("CDS request to {} failed: {:?}", request.url, report);
                return Ok(failure(report.current_context().to_string(), request));
            }
        };

        if !response.is_success() {
            log::error!(
                "CDS responded with status {} for {}",
                response.status,
                request.url
            );
            return Ok(failure(
                format!("CDS responded with status {}: {}", response.status, response.body),
                request,
            ));
        }

        match serde_json::from_str::<Value>(&response.body) {
            Ok(data) => Ok(CallOutcome::Success {
                data,
                request_body: request.body,
                signed,
            }),
            Err(e) => {
                log::error!("CDS response from {} is not JSON: {}", request.url, e);
                Ok(failure(
                    DiscoveryError::InvalidResponse {
                        message: e.to_string(),
                    }
                    .to_string(),
                    request,
                ))
            }
        }
    }

    fn sign(
        &self,
        keys: &KeyStore,
        body: &[u8],
    ) -> Result<Option<SignedHeaders>, Report<DiscoveryError>> {
        if keys.current_identity().is_none() && self.policy == SigningPolicy::AllowUnsigned {
            log::warn!("No signing key loaded, sending request unsigned");
            return Ok(None);
        }

        RequestSigner::from_store(keys)?
            .sign_body(body, SignatureWindow::now())
            .map(Some)
    }
}

fn failure(error: String, request: OutboundRequest) -> CallOutcome {
    CallOutcome::Failure {
        error,
        request_body: request.body,
    }
}
