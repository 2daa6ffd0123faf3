//! Blocking HTTP transport for CDS calls.

use std::time::Duration;

use beckn_discovery_common::client::{HttpTransport, OutboundRequest, TransportResponse};
use beckn_discovery_common::error::DiscoveryError;
use error_stack::Report;
use ureq::Agent;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `ureq` agent that reports every HTTP status as a response.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for UreqTransport {
    fn send(
        &self,
        request: &OutboundRequest,
    ) -> Result<TransportResponse, Report<DiscoveryError>> {
        let mut builder = self.agent.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = match builder.send(request.body.as_bytes()) {
            Ok(resp) => resp,
            Err(ureq::Error::StatusCode(code)) => {
                return Ok(TransportResponse {
                    status: code,
                    body: String::new(),
                });
            }
            Err(e) => {
                return Err(Report::new(DiscoveryError::Transport {
                    message: format!("Failed to send request: {}", e),
                }));
            }
        };

        let status = response.status().as_u16();
        let body = response.into_body().read_to_string().map_err(|e| {
            Report::new(DiscoveryError::Transport {
                message: format!("Failed to read response: {}", e),
            })
        })?;

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let transport = UreqTransport::new();
        let request = OutboundRequest {
            url: "http://127.0.0.1:9/beckn/discover".into(),
            headers: Vec::new(),
            body: "{}".into(),
        };

        let err = transport
            .send(&request)
            .expect_err("nothing listens on the discard port");
        assert!(matches!(
            err.current_context(),
            DiscoveryError::Transport { .. }
        ));
    }
}
