//! Discover, publish and filter commands.

use std::fs;
use std::path::Path;

use beckn_discovery_common::client::{CallOutcome, CdsClient, HttpTransport, SigningPolicy};
use beckn_discovery_common::discovery::DiscoverQuery;
use beckn_discovery_common::filter::{collect_items, filter_response};
use beckn_discovery_common::request_signing::KeyStore;
use beckn_discovery_common::role::Role;
use beckn_discovery_common::settings::Settings;
use serde_json::Value;

use crate::error::CliError;
use crate::keys::load_store;

/// Key and signing options shared by commands that call the CDS.
#[derive(Debug, Clone, Default)]
pub struct CallOptions<'a> {
    pub key_file: Option<&'a Path>,
    pub allow_unsigned: bool,
    /// Print only the flattened catalog items.
    pub items_only: bool,
}

impl CallOptions<'_> {
    fn key_store(&self) -> Result<KeyStore, CliError> {
        match self.key_file {
            Some(path) => load_store(path),
            None => Ok(KeyStore::new()),
        }
    }

    fn client<T: HttpTransport>(&self, settings: &Settings, transport: T) -> CdsClient<T> {
        let client = CdsClient::new(settings, transport);
        if self.allow_unsigned {
            client.with_policy(SigningPolicy::AllowUnsigned)
        } else {
            client
        }
    }
}

/// Run a discover call and return the (role filtered) response.
pub fn discover<T: HttpTransport>(
    settings: &Settings,
    transport: T,
    options: &CallOptions<'_>,
    query: &DiscoverQuery,
    role: Option<Role>,
) -> Result<Value, CliError> {
    let keys = options.key_store()?;
    let client = options.client(settings, transport);

    let outcome = client.discover(&keys, query, role)?;
    let data = into_data(outcome)?;
    Ok(if options.items_only {
        Value::Array(collect_items(&data))
    } else {
        data
    })
}

/// Publish the catalogs in `catalogs_file`.
///
/// The file holds either an array of catalogs or an object with a
/// `catalogs` array.
pub fn publish<T: HttpTransport>(
    settings: &Settings,
    transport: T,
    options: &CallOptions<'_>,
    catalogs_file: &Path,
) -> Result<Value, CliError> {
    let catalogs = read_catalogs(catalogs_file)?;
    let keys = options.key_store()?;
    let client = options.client(settings, transport);

    into_data(client.publish(&keys, catalogs)?)
}

/// Filter a saved response for `role`.
pub fn filter(input: &Path, role: Option<Role>, items_only: bool) -> Result<Value, CliError> {
    let response: Value = serde_json::from_str(&fs::read_to_string(input)?)?;
    let filtered = filter_response(&response, role);

    Ok(if items_only {
        Value::Array(collect_items(&filtered))
    } else {
        filtered
    })
}

pub fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn into_data(outcome: CallOutcome) -> Result<Value, CliError> {
    match outcome {
        CallOutcome::Success { data, signed, .. } => {
            log::debug!("CDS call succeeded (signed: {})", signed);
            Ok(data)
        }
        CallOutcome::Failure {
            error,
            request_body,
        } => {
            log::error!("Request body was: {}", request_body);
            Err(CliError::Call(error))
        }
    }
}

fn read_catalogs(path: &Path) -> Result<Vec<Value>, CliError> {
    let document: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    match document {
        Value::Array(catalogs) => Ok(catalogs),
        Value::Object(mut object) => match object.remove("catalogs") {
            Some(Value::Array(catalogs)) => Ok(catalogs),
            _ => Err(CliError::Json(format!(
                "{} has no catalogs array",
                path.display()
            ))),
        },
        _ => Err(CliError::Json(format!(
            "{} must hold a catalogs array",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use beckn_discovery_common::client::{OutboundRequest, TransportResponse};
    use beckn_discovery_common::constants::{DRIVER_CONTEXT, JOB_CONTEXT};
    use beckn_discovery_common::error::DiscoveryError;
    use error_stack::Report;
    use serde_json::json;
    use tempfile::TempDir;

    struct CannedTransport {
        status: u16,
        body: Value,
        sent: RefCell<Vec<OutboundRequest>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: Value) -> Self {
            Self {
                status,
                body,
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl HttpTransport for &CannedTransport {
        fn send(
            &self,
            request: &OutboundRequest,
        ) -> Result<TransportResponse, Report<DiscoveryError>> {
            self.sent.borrow_mut().push(request.clone());
            Ok(TransportResponse {
                status: self.status,
                body: self.body.to_string(),
            })
        }
    }

    fn test_settings() -> Settings {
        Settings::from_toml(
            r#"
            [cds]
            base_url = "https://cds.test"

            [participant]
            bap_id = "bap.example.com"
            bap_uri = "https://bap.example.com/callbacks"
            bpp_id = "bpp.example.com"
            bpp_uri = "https://bpp.example.com/callbacks"
            "#,
        )
        .expect("should parse test settings")
    }

    fn mixed_response() -> Value {
        json!({
            "message": {
                "catalogs": [{
                    "beckn:items": [
                        { "beckn:id": "d1", "beckn:itemAttributes": { "@context": DRIVER_CONTEXT } },
                        { "beckn:id": "j1", "beckn:itemAttributes": { "@context": JOB_CONTEXT } }
                    ]
                }]
            }
        })
    }

    fn query() -> DiscoverQuery {
        DiscoverQuery {
            text_search: Some("driver".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_discover_requires_key_unless_unsigned_allowed() {
        let transport = CannedTransport::new(200, mixed_response());
        let settings = test_settings();

        let result = discover(&settings, &transport, &CallOptions::default(), &query(), None);
        assert!(matches!(result, Err(CliError::Signing(_))));
        assert!(transport.sent.borrow().is_empty());

        let options = CallOptions {
            allow_unsigned: true,
            items_only: true,
            ..Default::default()
        };
        let items = discover(&settings, &transport, &options, &query(), Some(Role::Driver))
            .expect("unsigned discover should succeed");
        let job = mixed_response()["message"]["catalogs"][0]["beckn:items"][1].clone();
        assert_eq!(items, Value::Array(vec![job]));
    }

    #[test]
    fn test_discover_failure_status() {
        let transport = CannedTransport::new(500, json!({ "error": "boom" }));
        let options = CallOptions {
            allow_unsigned: true,
            ..Default::default()
        };

        let result = discover(&test_settings(), &transport, &options, &query(), None);
        match result {
            Err(CliError::Call(msg)) => assert!(msg.contains("500")),
            other => panic!("Expected Call error, got {other:?}"),
        }
    }

    #[test]
    fn test_publish_reads_catalog_file() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = dir.path().join("catalogs.json");
        fs::write(&path, r#"{"catalogs":[{"beckn:id":"c1"}]}"#).expect("should write catalogs");

        let transport = CannedTransport::new(200, json!({ "status": "ACK" }));
        let options = CallOptions {
            allow_unsigned: true,
            ..Default::default()
        };
        let data = publish(&test_settings(), &transport, &options, &path)
            .expect("publish should succeed");

        assert_eq!(data, json!({ "status": "ACK" }));
        let sent = transport.sent.borrow();
        let body: Value = serde_json::from_str(&sent[0].body).expect("body should be JSON");
        assert_eq!(body["message"]["catalogs"], json!([{ "beckn:id": "c1" }]));
    }

    #[test]
    fn test_read_catalogs_rejects_other_shapes() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = dir.path().join("catalogs.json");
        fs::write(&path, r#"{"items":[]}"#).expect("should write file");

        assert!(matches!(read_catalogs(&path), Err(CliError::Json(_))));

        fs::write(&path, r#"[{"beckn:id":"c1"},{"beckn:id":"c2"}]"#).expect("should write file");
        assert_eq!(read_catalogs(&path).expect("should read array").len(), 2);
    }

    #[test]
    fn test_filter_saved_response() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = dir.path().join("response.json");
        fs::write(&path, mixed_response().to_string()).expect("should write response");

        let items = filter(&path, Some(Role::Provider), true).expect("should filter");
        let ids: Vec<&str> = items
            .as_array()
            .expect("items should be an array")
            .iter()
            .filter_map(|item| item["beckn:id"].as_str())
            .collect();
        assert_eq!(ids, vec!["d1"]);
    }
}
