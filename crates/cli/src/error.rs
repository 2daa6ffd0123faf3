//! CLI error types.

use std::fmt;

use beckn_discovery_common::error::DiscoveryError;
use error_stack::Report;

#[derive(Debug)]
pub enum CliError {
    /// Configuration file error
    Config(String),
    /// IO error
    Io(std::io::Error),
    /// HTTP request error
    Http(String),
    /// Key loading or signing error
    Signing(String),
    /// JSON input or output error
    Json(String),
    /// CDS call completed with a failure outcome
    Call(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Io(err) => write!(f, "IO error: {}", err),
            CliError::Http(msg) => write!(f, "HTTP error: {}", msg),
            CliError::Signing(msg) => write!(f, "Signing error: {}", msg),
            CliError::Json(msg) => write!(f, "JSON error: {}", msg),
            CliError::Call(msg) => write!(f, "CDS call failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json(err.to_string())
    }
}

impl From<Report<DiscoveryError>> for CliError {
    fn from(report: Report<DiscoveryError>) -> Self {
        log::debug!("{:?}", report);
        let message = report.current_context().to_string();
        match report.current_context() {
            DiscoveryError::Configuration { .. } => CliError::Config(message),
            DiscoveryError::Transport { .. } | DiscoveryError::InvalidResponse { .. } => {
                CliError::Http(message)
            }
            DiscoveryError::BadRequest { .. } => CliError::Json(message),
            _ => CliError::Signing(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_cli_error_display() {
        assert_eq!(
            format!("{}", CliError::Config("test".into())),
            "Configuration error: test"
        );
        assert_eq!(
            format!("{}", CliError::Http("test".into())),
            "HTTP error: test"
        );
        assert_eq!(
            format!("{}", CliError::Signing("test".into())),
            "Signing error: test"
        );
        assert_eq!(
            format!("{}", CliError::Call("test".into())),
            "CDS call failed: test"
        );
    }

    #[test]
    fn test_cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        match cli_err {
            CliError::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_cli_error_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.source().is_some());

        let config_err = CliError::Config("test".into());
        assert!(config_err.source().is_none());
    }

    #[test]
    fn test_cli_error_from_report() {
        let cli_err: CliError = Report::new(DiscoveryError::NoKeyLoaded).into();
        match cli_err {
            CliError::Signing(msg) => assert_eq!(msg, "No signing key loaded"),
            other => panic!("Expected Signing variant, got {other:?}"),
        }

        let cli_err: CliError = Report::new(DiscoveryError::Configuration {
            message: "bad".into(),
        })
        .into();
        assert!(matches!(cli_err, CliError::Config(_)));
    }
}
