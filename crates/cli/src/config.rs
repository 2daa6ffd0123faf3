//! Settings loading for CLI commands.
//!
//! Settings come from a TOML file (or the embedded defaults when none is
//! given) merged with environment variables prefixed with
//! `BECKN_DISCOVERY__`. For example, `BECKN_DISCOVERY__CDS__API_KEY` will
//! override `cds.api_key`.

use std::fs;
use std::path::Path;

use beckn_discovery_common::settings::{Settings, ENVIRONMENT_PREFIX};

use crate::error::CliError;

/// Load settings from `file`, or the embedded defaults.
pub(crate) fn load_settings(file: Option<&Path>) -> Result<Settings, CliError> {
    let settings = match file {
        Some(path) => {
            log::debug!("Loading config from: {}", path.display());
            let content = fs::read_to_string(path)?;
            Settings::from_toml(&content)?
        }
        None => {
            log::debug!("Loading embedded default config");
            Settings::new()?
        }
    };
    log::debug!(
        "Environment variables with {}__ prefix were merged",
        ENVIRONMENT_PREFIX
    );

    Ok(settings)
}

/// Validate configuration and print the effective endpoints and identities.
pub fn validate(file: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(file)?;

    println!("Configuration is valid");
    if let Some(path) = file {
        println!("  File: {}", path.display());
    }
    println!(
        "  Discover endpoint: {}",
        settings.cds.endpoint(&settings.cds.discover_path)
    );
    println!(
        "  Publish endpoint: {}",
        settings.cds.endpoint(&settings.cds.publish_path)
    );
    println!(
        "  API key: {}",
        if settings.cds.api_key().is_some() {
            "configured"
        } else {
            "not set"
        }
    );
    println!("  BAP: {} ({})", settings.participant.bap_id, settings.participant.bap_uri);
    println!("  BPP: {} ({})", settings.participant.bpp_id, settings.participant.bpp_uri);
    println!("  Signing policy: {:?}", settings.signing.policy());

    Ok(())
}
