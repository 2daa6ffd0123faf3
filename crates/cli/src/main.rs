//! Beckn discovery CLI for signed CDS calls.
//!
//! This tool provides commands for:
//! - Generating and inspecting Ed25519 key material
//! - Signing request bodies offline and verifying the result
//! - Discovering and publishing catalogs against a CDS
//! - Filtering saved responses for a caller role
//! - Validating configuration files

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use beckn_discovery_common::discovery::{DiscoverQuery, GeoFilter};
use beckn_discovery_common::role::Role;

mod cds;
mod config;
mod error;
mod keys;
mod sign;
mod transport;

use error::CliError;
use transport::UreqTransport;

#[derive(Parser)]
#[command(name = "bdcli")]
#[command(about = "Beckn discovery CLI for signed catalog discovery and publishing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the TOML configuration file (embedded defaults if omitted)
    #[arg(long, short, global = true, env = "BECKN_DISCOVERY_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Key material management
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },

    /// Produce Digest and Authorization headers for a request body
    Sign {
        /// Key material JSON file
        #[arg(long, short)]
        key: PathBuf,

        /// File holding the exact body bytes to sign
        #[arg(long, short)]
        body: PathBuf,

        /// Unix seconds to use as `created` instead of the current time
        #[arg(long)]
        created: Option<i64>,

        /// Verify the signature against the key's public key
        #[arg(long)]
        verify: bool,
    },

    /// Search the CDS
    Discover {
        #[command(flatten)]
        call: CallArgs,

        /// Caller role: provider or driver
        #[arg(long)]
        role: Option<String>,

        /// Free text search
        #[arg(long)]
        text: Option<String>,

        /// JSONPath filter expression
        #[arg(long)]
        jsonpath: Option<String>,

        /// Latitude of the search centre
        #[arg(long, requires_all = ["lon", "radius_km"])]
        lat: Option<f64>,

        /// Longitude of the search centre
        #[arg(long, requires_all = ["lat", "radius_km"])]
        lon: Option<f64>,

        /// Search radius in kilometres
        #[arg(long, requires_all = ["lat", "lon"])]
        radius_km: Option<f64>,

        /// Print only the catalog items
        #[arg(long)]
        items: bool,
    },

    /// Publish catalogs to the CDS
    Publish {
        #[command(flatten)]
        call: CallArgs,

        /// JSON file holding a catalogs array
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Filter a saved CDS response for a role
    Filter {
        /// JSON response file
        #[arg(long, short)]
        input: PathBuf,

        /// Caller role: provider or driver
        #[arg(long)]
        role: Option<String>,

        /// Print only the catalog items
        #[arg(long)]
        items: bool,
    },

    /// Validate configuration
    Validate,
}

#[derive(Subcommand)]
enum KeysAction {
    /// Generate a new Ed25519 key file
    Generate {
        /// Subscriber id registered with the network registry
        #[arg(long)]
        subscriber_id: String,

        /// Key id registered with the network registry
        #[arg(long)]
        key_id: String,

        /// Output key file path
        #[arg(long, short)]
        output: PathBuf,

        /// Overwrite an existing key file
        #[arg(long)]
        force: bool,
    },

    /// Show the identity and public key of a key file
    Show {
        /// Key material JSON file
        #[arg(long, short)]
        key: PathBuf,
    },
}

#[derive(Args)]
struct CallArgs {
    /// Key material JSON file used to sign the request
    #[arg(long, short, env = "BECKN_DISCOVERY_KEY_FILE")]
    key: Option<PathBuf>,

    /// Send the request unsigned when no key is given
    #[arg(long)]
    allow_unsigned: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let result = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}  {} {}",
                chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply();

    if let Err(e) = result {
        eprintln!("Failed to initialize logger: {}", e);
    }
}

fn parse_role(label: Option<&str>) -> Option<Role> {
    let label = label?;
    let role = Role::from_label(label);
    if role.is_none() {
        log::warn!("Unknown role '{}', using the combined contexts", label);
    }
    role
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Keys { action } => match action {
            KeysAction::Generate {
                subscriber_id,
                key_id,
                output,
                force,
            } => keys::generate(&subscriber_id, &key_id, &output, force),
            KeysAction::Show { key } => keys::show(&key),
        },
        Commands::Sign {
            key,
            body,
            created,
            verify,
        } => {
            let headers = sign::sign_body(&key, &body, created, verify)?;
            sign::print_headers(&headers);
            Ok(())
        }
        Commands::Discover {
            call,
            role,
            text,
            jsonpath,
            lat,
            lon,
            radius_km,
            items,
        } => {
            let settings = config::load_settings(config)?;
            let geo = match (lat, lon, radius_km) {
                (Some(lat), Some(lon), Some(radius_km)) => Some(GeoFilter {
                    lat,
                    lon,
                    radius_km,
                }),
                _ => None,
            };
            let query = DiscoverQuery {
                text_search: text,
                jsonpath,
                geo,
            };
            let options = cds::CallOptions {
                key_file: call.key.as_deref(),
                allow_unsigned: call.allow_unsigned,
                items_only: items,
            };

            let data = cds::discover(
                &settings,
                UreqTransport::new(),
                &options,
                &query,
                parse_role(role.as_deref()),
            )?;
            cds::print_json(&data)
        }
        Commands::Publish { call, file } => {
            let settings = config::load_settings(config)?;
            let options = cds::CallOptions {
                key_file: call.key.as_deref(),
                allow_unsigned: call.allow_unsigned,
                items_only: false,
            };

            let data = cds::publish(&settings, UreqTransport::new(), &options, &file)?;
            cds::print_json(&data)
        }
        Commands::Filter { input, role, items } => {
            let data = cds::filter(&input, parse_role(role.as_deref()), items)?;
            cds::print_json(&data)
        }
        Commands::Validate => config::validate(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_discover_arguments() {
        let cli = Cli::try_parse_from([
            "bdcli",
            "discover",
            "--role",
            "driver",
            "--lat",
            "12.9",
            "--lon",
            "77.6",
            "--radius-km",
            "5",
            "--allow-unsigned",
        ])
        .expect("should parse discover arguments");

        match cli.command {
            Commands::Discover {
                role,
                radius_km,
                call,
                ..
            } => {
                assert_eq!(role.as_deref(), Some("driver"));
                assert_eq!(radius_km, Some(5.0));
                assert!(call.allow_unsigned);
            }
            _ => panic!("Expected discover command"),
        }
    }

    #[test]
    fn test_geo_arguments_must_come_together() {
        let result = Cli::try_parse_from(["bdcli", "discover", "--lat", "12.9"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role(Some("provider")), Some(Role::Provider));
        assert_eq!(parse_role(Some("driver")), Some(Role::Driver));
        assert_eq!(parse_role(Some("dispatcher")), None);
        assert_eq!(parse_role(None), None);
    }
}
