use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::client::SigningPolicy;
use crate::error::DiscoveryError;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../../../beckn-discovery.toml");

pub const ENVIRONMENT_PREFIX: &str = "BECKN_DISCOVERY";

fn default_discover_path() -> String {
    "/beckn/discover".to_string()
}

fn default_publish_path() -> String {
    "/beckn/v2/catalog/publish".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Cds {
    #[validate(url)]
    pub base_url: String,
    #[serde(default = "default_discover_path")]
    pub discover_path: String,
    #[serde(default = "default_publish_path")]
    pub publish_path: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Cds {
    /// Joins `path` onto the base URL without doubling the slash.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// API key to send as `x-api-key`, if one is configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Network participant identities written into protocol envelopes.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Participant {
    #[validate(length(min = 1))]
    pub bap_id: String,
    #[validate(url)]
    pub bap_uri: String,
    #[validate(length(min = 1))]
    pub bpp_id: String,
    #[validate(url)]
    pub bpp_uri: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Signing {
    /// Send requests without `Digest`/`Authorization` when no key is loaded.
    #[serde(default)]
    pub allow_unsigned: bool,
}

impl Signing {
    #[must_use]
    pub fn policy(&self) -> SigningPolicy {
        if self.allow_unsigned {
            SigningPolicy::AllowUnsigned
        } else {
            SigningPolicy::Required
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub cds: Cds,
    #[validate(nested)]
    pub participant: Participant,
    #[serde(default)]
    pub signing: Signing,
}

impl Settings {
    /// Loads the embedded default settings, merged with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged settings fail to parse or validate.
    pub fn new() -> Result<Self, Report<DiscoveryError>> {
        Self::from_toml(DEFAULT_SETTINGS_TOML)
    }

    /// Parses TOML settings, applies `BECKN_DISCOVERY__` environment
    /// overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, required fields are missing,
    /// or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<DiscoveryError>> {
        let environment = Environment::default()
            .prefix(ENVIRONMENT_PREFIX)
            .separator("__");

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(DiscoveryError::Configuration {
                message: "Failed to build configuration".into(),
            })?;

        let settings: Self =
            config
                .try_deserialize()
                .change_context(DiscoveryError::Configuration {
                    message: "Failed to deserialize configuration".into(),
                })?;

        settings
            .validate()
            .change_context(DiscoveryError::Configuration {
                message: "Settings validation failed".into(),
            })?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tests::crate_test_settings_str;

    #[test]
    fn test_settings_new() {
        let settings = Settings::new().expect("Settings should load from embedded TOML");

        assert!(!settings.cds.base_url.is_empty());
        assert_eq!(settings.cds.discover_path, "/beckn/discover");
        assert_eq!(settings.cds.publish_path, "/beckn/v2/catalog/publish");
        assert!(!settings.participant.bap_id.is_empty());
        assert!(!settings.participant.bpp_id.is_empty());
        assert_eq!(settings.signing.policy(), SigningPolicy::Required);
    }

    #[test]
    fn test_settings_from_valid_toml() {
        let settings =
            Settings::from_toml(&crate_test_settings_str()).expect("should parse test settings");

        assert_eq!(settings.cds.base_url, "https://cds.test");
        assert_eq!(settings.cds.api_key(), Some("test-api-key"));
        assert_eq!(settings.participant.bap_id, "bap.example.com");
        assert_eq!(settings.participant.bpp_uri, "https://bpp.example.com/callbacks");
    }

    #[test]
    fn test_settings_missing_required_fields() {
        let toml_str = r#"
            [cds]
            base_url = "https://cds.test"

            [participant]
            bap_id = "bap.example.com"
            # Missing bap_uri, bpp_id, bpp_uri
            "#;

        let settings = Settings::from_toml(toml_str);
        assert!(
            settings.is_err(),
            "Should fail when required fields are missing"
        );
    }

    #[test]
    fn test_settings_empty_toml() {
        let settings = Settings::from_toml("");
        assert!(settings.is_err(), "Should fail with empty TOML");
    }

    #[test]
    fn test_settings_invalid_toml_syntax() {
        let toml_str = r#"
            [cds
            base_url = "https://cds.test"
            "#;

        let settings = Settings::from_toml(toml_str);
        assert!(settings.is_err(), "Should fail with invalid TOML syntax");
    }

    #[test]
    fn test_settings_invalid_url_rejected() {
        let toml_str = crate_test_settings_str().replace("https://cds.test", "not a url");

        let err = Settings::from_toml(&toml_str).expect_err("should reject invalid base_url");
        assert!(matches!(
            err.current_context(),
            DiscoveryError::Configuration { .. }
        ));
    }

    #[test]
    fn test_settings_defaults() {
        let toml_str = r#"
            [cds]
            base_url = "https://cds.test"

            [participant]
            bap_id = "bap.example.com"
            bap_uri = "https://bap.example.com/callbacks"
            bpp_id = "bpp.example.com"
            bpp_uri = "https://bpp.example.com/callbacks"
            "#;

        let settings = Settings::from_toml(toml_str).expect("should apply defaults");
        assert_eq!(settings.cds.discover_path, "/beckn/discover");
        assert_eq!(settings.cds.api_key(), None);
        assert!(!settings.signing.allow_unsigned);
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let toml_str = crate_test_settings_str().replace("test-api-key", "  ");
        let settings = Settings::from_toml(&toml_str).expect("should parse settings");
        assert_eq!(settings.cds.api_key(), None);
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let settings =
            Settings::from_toml(&crate_test_settings_str()).expect("should parse test settings");
        let mut cds = settings.cds;

        assert_eq!(
            cds.endpoint(&cds.discover_path),
            "https://cds.test/beckn/discover"
        );
        cds.base_url = "https://cds.test/".into();
        assert_eq!(
            cds.endpoint("beckn/v2/catalog/publish"),
            "https://cds.test/beckn/v2/catalog/publish"
        );
    }

    #[test]
    fn test_signing_policy() {
        assert_eq!(Signing::default().policy(), SigningPolicy::Required);
        assert_eq!(
            Signing {
                allow_unsigned: true
            }
            .policy(),
            SigningPolicy::AllowUnsigned
        );
    }

    #[test]
    fn test_override_env() {
        temp_env::with_var(
            "BECKN_DISCOVERY__PARTICIPANT__BPP_ID",
            Some("override.example.com"),
            || {
                let settings = Settings::from_toml(&crate_test_settings_str())
                    .expect("Settings should load with env overrides");

                assert_eq!(settings.participant.bpp_id, "override.example.com");
            },
        );
    }
}
