//! Caller roles and the semantic contexts each role may see.
//!
//! A provider searches for driver candidates and a driver searches for jobs.
//! Callers without a role get the union of both vocabularies plus the core
//! context, which keeps older clients working.

use serde::{Deserialize, Serialize};

use crate::constants::{CORE_CONTEXT, DRIVER_BASE_CONTEXT, DRIVER_CONTEXT, JOB_CONTEXT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Provider,
    Driver,
}

impl Role {
    /// Maps a free-form role label onto a role.
    ///
    /// Unknown labels yield `None` and are treated like an absent role.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "provider" => Some(Self::Provider),
            "driver" => Some(Self::Driver),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Driver => "driver",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context URIs advertised in the `schema_context` of a discover envelope.
#[must_use]
pub fn schema_contexts(role: Option<Role>) -> Vec<String> {
    let uris: &[&str] = match role {
        Some(Role::Provider) => &[DRIVER_BASE_CONTEXT],
        Some(Role::Driver) => &[JOB_CONTEXT],
        None => &[DRIVER_BASE_CONTEXT, JOB_CONTEXT, CORE_CONTEXT],
    };
    uris.iter().map(|uri| (*uri).to_string()).collect()
}

/// Context URIs an item may carry and still be shown to `role`.
///
/// Provider catalogues tag candidate attributes with [`DRIVER_CONTEXT`], so
/// the provider allow-list accepts it next to the published base vocabulary.
#[must_use]
pub fn allowed_contexts(role: Option<Role>) -> &'static [&'static str] {
    match role {
        Some(Role::Provider) => &[DRIVER_BASE_CONTEXT, DRIVER_CONTEXT],
        Some(Role::Driver) => &[JOB_CONTEXT],
        None => &[DRIVER_BASE_CONTEXT, DRIVER_CONTEXT, JOB_CONTEXT, CORE_CONTEXT],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(Role::from_label("provider"), Some(Role::Provider));
        assert_eq!(Role::from_label(" Driver "), Some(Role::Driver));
        assert_eq!(Role::from_label("admin"), None);
        assert_eq!(Role::from_label(""), None);
    }

    #[test]
    fn test_schema_contexts_are_role_exclusive() {
        let provider = schema_contexts(Some(Role::Provider));
        let driver = schema_contexts(Some(Role::Driver));

        assert_eq!(provider, vec![DRIVER_BASE_CONTEXT.to_string()]);
        assert_eq!(driver, vec![JOB_CONTEXT.to_string()]);
        assert!(provider.iter().all(|uri| !driver.contains(uri)));
    }

    #[test]
    fn test_schema_contexts_without_role_is_union_plus_core() {
        let contexts = schema_contexts(None);
        assert_eq!(contexts.len(), 3);
        assert!(contexts.contains(&DRIVER_BASE_CONTEXT.to_string()));
        assert!(contexts.contains(&JOB_CONTEXT.to_string()));
        assert!(contexts.contains(&CORE_CONTEXT.to_string()));
    }

    #[test]
    fn test_allowed_contexts_cover_schema_contexts() {
        for role in [Some(Role::Provider), Some(Role::Driver), None] {
            let allowed = allowed_contexts(role);
            for uri in schema_contexts(role) {
                assert!(allowed.contains(&uri.as_str()), "{uri} missing for {role:?}");
            }
        }
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&Role::Provider).expect("should serialize role");
        assert_eq!(json, "\"provider\"");
        let role: Role = serde_json::from_str("\"driver\"").expect("should parse role");
        assert_eq!(role, Role::Driver);
    }
}
