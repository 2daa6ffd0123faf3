//! Protocol envelope ("context") construction.
//!
//! Discover envelopes carry requester (BAP) identity and a role dependent
//! `schema_context`; every other action carries responder (BPP) identity
//! only. The two shapes are separate variants of [`ContextParty`] so a
//! publish envelope can never carry a `schema_context`.

use chrono::{SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::constants::{MESSAGE_TTL, PROTOCOL_VERSION};
use crate::role::{schema_contexts, Role};
use crate::settings::Participant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Discover,
    CatalogPublish,
    Other(String),
}

impl Action {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Discover => "discover",
            Self::CatalogPublish => "catalog_publish",
            Self::Other(action) => action,
        }
    }
}

impl From<&str> for Action {
    fn from(action: &str) -> Self {
        match action {
            "discover" => Self::Discover,
            "catalog_publish" => Self::CatalogPublish,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Requester fields of a discover envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoverParty {
    pub bap_id: String,
    pub bap_uri: String,
    pub schema_context: Vec<String>,
    #[serde(skip)]
    pub role: Option<Role>,
}

/// Responder fields of a publish (or any non-discover) envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishParty {
    pub bpp_id: String,
    pub bpp_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextParty {
    Discover(DiscoverParty),
    Publish(PublishParty),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolContext {
    pub version: String,
    pub action: Action,
    pub timestamp: String,
    pub message_id: String,
    pub transaction_id: String,
    pub ttl: String,
    #[serde(flatten)]
    pub party: ContextParty,
}

impl ProtocolContext {
    #[must_use]
    pub fn schema_context(&self) -> Option<&[String]> {
        match &self.party {
            ContextParty::Discover(party) => Some(&party.schema_context),
            ContextParty::Publish(_) => None,
        }
    }
}

/// Builds envelopes for a configured network participant.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    participant: Participant,
}

impl ContextBuilder {
    #[must_use]
    pub fn new(participant: Participant) -> Self {
        Self { participant }
    }

    /// Builds a fresh envelope with new message and transaction ids.
    ///
    /// `role` only affects discover envelopes.
    #[must_use]
    pub fn build(&self, action: Action, role: Option<Role>) -> ProtocolContext {
        let party = match action {
            Action::Discover => ContextParty::Discover(DiscoverParty {
                bap_id: self.participant.bap_id.clone(),
                bap_uri: self.participant.bap_uri.clone(),
                schema_context: schema_contexts(role),
                role,
            }),
            _ => ContextParty::Publish(PublishParty {
                bpp_id: self.participant.bpp_id.clone(),
                bpp_uri: self.participant.bpp_uri.clone(),
            }),
        };

        ProtocolContext {
            version: PROTOCOL_VERSION.to_string(),
            action,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message_id: Uuid::new_v4().to_string(),
            transaction_id: Uuid::new_v4().to_string(),
            ttl: MESSAGE_TTL.to_string(),
            party,
        }
    }
}
