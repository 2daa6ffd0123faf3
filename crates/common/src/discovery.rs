//! Discover and publish request payloads.

use error_stack::Report;
use serde::Serialize;
use serde_json::Value;

use crate::context::ProtocolContext;
use crate::error::DiscoveryError;
use crate::role::Role;

/// Spatial target for drivers looking for jobs.
pub const JOB_LOCATION_TARGET: &str = "$['beckn:itemAttributes']['job:jobLocation']['geo']";
/// Spatial target for providers looking for drivers.
pub const DRIVER_HOME_TARGET: &str = "$['beckn:itemAttributes']['driver:homeLocation']['geo']";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFilter {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

/// Search criteria of a discover call. At least one must be present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverQuery {
    pub text_search: Option<String>,
    pub jsonpath: Option<String>,
    pub geo: Option<GeoFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonPathFilter {
    #[serde(rename = "type")]
    pub kind: String,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialConstraint {
    pub op: String,
    pub targets: String,
    pub geometry: PointGeometry,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoverMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<JsonPathFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spatial: Option<Vec<SpatialConstraint>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoverRequest {
    pub context: ProtocolContext,
    pub message: DiscoverMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishMessage {
    pub catalogs: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishRequest {
    pub context: ProtocolContext,
    pub message: PublishMessage,
}

impl DiscoverQuery {
    /// Builds the discover `message` for `role`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::BadRequest`] if no criterion is present or
    /// the geo filter is out of range.
    pub fn to_message(&self, role: Option<Role>) -> Result<DiscoverMessage, Report<DiscoveryError>> {
        let text_search = non_empty(self.text_search.as_deref());
        let filters = non_empty(self.jsonpath.as_deref()).map(|expression| JsonPathFilter {
            kind: "jsonpath".to_string(),
            expression,
        });
        let spatial = self
            .geo
            .map(|geo| spatial_constraint(geo, role))
            .transpose()?
            .map(|constraint| vec![constraint]);

        if text_search.is_none() && filters.is_none() && spatial.is_none() {
            return Err(Report::new(DiscoveryError::BadRequest {
                message: "Please enter at least one search criterion".into(),
            }));
        }

        Ok(DiscoverMessage {
            text_search,
            filters,
            spatial,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn spatial_constraint(
    geo: GeoFilter,
    role: Option<Role>,
) -> Result<SpatialConstraint, Report<DiscoveryError>> {
    let in_range = (-90.0..=90.0).contains(&geo.lat)
        && (-180.0..=180.0).contains(&geo.lon)
        && geo.radius_km.is_finite()
        && geo.radius_km > 0.0;
    if !in_range {
        return Err(Report::new(DiscoveryError::BadRequest {
            message: format!(
                "Invalid geo filter: lat={}, lon={}, radius_km={}",
                geo.lat, geo.lon, geo.radius_km
            ),
        }));
    }

    let targets = match role {
        Some(Role::Driver) => JOB_LOCATION_TARGET,
        _ => DRIVER_HOME_TARGET,
    };

    Ok(SpatialConstraint {
        op: "s_dwithin".to_string(),
        targets: targets.to_string(),
        geometry: PointGeometry {
            kind: "Point".to_string(),
            coordinates: [geo.lon, geo.lat],
        },
        distance_meters: geo.radius_km * 1000.0,
    })
}
