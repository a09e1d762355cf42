//! Data model for seismic event records.
//!
//! One record per row of the `sumber_tsunami` export. Field aliases accept
//! the export's own column names (`magnitudo`, `origintime`).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::SeismapError;
use crate::focal::FocalMechanism;
use crate::projection::GeoCoordinate;
use crate::regions;

/// Timestamp format used by the database export.
pub const EXPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single seismic event with its fault-plane solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicEvent {
    /// Unique event ID
    #[serde(alias = "id")]
    pub event_id: String,

    /// Origin time (UTC)
    #[serde(alias = "origintime", deserialize_with = "deserialize_origin_time")]
    pub origin_time: DateTime<Utc>,

    /// Magnitude value
    #[serde(alias = "magnitudo")]
    pub magnitude: f64,

    /// Latitude (degrees)
    pub latitude: f64,

    /// Longitude (degrees)
    pub longitude: f64,

    /// Depth in kilometers (positive down)
    #[serde(default)]
    pub depth_km: f64,

    /// Strike (degrees clockwise from north)
    #[serde(default)]
    pub strike: f64,

    /// Dip (degrees)
    #[serde(default)]
    pub dip: f64,

    /// Slip / rake (degrees)
    #[serde(default)]
    pub slip: f64,
}

/// Accept RFC 3339 or the export's `YYYY-MM-DD HH:MM:SS` (taken as UTC).
fn deserialize_origin_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_origin_time(&raw).map_err(serde::de::Error::custom)
}

/// Parse an origin time string.
///
/// # Errors
///
/// Returns a `Validation` error if neither format matches.
pub fn parse_origin_time(raw: &str) -> Result<DateTime<Utc>, SeismapError> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, EXPORT_TIME_FORMAT)
        .map(|t| t.and_utc())
        .map_err(|e| SeismapError::Validation(format!("bad origin time '{raw}': {e}")))
}

impl SeismicEvent {
    /// Validate the record.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error for an empty ID, out-of-range
    /// coordinates, or a non-finite magnitude/depth.
    pub fn validate(&self) -> Result<(), SeismapError> {
        if self.event_id.trim().is_empty() {
            return Err(SeismapError::Validation("empty event ID".into()));
        }
        if self.coordinate().validate().is_err() {
            return Err(SeismapError::Validation(format!(
                "event {}: coordinate ({}, {}) out of range",
                self.event_id, self.latitude, self.longitude
            )));
        }
        if !self.magnitude.is_finite() || !self.depth_km.is_finite() {
            return Err(SeismapError::Validation(format!(
                "event {}: magnitude and depth must be finite",
                self.event_id
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn coordinate(&self) -> GeoCoordinate {
        GeoCoordinate::new(self.latitude, self.longitude)
    }

    #[must_use]
    pub fn focal_mechanism(&self) -> FocalMechanism {
        FocalMechanism::new(self.strike, self.dip, self.slip)
    }

    /// Coarse region name for the epicenter.
    #[must_use]
    pub fn region(&self) -> &'static str {
        regions::region_name(self.latitude, self.longitude)
    }

    /// Multi-line description shown when an event is selected.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Event ID: {}\nMagnitude {:.1} | {}\nLat: {:.4}°, Lon: {:.4}°",
            self.event_id,
            self.magnitude,
            self.origin_time.format("%d %b %Y %H:%M:%S"),
            self.latitude,
            self.longitude
        )
    }
}
