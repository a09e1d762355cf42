//! Map markers for seismic events.
//!
//! Marker color steps with magnitude and the radius grows as `2^M`, so a
//! single M7 stands out against a swarm of M3s.

use serde::Serialize;

use crate::errors::SeismapError;
use crate::models::SeismicEvent;
use crate::projection::PixelPoint;
use crate::tiles::{QuadKey, TileAddress, TileMapper, tile_address_from_pixel};

/// Smallest marker radius in pixels.
pub const MIN_MARKER_RADIUS: f64 = 5.0;

/// Largest marker radius in pixels.
pub const MAX_MARKER_RADIUS: f64 = 30.0;

/// Scale applied to `2^magnitude`.
const RADIUS_SCALE: f64 = 0.8;

/// Marker color bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeColor {
    DarkRed,
    Red,
    DarkOrange,
    Orange,
    Gold,
    LightGreen,
}

impl MagnitudeColor {
    /// Bucket for a magnitude value.
    #[must_use]
    pub fn from_magnitude(mag: f64) -> Self {
        match mag {
            m if m >= 7.0 => Self::DarkRed,
            m if m >= 6.0 => Self::Red,
            m if m >= 5.0 => Self::DarkOrange,
            m if m >= 4.0 => Self::Orange,
            m if m >= 3.0 => Self::Gold,
            _ => Self::LightGreen,
        }
    }

    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::DarkRed => (139, 0, 0),
            Self::Red => (255, 0, 0),
            Self::DarkOrange => (255, 140, 0),
            Self::Orange => (255, 165, 0),
            Self::Gold => (255, 215, 0),
            Self::LightGreen => (144, 238, 144),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DarkRed => "dark red",
            Self::Red => "red",
            Self::DarkOrange => "dark orange",
            Self::Orange => "orange",
            Self::Gold => "gold",
            Self::LightGreen => "light green",
        }
    }

    /// `#rrggbb` form.
    #[must_use]
    pub fn hex(self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Marker radius in pixels: `clamp(2^mag * 0.8, 5, 30)`.
#[must_use]
pub fn marker_radius(mag: f64) -> f64 {
    if mag.is_nan() {
        return MIN_MARKER_RADIUS;
    }
    (2.0_f64.powf(mag) * RADIUS_SCALE).clamp(MIN_MARKER_RADIUS, MAX_MARKER_RADIUS)
}

/// An event placed on the map at one zoom level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub event_id: String,
    pub magnitude: f64,
    pub pixel: PixelPoint,
    pub tile: TileAddress,
    pub quad_key: QuadKey,
    pub radius: f64,
    pub color: MagnitudeColor,
}

impl MapMarker {
    /// Place one event.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid zoom or a coordinate the mapper's
    /// policy rejects.
    pub fn place(event: &SeismicEvent, mapper: &TileMapper, zoom: i64) -> Result<Self, SeismapError> {
        let pixel = mapper.project(event.coordinate(), zoom)?;
        let tile = tile_address_from_pixel(pixel, mapper.zoom(zoom)?, mapper.tile_size());
        Ok(Self {
            event_id: event.event_id.clone(),
            magnitude: event.magnitude,
            pixel,
            tile,
            quad_key: tile.quad_key(),
            radius: marker_radius(event.magnitude),
            color: MagnitudeColor::from_magnitude(event.magnitude),
        })
    }
}

/// Place a batch of events. Fails on the first event that cannot be placed.
///
/// # Errors
///
/// See [`MapMarker::place`].
pub fn place_markers<'a, I>(events: I, mapper: &TileMapper, zoom: i64) -> Result<Vec<MapMarker>, SeismapError>
where
    I: IntoIterator<Item = &'a SeismicEvent>,
{
    events
        .into_iter()
        .map(|event| MapMarker::place(event, mapper, zoom))
        .collect()
}
