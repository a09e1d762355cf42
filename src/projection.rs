//! Spherical Web Mercator projection.
//!
//! Converts between geographic coordinates and the pixel space of a zoomable
//! raster map where the whole world at zoom `z` is `tile_size * 2^z` pixels
//! square.

use std::f64::consts::{FRAC_PI_4, PI};

use serde::{Deserialize, Serialize};

use crate::errors::SeismapError;

/// Latitude limit of the Web Mercator square (degrees).
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Geographic latitude bounds (degrees).
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Geographic longitude bounds (degrees).
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Reject anything outside [-90, 90] x [-180, 180].
    ///
    /// # Errors
    ///
    /// Returns `CoordinateOutOfRange` for out-of-range or non-finite values.
    pub fn validate(&self) -> Result<(), SeismapError> {
        let lat_ok = (MIN_LAT..=MAX_LAT).contains(&self.latitude);
        let lon_ok = (MIN_LON..=MAX_LON).contains(&self.longitude);
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(SeismapError::CoordinateOutOfRange {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Clamp into the range the projection can represent.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            latitude: self.latitude.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT),
            longitude: self.longitude.clamp(MIN_LON, MAX_LON),
        }
    }
}

/// A position in map pixel space (origin at the north-west corner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Side length of the whole map in pixels at a zoom level.
#[must_use]
pub fn map_size_pixels(zoom: u8, tile_size: u32) -> f64 {
    f64::from(tile_size) * 2.0_f64.powi(i32::from(zoom))
}

/// Forward Web Mercator projection into map pixels.
///
/// Latitude is clamped to ±[`MERCATOR_MAX_LAT`] and longitude to ±180 before
/// projecting, so poles and antimeridian land on the map edge.
#[must_use]
pub fn project_to_pixel(coord: GeoCoordinate, zoom: u8, tile_size: u32) -> PixelPoint {
    let coord = coord.clamped();
    let size = map_size_pixels(zoom, tile_size);

    let x = (coord.longitude + 180.0) / 360.0 * size;

    let lat_rad = coord.latitude.to_radians();
    let merc_n = (FRAC_PI_4 + lat_rad / 2.0).tan().ln();
    let y = size / 2.0 - size * merc_n / (2.0 * PI);

    PixelPoint::new(x, y)
}

/// Inverse projection from map pixels back to degrees.
///
/// Pixels outside the map are clamped to its edge first.
#[must_use]
pub fn pixel_to_geo(pixel: PixelPoint, zoom: u8, tile_size: u32) -> GeoCoordinate {
    let size = map_size_pixels(zoom, tile_size);
    let x = pixel.x.clamp(0.0, size);
    let y = pixel.y.clamp(0.0, size);

    let longitude = x / size * 360.0 - 180.0;
    let merc_n = (size / 2.0 - y) * 2.0 * PI / size;
    let latitude = merc_n.sinh().atan().to_degrees();

    GeoCoordinate::new(latitude, longitude)
}
