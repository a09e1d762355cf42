//! seismap - seismic event map tiles and focal-mechanism geometry.
//!
//! The core is pure math: Web Mercator projection, quadkey tile addressing
//! for `world<quadkey>.png` tile sets, beach-ball geometry and magnitude
//! styling for map markers. Around it sit a read-only event catalog, explicit
//! filters, themes and configuration used by the `seismap` binary.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod filters;
pub mod focal;
pub mod markers;
pub mod models;
pub mod output;
pub mod projection;
pub mod regions;
pub mod theme;
pub mod tiles;

pub use errors::SeismapError;
pub use focal::{BeachBall, FocalMechanism, build_compressional_quadrant, build_nodal_planes};
pub use markers::{MagnitudeColor, MapMarker, marker_radius};
pub use projection::{GeoCoordinate, PixelPoint, pixel_to_geo, project_to_pixel};
pub use tiles::{QuadKey, TileAddress, TileMapper, quad_key, resolve_tile_path, tile_address_from_pixel};
