//! Tile addressing for the quadtree map tile set.
//!
//! Tiles live on disk as `world<quadkey>.png`, where the quadkey has one
//! base-4 digit per zoom level (x contributes 1, y contributes 2). The root
//! tile at zoom 0 has an empty quadkey and is stored as `world.png`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::SeismapError;
use crate::projection::{self, GeoCoordinate, PixelPoint};

/// Highest zoom level whose tile indices fit the address type.
pub const MAX_SUPPORTED_ZOOM: u8 = 30;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Placeholder dimensions when a tile image is missing.
pub const PLACEHOLDER_WIDTH: u32 = 512;
pub const PLACEHOLDER_HEIGHT: u32 = 256;

/// Number of tiles along one edge at a zoom level. Saturates past zoom 31.
#[must_use]
pub const fn tiles_per_side(zoom: u8) -> u32 {
    if zoom < 32 { 1 << zoom } else { u32::MAX }
}

/// A square raster tile at a given zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TileAddress {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileAddress {
    /// Create an address, checking that it exists at its level.
    ///
    /// # Errors
    ///
    /// Returns an error if the zoom is unsupported or x/y fall off the grid.
    pub fn new(zoom: u8, x: u32, y: u32) -> Result<Self, SeismapError> {
        if zoom > MAX_SUPPORTED_ZOOM {
            return Err(SeismapError::InvalidZoomLevel {
                zoom: i64::from(zoom),
                max: MAX_SUPPORTED_ZOOM,
            });
        }
        let side = tiles_per_side(zoom);
        if x >= side || y >= side {
            return Err(SeismapError::Validation(format!(
                "tile ({x}, {y}) outside the {side}x{side} grid at zoom {zoom}"
            )));
        }
        Ok(Self { zoom, x, y })
    }

    /// Decode a quadkey into the tile it names.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuadKey` for characters other than `0`-`3` or keys
    /// longer than [`MAX_SUPPORTED_ZOOM`].
    pub fn from_quad_key(key: &str) -> Result<Self, SeismapError> {
        let zoom = u8::try_from(key.len())
            .ok()
            .filter(|z| *z <= MAX_SUPPORTED_ZOOM)
            .ok_or_else(|| SeismapError::InvalidQuadKey(format!("{key} is too long")))?;

        let mut x = 0u32;
        let mut y = 0u32;
        for ch in key.chars() {
            let digit = ch
                .to_digit(4)
                .ok_or_else(|| SeismapError::InvalidQuadKey(format!("{key} ('{ch}' is not 0-3)")))?;
            x = (x << 1) | (digit & 1);
            y = (y << 1) | (digit >> 1);
        }

        Ok(Self { zoom, x, y })
    }

    /// The quadkey naming this tile.
    #[must_use]
    pub fn quad_key(&self) -> QuadKey {
        quad_key(*self)
    }

    /// North-west corner of the tile in map pixels.
    #[must_use]
    pub fn origin(&self, tile_size: u32) -> PixelPoint {
        PixelPoint::new(
            f64::from(self.x) * f64::from(tile_size),
            f64::from(self.y) * f64::from(tile_size),
        )
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Base-4 tile key, one digit per zoom level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct QuadKey(String);

impl QuadKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The root tile key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// On-disk file name for this key.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("world{}.png", self.0)
    }
}

impl fmt::Display for QuadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for QuadKey {
    type Err = SeismapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileAddress::from_quad_key(s).map(quad_key)
    }
}

/// Encode a tile address as a quadkey.
///
/// Walks from the most significant bit (`zoom - 1`) down to bit 0; each digit
/// is `x_bit + 2 * y_bit`.
#[must_use]
pub fn quad_key(address: TileAddress) -> QuadKey {
    let key = (0..address.zoom)
        .rev()
        .map(|level| {
            let bit = |v: u32| v.checked_shr(u32::from(level)).unwrap_or(0) & 1;
            let digit = bit(address.x) + 2 * bit(address.y);
            char::from_digit(digit, 4).unwrap_or('0')
        })
        .collect();
    QuadKey(key)
}

/// Tile containing a map pixel, clamped onto the grid.
#[must_use]
pub fn tile_address_from_pixel(pixel: PixelPoint, zoom: u8, tile_size: u32) -> TileAddress {
    let max_index = tiles_per_side(zoom) - 1;
    let index = |v: f64| -> u32 {
        let tile = (v / f64::from(tile_size)).floor();
        if tile.is_nan() || tile <= 0.0 {
            0
        } else if tile >= f64::from(max_index) {
            max_index
        } else {
            // in (0, max_index) so the cast is exact
            tile as u32
        }
    };

    TileAddress {
        zoom,
        x: index(pixel.x),
        y: index(pixel.y),
    }
}

/// Path of the tile image under `base`. Does not touch the filesystem.
#[must_use]
pub fn resolve_tile_path(base: &Path, address: TileAddress) -> PathBuf {
    base.join(quad_key(address).file_name())
}

/// How out-of-range coordinates are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinatePolicy {
    /// Clamp silently onto the map
    #[default]
    Clamp,
    /// Reject anything outside [-90, 90] x [-180, 180]
    Strict,
}

impl std::str::FromStr for CoordinatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "strict" => Ok(Self::Strict),
            _ => Err(format!("unknown coordinate policy: {s} (expected: clamp, strict)")),
        }
    }
}

/// Axis-aligned rectangle in map pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    /// Rectangle of the given size centred on a point.
    #[must_use]
    pub fn centered_on(center: PixelPoint, width: f64, height: f64) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }
}

/// Projection and tile lookup for one configured tile set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileMapper {
    tile_size: u32,
    max_zoom: u8,
    policy: CoordinatePolicy,
}

impl Default for TileMapper {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            max_zoom: 4,
            policy: CoordinatePolicy::Clamp,
        }
    }
}

impl TileMapper {
    /// Create a mapper.
    ///
    /// # Errors
    ///
    /// Returns an error if `tile_size` is zero or `max_zoom` exceeds
    /// [`MAX_SUPPORTED_ZOOM`].
    pub fn new(tile_size: u32, max_zoom: u8, policy: CoordinatePolicy) -> Result<Self, SeismapError> {
        if tile_size == 0 {
            return Err(SeismapError::Config("tile size must be positive".into()));
        }
        if max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(SeismapError::InvalidZoomLevel {
                zoom: i64::from(max_zoom),
                max: MAX_SUPPORTED_ZOOM,
            });
        }
        Ok(Self {
            tile_size,
            max_zoom,
            policy,
        })
    }

    #[must_use]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    #[must_use]
    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    #[must_use]
    pub fn policy(&self) -> CoordinatePolicy {
        self.policy
    }

    /// Validate a requested zoom level. Never clamps.
    ///
    /// # Errors
    ///
    /// Returns `InvalidZoomLevel` for negative levels or levels above the
    /// configured maximum.
    pub fn zoom(&self, level: i64) -> Result<u8, SeismapError> {
        u8::try_from(level)
            .ok()
            .filter(|z| *z <= self.max_zoom)
            .ok_or(SeismapError::InvalidZoomLevel {
                zoom: level,
                max: self.max_zoom,
            })
    }

    fn check_coordinate(&self, coord: GeoCoordinate) -> Result<(), SeismapError> {
        if !coord.is_finite() {
            return Err(SeismapError::CoordinateOutOfRange {
                latitude: coord.latitude,
                longitude: coord.longitude,
            });
        }
        match self.policy {
            CoordinatePolicy::Clamp => Ok(()),
            CoordinatePolicy::Strict => coord.validate(),
        }
    }

    /// Project a coordinate into map pixels at `zoom`.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid zoom or a coordinate the policy rejects.
    pub fn project(&self, coord: GeoCoordinate, zoom: i64) -> Result<PixelPoint, SeismapError> {
        let zoom = self.zoom(zoom)?;
        self.check_coordinate(coord)?;
        Ok(projection::project_to_pixel(coord, zoom, self.tile_size))
    }

    /// Inverse of [`TileMapper::project`].
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid zoom.
    pub fn unproject(&self, pixel: PixelPoint, zoom: i64) -> Result<GeoCoordinate, SeismapError> {
        let zoom = self.zoom(zoom)?;
        Ok(projection::pixel_to_geo(pixel, zoom, self.tile_size))
    }

    /// Tile containing a coordinate at `zoom`.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid zoom or a coordinate the policy rejects.
    pub fn tile_for(&self, coord: GeoCoordinate, zoom: i64) -> Result<TileAddress, SeismapError> {
        let pixel = self.project(coord, zoom)?;
        let zoom = self.zoom(zoom)?;
        Ok(tile_address_from_pixel(pixel, zoom, self.tile_size))
    }

    /// Every tile at `zoom`, row by row from the north-west corner.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid zoom.
    pub fn grid(&self, zoom: i64) -> Result<TileGrid, SeismapError> {
        let zoom = self.zoom(zoom)?;
        Ok(TileGrid::new(zoom))
    }

    /// Tiles intersecting a viewport, clipped to the map.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid zoom.
    pub fn visible_tiles(&self, zoom: i64, viewport: PixelRect) -> Result<Vec<TileAddress>, SeismapError> {
        let zoom = self.zoom(zoom)?;
        let size = projection::map_size_pixels(zoom, self.tile_size);

        let left = viewport.x.max(0.0);
        let top = viewport.y.max(0.0);
        let right = (viewport.x + viewport.width).min(size);
        let bottom = (viewport.y + viewport.height).min(size);
        if left >= right || top >= bottom {
            return Ok(Vec::new());
        }

        let first = tile_address_from_pixel(PixelPoint::new(left, top), zoom, self.tile_size);
        // Exclusive edge: a viewport ending exactly on a tile boundary does
        // not touch the next tile.
        let last = tile_address_from_pixel(
            PixelPoint::new(right - f64::EPSILON * size, bottom - f64::EPSILON * size),
            zoom,
            self.tile_size,
        );

        let tiles = (first.y..=last.y)
            .flat_map(|y| (first.x..=last.x).map(move |x| TileAddress { zoom, x, y }))
            .collect();
        Ok(tiles)
    }

    /// Geographic corners of a tile.
    ///
    /// # Errors
    ///
    /// Returns an error if the tile's zoom is above the configured maximum.
    pub fn bounds(&self, tile: TileAddress) -> Result<TileBounds, SeismapError> {
        let zoom = i64::from(tile.zoom);
        let north_west = tile.origin(self.tile_size);
        let size = f64::from(self.tile_size);
        let south_east = PixelPoint::new(north_west.x + size, north_west.y + size);
        Ok(TileBounds {
            north_west: self.unproject(north_west, zoom)?,
            south_east: self.unproject(south_east, zoom)?,
        })
    }

    /// Tiles a `width` x `height` viewport centred on `coord` needs.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid zoom or a coordinate the policy rejects.
    pub fn viewport_tiles(
        &self,
        coord: GeoCoordinate,
        zoom: i64,
        width: f64,
        height: f64,
    ) -> Result<Vec<TileAddress>, SeismapError> {
        let center = self.project(coord, zoom)?;
        self.visible_tiles(zoom, PixelRect::centered_on(center, width, height))
    }
}

/// North-west and south-east corners of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileBounds {
    pub north_west: GeoCoordinate,
    pub south_east: GeoCoordinate,
}

/// Row-major iterator over every tile of one zoom level.
#[derive(Debug, Clone)]
pub struct TileGrid {
    zoom: u8,
    next: u64,
    total: u64,
}

impl TileGrid {
    fn new(zoom: u8) -> Self {
        let side = u64::from(tiles_per_side(zoom));
        Self {
            zoom,
            next: 0,
            total: side * side,
        }
    }
}

impl Iterator for TileGrid {
    type Item = TileAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let side = u64::from(tiles_per_side(self.zoom));
        let index = self.next;
        self.next += 1;
        // index < side^2 and side <= 2^30, so both fit in u32
        Some(TileAddress {
            zoom: self.zoom,
            x: (index % side) as u32,
            y: (index / side) as u32,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.total - self.next).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// Result of looking a tile up on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TileImage {
    /// The tile image exists
    File { path: PathBuf },
    /// The tile is missing; draw a placeholder instead
    Placeholder {
        path: PathBuf,
        width: u32,
        height: u32,
        message: String,
    },
}

impl TileImage {
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::File { path } | Self::Placeholder { path, .. } => path,
        }
    }
}

/// Tile images stored under one directory.
#[derive(Debug, Clone)]
pub struct TileSource {
    directory: PathBuf,
}

impl TileSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Find a tile image, substituting a placeholder when it is missing.
    #[must_use]
    pub fn locate(&self, address: TileAddress) -> TileImage {
        let path = resolve_tile_path(&self.directory, address);
        if path.is_file() {
            debug!("tile {} found at {}", address, path.display());
            return TileImage::File { path };
        }

        warn!("tile {} missing at {}, using placeholder", address, path.display());
        let message = format!(
            "Map tiles not found\nPlace {} in '{}' directory",
            quad_key(address).file_name(),
            self.directory.display()
        );
        TileImage::Placeholder {
            path,
            width: PLACEHOLDER_WIDTH,
            height: PLACEHOLDER_HEIGHT,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tile(zoom: u8, x: u32, y: u32) -> TileAddress {
        TileAddress::new(zoom, x, y).unwrap()
    }

    #[test]
    fn test_zoom_zero_has_empty_key() {
        let key = quad_key(tile(0, 0, 0));
        assert!(key.is_empty());
        assert_eq!(key.file_name(), "world.png");
    }

    #[test]
    fn test_top_level_quadrants() {
        assert_eq!(quad_key(tile(1, 0, 0)).as_str(), "0"); // NW
        assert_eq!(quad_key(tile(1, 1, 0)).as_str(), "1"); // NE
        assert_eq!(quad_key(tile(1, 0, 1)).as_str(), "2"); // SW
        assert_eq!(quad_key(tile(1, 1, 1)).as_str(), "3"); // SE
    }

    #[test]
    fn test_most_significant_digit_first() {
        // x = 0b110, y = 0b011
        assert_eq!(quad_key(tile(3, 6, 3)).as_str(), "132");
        assert_eq!(quad_key(tile(2, 3, 2)).as_str(), "31");
    }

    #[test]
    fn test_decode_quad_key() {
        assert_eq!(TileAddress::from_quad_key("132").unwrap(), tile(3, 6, 3));
        assert_eq!(TileAddress::from_quad_key("").unwrap(), tile(0, 0, 0));
        assert!(matches!(
            TileAddress::from_quad_key("0142"),
            Err(SeismapError::InvalidQuadKey(_))
        ));
    }

    #[test]
    fn test_resolve_tile_path() {
        let path = resolve_tile_path(Path::new("maps"), tile(2, 1, 3));
        assert_eq!(path, Path::new("maps/world23.png"));
        let root = resolve_tile_path(Path::new("maps"), tile(0, 0, 0));
        assert_eq!(root, Path::new("maps/world.png"));
    }

    #[test]
    fn test_tile_for_equator_at_zoom_one() {
        let mapper = TileMapper::default();
        let address = mapper.tile_for(GeoCoordinate::new(0.0, 0.0), 1).unwrap();
        assert_eq!(address, tile(1, 1, 1));
    }

    #[test]
    fn test_map_edge_is_clamped() {
        let edge = tile_address_from_pixel(PixelPoint::new(512.0, 512.0), 1, 256);
        assert_eq!(edge, tile(1, 1, 1));
        let negative = tile_address_from_pixel(PixelPoint::new(-1e-9, -3.0), 1, 256);
        assert_eq!(negative, tile(1, 0, 0));
    }

    #[test]
    fn test_invalid_zoom_is_rejected() {
        let mapper = TileMapper::default();
        assert!(matches!(
            mapper.zoom(5),
            Err(SeismapError::InvalidZoomLevel { zoom: 5, max: 4 })
        ));
        assert!(matches!(
            mapper.zoom(-1),
            Err(SeismapError::InvalidZoomLevel { zoom: -1, .. })
        ));
        assert_eq!(mapper.zoom(4).unwrap(), 4);
    }

    #[test]
    fn test_strict_policy_rejects_out_of_range() {
        let strict = TileMapper::new(256, 4, CoordinatePolicy::Strict).unwrap();
        let result = strict.project(GeoCoordinate::new(91.0, 0.0), 2);
        assert!(matches!(result, Err(SeismapError::CoordinateOutOfRange { .. })));

        let lenient = TileMapper::default();
        assert!(lenient.project(GeoCoordinate::new(91.0, 0.0), 2).is_ok());
    }

    #[test]
    fn test_grid_enumerates_level() {
        let mapper = TileMapper::default();
        let tiles: Vec<_> = mapper.grid(2).unwrap().collect();
        assert_eq!(tiles.len(), 16);
        assert_eq!(tiles[0], tile(2, 0, 0));
        assert_eq!(tiles[5], tile(2, 1, 1));
        assert_eq!(tiles[15], tile(2, 3, 3));
    }

    #[test]
    fn test_visible_tiles() {
        let mapper = TileMapper::default();
        let viewport = PixelRect {
            x: 200.0,
            y: -50.0,
            width: 312.0,
            height: 300.0,
        };
        let tiles = mapper.visible_tiles(2, viewport).unwrap();
        assert_eq!(tiles, vec![tile(2, 0, 0), tile(2, 1, 0)]);

        let outside = PixelRect {
            x: 2000.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        assert!(mapper.visible_tiles(2, outside).unwrap().is_empty());
    }

    #[test]
    fn test_viewport_around_coordinate() {
        let mapper = TileMapper::default();
        let tiles = mapper
            .viewport_tiles(GeoCoordinate::new(0.0, 0.0), 2, 300.0, 300.0)
            .unwrap();
        assert_eq!(tiles, vec![tile(2, 1, 1), tile(2, 2, 1), tile(2, 1, 2), tile(2, 2, 2)]);

        let single = mapper
            .viewport_tiles(GeoCoordinate::new(-2.5, 118.0), 2, 40.0, 10.0)
            .unwrap();
        assert_eq!(single, vec![tile(2, 3, 2)]);
    }

    #[test]
    fn test_tile_bounds() {
        let mapper = TileMapper::default();
        let bounds = mapper.bounds(tile(1, 1, 0)).unwrap();
        assert!((bounds.north_west.latitude - projection::MERCATOR_MAX_LAT).abs() < 1e-6);
        assert!(bounds.north_west.longitude.abs() < 1e-9);
        assert!(bounds.south_east.latitude.abs() < 1e-9);
        assert!((bounds.south_east.longitude - 180.0).abs() < 1e-9);

        let deep = TileMapper::new(256, 2, CoordinatePolicy::Clamp).unwrap();
        assert!(deep.bounds(tile(3, 0, 0)).is_err());
    }

    #[test]
    fn test_tile_source_placeholder_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("world1.png"), b"png").unwrap();
        let source = TileSource::new(dir.path());

        let found = source.locate(tile(1, 1, 0));
        assert_eq!(found, TileImage::File { path: dir.path().join("world1.png") });

        let missing = source.locate(tile(1, 0, 1));
        assert!(missing.is_placeholder());
        if let TileImage::Placeholder { width, height, message, .. } = missing {
            assert_eq!((width, height), (512, 256));
            assert!(message.contains("world2.png"));
        }
    }

    proptest! {
        #[test]
        fn prop_quad_key_length_matches_zoom(zoom in 0u8..=12, seed in any::<u32>()) {
            let side = tiles_per_side(zoom);
            let address = tile(zoom, seed % side, seed.rotate_left(7) % side);
            prop_assert_eq!(quad_key(address).len(), usize::from(zoom));
        }

        #[test]
        fn prop_quad_key_round_trips(zoom in 0u8..=16, seed in any::<u32>()) {
            let side = tiles_per_side(zoom);
            let address = tile(zoom, seed % side, seed.rotate_left(13) % side);
            let decoded = TileAddress::from_quad_key(quad_key(address).as_str()).unwrap();
            prop_assert_eq!(decoded, address);
        }

        #[test]
        fn prop_projected_tile_matches_standard_tile_math(
            lat in -85.0f64..85.0,
            lon in -179.9f64..179.9,
            zoom in 0i64..=4,
        ) {
            let mapper = TileMapper::default();
            let address = mapper.tile_for(GeoCoordinate::new(lat, lon), zoom).unwrap();

            let n = 2f64.powi(i32::try_from(zoom).unwrap());
            let col = ((lon + 180.0) / 360.0 * n).floor();
            let lat_rad = lat.to_radians();
            let row = ((1.0 - lat_rad.tan().asinh() / std::f64::consts::PI) / 2.0 * n).floor();
            prop_assert_eq!(f64::from(address.x), col);
            prop_assert_eq!(f64::from(address.y), row);
        }
    }
}
