//! Application configuration.
//!
//! Read from an optional JSON file; missing fields take their defaults and
//! command-line flags override the result.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::errors::SeismapError;
use crate::theme::Theme;
use crate::tiles::{CoordinatePolicy, DEFAULT_TILE_SIZE, MAX_SUPPORTED_ZOOM, TileMapper, TileSource};

/// Default directory holding `world*.png` tiles.
pub const DEFAULT_MAP_DIRECTORY: &str = "maps";

/// Default highest zoom level of the tile set.
pub const DEFAULT_MAX_ZOOM: u8 = 4;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub map_directory: PathBuf,
    pub tile_size: u32,
    pub max_zoom: u8,
    pub theme: Theme,
    pub coordinates: CoordinatePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            map_directory: PathBuf::from(DEFAULT_MAP_DIRECTORY),
            tile_size: DEFAULT_TILE_SIZE,
            max_zoom: DEFAULT_MAX_ZOOM,
            theme: Theme::default(),
            coordinates: CoordinatePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails validation.
    pub fn load(path: &Path) -> Result<Self, SeismapError> {
        let text = fs::read_to_string(path).map_err(|source| SeismapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns a `Config` error for a zero tile size or unsupported max zoom.
    pub fn validate(&self) -> Result<(), SeismapError> {
        if self.tile_size == 0 {
            return Err(SeismapError::Config("tile_size must be positive".into()));
        }
        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(SeismapError::Config(format!(
                "max_zoom {} exceeds supported maximum {MAX_SUPPORTED_ZOOM}",
                self.max_zoom
            )));
        }
        Ok(())
    }

    /// Mapper for the configured tile set.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn mapper(&self) -> Result<TileMapper, SeismapError> {
        TileMapper::new(self.tile_size, self.max_zoom, self.coordinates)
    }

    #[must_use]
    pub fn tile_source(&self) -> TileSource {
        TileSource::new(&self.map_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_zoom": 3, "theme": "light-transparent"}}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.max_zoom, 3);
        assert_eq!(config.theme, Theme::LightTransparent);
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.map_directory, PathBuf::from("maps"));
        assert_eq!(config.coordinates, CoordinatePolicy::Clamp);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let config = AppConfig {
            tile_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SeismapError::Config(_))));

        let config = AppConfig {
            max_zoom: 31,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"zoom_max": 3}}"#).unwrap();
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(SeismapError::Parse(_))
        ));
    }

    #[test]
    fn test_strict_mapper() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"coordinates": "strict"}}"#).unwrap();
        let mapper = AppConfig::load(file.path()).unwrap().mapper().unwrap();
        assert_eq!(mapper.policy(), CoordinatePolicy::Strict);
        assert_eq!(mapper.max_zoom(), DEFAULT_MAX_ZOOM);
    }
}
