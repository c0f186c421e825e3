//! Engine configuration.
//!
//! Everything here has a default, so a config file only needs the fields it
//! changes:
//!
//! ```json
//! {
//!   "temp_arena_size": 4194304,
//!   "tilemap": { "width": 64, "height": 64 }
//! }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::tilemap::TilemapConfig;

/// Errors that can occur while loading an [`EngineConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The contents are not a valid config.
    Parse(serde_json::Error),
    /// The config parsed but a value is unusable.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config read failed: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse failed: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Sizes and dimensions fixed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bytes in the permanent arena (assets, level data).
    pub perm_arena_size: usize,
    /// Bytes in the per-frame arena (colliders, scratch buffers).
    pub temp_arena_size: usize,
    /// Quads per render batch.
    pub batch_slot_count: usize,
    pub tilemap: TilemapConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            perm_arena_size: 1 << 20,
            temp_arena_size: 1 << 20,
            batch_slot_count: 2048,
            tilemap: TilemapConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            log::error!("Failed to read config '{}': {e}", path.display());
            ConfigError::Io(e)
        })?;

        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from '{}'", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject values the subsystems would assert on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.perm_arena_size == 0 || self.temp_arena_size == 0 {
            return Err(ConfigError::Invalid("arena sizes must be positive".into()));
        }
        if self.batch_slot_count == 0 {
            return Err(ConfigError::Invalid("batch_slot_count must be positive".into()));
        }

        let t = &self.tilemap;
        if t.width <= 0 || t.height <= 0 || t.chunk_width <= 0 || t.chunk_height <= 0 {
            return Err(ConfigError::Invalid("tilemap dimensions must be positive".into()));
        }
        if t.width % t.chunk_width != 0 || t.height % t.chunk_height != 0 {
            return Err(ConfigError::Invalid(format!(
                "tilemap {}x{} is not a multiple of chunk {}x{}",
                t.width, t.height, t.chunk_width, t.chunk_height
            )));
        }
        if t.tile_size.is_nan() || t.tile_size <= 0.0 {
            return Err(ConfigError::Invalid("tile_size must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.batch_slot_count, 2048);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "temp_arena_size": 4096, "tilemap": { "width": 64 } }"#).unwrap();
        assert_eq!(config.temp_arena_size, 4096);
        assert_eq!(config.perm_arena_size, EngineConfig::default().perm_arena_size);
        assert_eq!(config.tilemap.width, 64);
        assert_eq!(config.tilemap.height, 128);
        assert_eq!(config.tilemap.tile_size, 16.0);
    }

    #[test]
    fn json_roundtrip() {
        let mut config = EngineConfig::default();
        config.batch_slot_count = 64;
        let back = EngineConfig::from_json_str(&config.to_json_string()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn uneven_chunks_are_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "tilemap": { "width": 100 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
        assert!(err.to_string().contains("100x128"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::from_file("no/such/ormr.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
