//! Configuration system
//!
//! Configuration types are plain serde structs; the [`Config`] trait adds file
//! loading and saving in TOML or RON, picked by file extension.

pub mod bake_config;

pub use bake_config::{BakeConfiguration, TileSize, MIN_TILE_SIZE, MAX_TILE_SIZE};
pub use serde::{Serialize, Deserialize};

use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        match extension_of(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension_of(path) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(file: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("impostor_config_{}_{}", std::process::id(), file))
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let path = scratch_path("partial.ron");
        std::fs::write(&path, "(tile_width: 64)").unwrap();
        let loaded = BakeConfiguration::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.tile_width, 64);
        assert_eq!(loaded.tile_height, BakeConfiguration::default().tile_height);
        assert!(loaded.pack_assets);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let path = scratch_path("bake.yaml");
        std::fs::write(&path, "tile_width: 64").unwrap();
        let result = BakeConfiguration::load_from_file(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
