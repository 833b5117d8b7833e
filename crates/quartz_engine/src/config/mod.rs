//! Configuration loading and saving
//!
//! Any `Serialize + Deserialize + Default` type picks up file persistence
//! by implementing the [`Config`] marker trait. The on-disk format is
//! chosen by extension: `.toml` for user-facing settings, `.ron` for
//! structured data such as level files.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// File-backed configuration type
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match extension(path) {
            Some("toml") => {
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load from a file, falling back to defaults when the file is absent
    ///
    /// Parse errors still fail: a present but broken file should be fixed,
    /// not silently ignored.
    fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents did not parse
    #[error("Parse error: {0}")]
    Parse(String),

    /// Value could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// File extension is not a supported format
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
    struct SampleConfig {
        name: String,
        speed: f32,
    }

    impl Config for SampleConfig {}

    #[test]
    fn test_toml_round_trip() {
        let dir = std::env::temp_dir().join("quartz_config_toml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.toml");

        let config = SampleConfig {
            name: "arena".to_string(),
            speed: 12.5,
        };
        config.save_to_file(&path).unwrap();
        let loaded = SampleConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded, config);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_ron_round_trip() {
        let dir = std::env::temp_dir().join("quartz_config_ron");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.ron");

        let config = SampleConfig {
            name: "dome".to_string(),
            speed: -3.0,
        };
        config.save_to_file(&path).unwrap();
        let loaded = SampleConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded, config);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = std::env::temp_dir().join("quartz_config_yaml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.yaml");
        std::fs::write(&path, "name: arena").unwrap();

        let result = SampleConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));

        let save = SampleConfig::default().save_to_file(&path);
        assert!(matches!(save, Err(ConfigError::UnsupportedFormat(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let loaded =
            SampleConfig::load_or_default("/nonexistent/quartz/sample.toml").unwrap();
        assert_eq!(loaded, SampleConfig::default());
    }
}
