//! TOML configuration for the `student_map` binary.
//!
//! Every section is optional; anything left out falls back to the
//! built-in defaults (the Cincinnati input files under `data/`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use student_map_dataset::{DataConfig, MapConfig};
use student_map_geocoder::GeocoderConfig;
use student_map_server::ServerConfig;
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "STUDENT_MAP_CONFIG";

/// Config file read from the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "student_map.toml";

/// Errors that can occur while reading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid config TOML.
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Everything the binary can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Input files.
    pub data: DataConfig,
    /// Address lookup.
    pub geocoder: GeocoderConfig,
    /// Map defaults.
    pub map: MapConfig,
    /// HTTP listener.
    pub server: ServerConfig,
}

impl AppConfig {
    /// Parses a config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads the config named on the command line, else by
    /// [`CONFIG_ENV`], else [`DEFAULT_CONFIG_FILE`] if it exists, else
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the chosen file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let fallback = Path::new(DEFAULT_CONFIG_FILE);

        match config_path(explicit, env, fallback.exists().then_some(fallback)) {
            Some(path) => {
                log::info!("Reading config from {}", path.display());
                Self::from_path(&path)
            }
            None => {
                log::info!("No config file; using defaults");
                Ok(Self::default())
            }
        }
    }
}

fn config_path(
    explicit: Option<&Path>,
    env: Option<PathBuf>,
    fallback: Option<&Path>,
) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or(env)
        .or_else(|| fallback.map(Path::to_path_buf))
}

#[cfg(test)]
mod tests {
    use student_map_dataset::DEFAULT_CENTER;

    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn defaults_match_cincinnati_inputs() {
        let config = AppConfig::default();
        assert_eq!(config.map.default_center, DEFAULT_CENTER);
        assert_eq!(config.map.default_radius_miles, 3);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.geocoder.user_agent, "student_mapper");
        assert_eq!(config.data.demographics.under_18.key_column, "GeoID");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [data.geometry]
            path = "tracts/hamilton.geojson"
            source_crs = "EPSG:3735"

            [data.demographics.white]
            path = "white.csv"
            value_column = "White %"

            [geocoder]
            timeout_ms = 500

            [map]
            default_radius_miles = 5

            [server]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(
            config.data.geometry.path,
            PathBuf::from("tracts/hamilton.geojson")
        );
        assert_eq!(config.data.geometry.id_field, "GEOID");
        assert_eq!(config.data.geometry.source_crs.as_deref(), Some("EPSG:3735"));
        assert_eq!(config.data.demographics.white.value_column, "White %");
        assert_eq!(config.data.demographics.white.key_column, "GeoID");
        assert_eq!(config.geocoder.timeout_ms, 500);
        assert_eq!(config.map.default_radius_miles, 5);
        assert_eq!(config.map.default_center, DEFAULT_CENTER);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(matches!(
            AppConfig::from_toml_str("[server]\nport = \"eighty\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            AppConfig::from_path(Path::new("/definitely/not/here.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = std::env::temp_dir().join("student_map_cli_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("student_map.toml");
        std::fs::write(&path, "[map]\ndefault_radius_miles = 7\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.map.default_radius_miles, 7);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn explicit_path_wins_over_environment_and_fallback() {
        let explicit = Path::new("explicit.toml");
        let fallback = Path::new("student_map.toml");

        assert_eq!(
            config_path(
                Some(explicit),
                Some(PathBuf::from("env.toml")),
                Some(fallback)
            ),
            Some(PathBuf::from("explicit.toml"))
        );
        assert_eq!(
            config_path(None, Some(PathBuf::from("env.toml")), Some(fallback)),
            Some(PathBuf::from("env.toml"))
        );
        assert_eq!(
            config_path(None, None, Some(fallback)),
            Some(PathBuf::from("student_map.toml"))
        );
        assert_eq!(config_path(None, None, None), None);
    }
}
