// Configuration for the positional audio plugin
//
// Every setting defaults to the built-in constant, so a host that never
// loads a file gets the stock behaviour.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::constants::{
    FACTORIO_EXE, POSITION_FILE_NAME, SCRIPT_OUTPUT_DIR, SEPARATION_BOUND, STALE_AFTER,
    SURFACE_SPACING,
};
use crate::core::record::RecordGrammar;
use crate::core::session::SessionConfig;

// =============================================================================
// CONFIGURATION STRUCTURES
// =============================================================================

/// Where the position file lives and how old it may get
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Absolute path of the position file. None = the mod's default location.
    #[serde(default)]
    pub position_file: Option<PathBuf>,

    /// Seconds after the last write before the file is considered stale
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

fn default_stale_after_secs() -> u64 {
    STALE_AFTER.as_secs()
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            position_file: None,
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

/// How the running game is recognised
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    #[serde(default = "default_process_names")]
    pub process_names: Vec<String>,
}

fn default_process_names() -> Vec<String> {
    vec![FACTORIO_EXE.to_string()]
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            process_names: default_process_names(),
        }
    }
}

/// Surface separation in host space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinateSettings {
    #[serde(default = "default_surface_spacing")]
    pub surface_spacing: f32,

    /// Height above which a warning is logged that surfaces may overlap
    #[serde(default = "default_separation_bound")]
    pub separation_bound: f32,
}

fn default_surface_spacing() -> f32 {
    SURFACE_SPACING
}
fn default_separation_bound() -> f32 {
    SEPARATION_BOUND
}

impl Default for CoordinateSettings {
    fn default() -> Self {
        Self {
            surface_spacing: default_surface_spacing(),
            separation_bound: default_separation_bound(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingSettings {
    /// Mirror diagnostics to stdout
    #[serde(default)]
    pub console: bool,
    /// Diagnostics log file. None = no file logging.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PluginConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub game: GameSettings,
    #[serde(default)]
    pub grammar: RecordGrammar,
    #[serde(default)]
    pub coordinates: CoordinateSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

// =============================================================================
// CONFIG LOADING
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine the position file path")]
    PathError,
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default position file: `<config dir>/Factorio/script-output/<file>`
///
/// The config dir is `%APPDATA%` on Windows.
pub fn default_position_file() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.extend(SCRIPT_OUTPUT_DIR);
    path.push(POSITION_FILE_NAME);
    Some(path)
}

impl PluginConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: PluginConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, falling back to defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "[config] No config file found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "[config] Loaded config");
        Ok(config)
    }

    /// Reject settings that would break the record grammar or surface separation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grammar = &self.grammar;
        if grammar.delimiter == grammar.separator {
            return Err(ConfigError::Invalid(
                "grammar delimiter and separator must differ".to_string(),
            ));
        }
        if grammar.delimiter == '"' || grammar.separator == '"' {
            return Err(ConfigError::Invalid(
                "'\"' is reserved for quoted strings".to_string(),
            ));
        }
        if self.game.process_names.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one process name is required".to_string(),
            ));
        }
        if self.source.stale_after_secs == 0 {
            return Err(ConfigError::Invalid(
                "stale_after_secs must be positive".to_string(),
            ));
        }

        let coords = &self.coordinates;
        if !(coords.separation_bound > 0.0 && coords.surface_spacing >= 2.0 * coords.separation_bound)
        {
            return Err(ConfigError::Invalid(format!(
                "surface_spacing ({}) must be at least twice separation_bound ({})",
                coords.surface_spacing, coords.separation_bound
            )));
        }
        Ok(())
    }

    /// Position file path, resolving the default location if unset
    pub fn position_file(&self) -> Result<PathBuf, ConfigError> {
        match &self.source.position_file {
            Some(path) => Ok(path.clone()),
            None => default_position_file().ok_or(ConfigError::PathError),
        }
    }

    /// Policy settings for a `PositionalSession`
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            stale_after: Duration::from_secs(self.source.stale_after_secs),
            process_names: self.game.process_names.clone(),
            grammar: self.grammar,
            surface_spacing: self.coordinates.surface_spacing,
            separation_bound: self.coordinates.separation_bound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_constants() {
        let config = PluginConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session_config(), SessionConfig::default());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = PluginConfig::from_toml_str("").unwrap();
        assert_eq!(config.source.stale_after_secs, 4);
        assert_eq!(config.game.process_names, vec!["factorio.exe".to_string()]);
        assert_eq!(config.grammar, RecordGrammar::default());
    }

    #[test]
    fn test_partial_overrides() {
        let config = PluginConfig::from_toml_str(
            r#"
            [source]
            position_file = "/tmp/pos.txt"
            stale_after_secs = 10

            [game]
            process_names = ["factorio", "factorio.exe"]

            [grammar]
            delimiter = ";"
            "#,
        )
        .unwrap();

        assert_eq!(config.position_file().unwrap(), PathBuf::from("/tmp/pos.txt"));
        let session = config.session_config();
        assert_eq!(session.stale_after, Duration::from_secs(10));
        assert_eq!(session.process_names.len(), 2);
        assert_eq!(session.grammar.delimiter, ';');
        assert_eq!(session.grammar.separator, '=');
        assert_eq!(session.surface_spacing, 1000.0);
    }

    #[test]
    fn test_invalid_grammar_rejected() {
        let err = PluginConfig::from_toml_str("[grammar]\ndelimiter = \"=\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_overlapping_surfaces_rejected() {
        let err = PluginConfig::from_toml_str("[coordinates]\nsurface_spacing = 600.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = PluginConfig::from_toml_str("[source]\nstale_after_secs = \"soon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = PluginConfig::load(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config.source.stale_after_secs, 4);
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("factorio_pa.toml");
        fs::write(&path, "[logging]\nconsole = true\n").unwrap();

        let config = PluginConfig::load(&path).unwrap();
        assert!(config.logging.console);
        assert!(config.logging.log_file.is_none());
    }

    #[test]
    fn test_default_position_file_location() {
        if let Some(path) = default_position_file() {
            assert!(path.ends_with("Factorio/script-output/mumble_positional-audio_information.txt"));
        }
    }
}
