//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.companion/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! The edition here is only the fallback for a fresh install; once the user
//! picks one it lives in the preference store.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::content::providers::{alquran_cloud, muslim_salat};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CompanionConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub alquran: AlQuranConfig,
    #[serde(default)]
    pub muslimsalat: MuslimSalatConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_edition: Option<String>,
    pub default_location: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub preferences_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AlQuranConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MuslimSalatConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LOCATION: &str = "jakarta";

// ============================================================================
// Resolved Config (concrete values, no Options except secrets)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub default_edition: Option<String>,
    pub location: String,
    pub request_timeout: Duration,
    pub preferences_path: Option<PathBuf>,
    pub alquran_base_url: String,
    pub muslimsalat_api_key: Option<String>,
    pub muslimsalat_base_url: String,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.companion/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".companion"))
}

/// Returns the path to `~/.companion/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.companion/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `CompanionConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<CompanionConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(CompanionConfig::default());
        }
    };
    load_config_from(&path)
}

/// Load config from an explicit path, generating a default file if missing.
pub fn load_config_from(path: &Path) -> Result<CompanionConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(CompanionConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: CompanionConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG_CONTENT: &str = r#"# Companion Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults -> this file -> env vars -> CLI flags.

# [general]
# default_edition = "quran-simple"     # Used until an edition is picked with `companion edition`
# default_location = "jakarta"         # City or address for prayer times
# request_timeout_secs = 15
# preferences_file = "preferences.json" # Path relative to ~/.companion/

# [alquran]
# base_url = "https://api.alquran.cloud/v1"

# [muslimsalat]
# api_key = "..."                      # Or set MUSLIMSALAT_API_KEY env var
# base_url = "https://muslimsalat.com"
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_CONTENT) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Overrides supplied on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides<'a> {
    pub location: Option<&'a str>,
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &CompanionConfig, cli: &CliOverrides<'_>) -> ResolvedConfig {
    // Edition seed for an unset store: env → config (None = Edition::default())
    let default_edition = std::env::var("COMPANION_EDITION")
        .ok()
        .or_else(|| config.general.default_edition.clone());

    // Location: CLI → env → config → default
    let location = cli
        .location
        .map(|s| s.to_string())
        .or_else(|| std::env::var("COMPANION_LOCATION").ok())
        .or_else(|| config.general.default_location.clone())
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

    // alquran.cloud base URL: env → config → default
    let alquran_base_url = std::env::var("ALQURAN_BASE_URL")
        .ok()
        .or_else(|| config.alquran.base_url.clone())
        .unwrap_or_else(|| alquran_cloud::DEFAULT_BASE_URL.to_string());

    // muslimsalat.com API key: env → config
    let muslimsalat_api_key = std::env::var("MUSLIMSALAT_API_KEY")
        .ok()
        .or_else(|| config.muslimsalat.api_key.clone());

    // muslimsalat.com base URL: env → config → default
    let muslimsalat_base_url = std::env::var("MUSLIMSALAT_BASE_URL")
        .ok()
        .or_else(|| config.muslimsalat.base_url.clone())
        .unwrap_or_else(|| muslim_salat::DEFAULT_BASE_URL.to_string());

    ResolvedConfig {
        default_edition,
        location,
        request_timeout: Duration::from_secs(
            config
                .general
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
        preferences_path: resolve_preferences_path(config),
        alquran_base_url,
        muslimsalat_api_key,
        muslimsalat_base_url,
    }
}

/// Relative `preferences_file` entries are taken relative to `~/.companion/`.
fn resolve_preferences_path(config: &CompanionConfig) -> Option<PathBuf> {
    match config.general.preferences_file {
        Some(ref file) => {
            let file = PathBuf::from(file);
            if file.is_absolute() {
                Some(file)
            } else {
                config_dir().map(|d| d.join(file))
            }
        }
        None => crate::core::preferences::default_path(),
    }
}
