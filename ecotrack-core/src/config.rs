//! Environment-driven application configuration.

use std::env::{self, VarError};
use std::fmt;
use std::path::PathBuf;

use crate::model::Coordinate;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TILE_BASE_URL: &str = "https://tile.openstreetmap.org";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Configuration could not be built from the environment.
pub enum ConfigError {
    /// A variable holds a value that does not parse.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar {
        /// Variable name.
        var: String,
        /// Parser message.
        reason: String,
    },
}

/// Runtime settings for the application.
#[derive(Clone)]
pub struct AppConfig {
    /// Gemini API key; assistants are unavailable without it.
    pub gemini_api_key: Option<String>,
    /// Gemini model name.
    pub gemini_model: String,
    /// Gemini API origin.
    pub gemini_base_url: String,
    /// Slippy-map tile server origin.
    pub tile_base_url: String,
    /// Timeout applied to every HTTP request.
    pub http_timeout_secs: u64,
    /// Where the map opens.
    pub home: Coordinate,
    /// `tracing` filter directive.
    pub log_level: String,
    /// File receiving log output.
    pub log_path: PathBuf,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppConfig")
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("tile_base_url", &self.tile_base_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("home", &self.home)
            .field("log_level", &self.log_level)
            .field("log_path", &self.log_path)
            .finish()
    }
}

/// Load configuration, reading a `.env` file first when present.
///
/// # Errors
///
/// Returns [`ConfigError`] when a variable holds an unparsable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load configuration from the process environment only.
///
/// # Errors
///
/// Returns [`ConfigError`] when a variable holds an unparsable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| env::var(key))
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_owned())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_owned(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|err| invalid(var, err.to_string()))
    };

    let parse_degrees = |var: &str, default: &str, limit: f64| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .trim()
            .parse::<f64>()
            .map_err(|err| invalid(var, err.to_string()))?;
        if value.is_finite() && value.abs() <= limit {
            Ok(value)
        } else {
            Err(invalid(var, format!("must be within ±{limit}")))
        }
    };

    let gemini_api_key = lookup("ECOTRACK_GEMINI_API_KEY")
        .ok()
        .map(|key| key.trim().to_owned())
        .filter(|key| !key.is_empty());

    Ok(AppConfig {
        gemini_api_key,
        gemini_model: or_default("ECOTRACK_GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
        gemini_base_url: or_default("ECOTRACK_GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
        tile_base_url: or_default("ECOTRACK_TILE_BASE_URL", DEFAULT_TILE_BASE_URL),
        http_timeout_secs: parse_u64("ECOTRACK_HTTP_TIMEOUT_SECS", "30")?,
        home: Coordinate::new(
            parse_degrees("ECOTRACK_HOME_LAT", "34.052", 90.0)?,
            parse_degrees("ECOTRACK_HOME_LNG", "-118.243", 180.0)?,
        ),
        log_level: or_default("ECOTRACK_LOG_LEVEL", "info"),
        log_path: PathBuf::from(or_default("ECOTRACK_LOG_PATH", "ecotrack.log")),
    })
}
