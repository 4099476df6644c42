//! Runtime configuration for the load profile estimator.
//!
//! Values come from the environment, with optional `.env` support provided
//! by the caller. Every setting has a default so a checkout with the usual
//! `data/`, `template_load_profiles/` and `outputs/` folders runs as-is.
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// Read an optional environment variable, falling back to a default.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the lookup tables and base manufacturing profile.
    pub data_dir: PathBuf,

    /// Directory of DOE prototype profiles, one folder per weather station.
    pub profile_dir: PathBuf,

    /// Directory results are written to.
    pub output_dir: PathBuf,

    pub log_level: String,
}

/// Load configuration from environment variables with defaults.
///
/// - `LOADSHAPE_DATA_DIR` (default: `data`)
/// - `LOADSHAPE_PROFILE_DIR` (default: `template_load_profiles`)
/// - `LOADSHAPE_OUTPUT_DIR` (default: `outputs`)
/// - `LOADSHAPE_LOG_LEVEL` (default: `info`)
pub fn load_from_env() -> Result<Config> {
    let data_dir = PathBuf::from(env_or!("LOADSHAPE_DATA_DIR", "data"));
    let profile_dir = PathBuf::from(env_or!("LOADSHAPE_PROFILE_DIR", "template_load_profiles"));
    let output_dir = PathBuf::from(env_or!("LOADSHAPE_OUTPUT_DIR", "outputs"));
    let log_level = parse_log_level(&env_or!("LOADSHAPE_LOG_LEVEL", "info"))?;

    Ok(Config {
        data_dir,
        profile_dir,
        output_dir,
        log_level,
    })
}

pub fn parse_log_level(raw: &str) -> Result<String> {
    let level = raw.trim().to_ascii_lowercase();
    if LOG_LEVELS.contains(&level.as_str()) {
        Ok(level)
    } else {
        Err(anyhow!("Invalid LOADSHAPE_LOG_LEVEL: {raw}"))
    }
}

impl Config {
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  LOADSHAPE_DATA_DIR    : {}", self.data_dir.display());
        tracing::info!("  LOADSHAPE_PROFILE_DIR : {}", self.profile_dir.display());
        tracing::info!("  LOADSHAPE_OUTPUT_DIR  : {}", self.output_dir.display());
        tracing::info!("  LOADSHAPE_LOG_LEVEL   : {}", self.log_level);
    }
}
