//! Process configuration.
//!
//! # Responsibility
//! - Load runtime settings from `CADENCE_*` environment variables.
//! - Keep configuration an explicit value passed into handlers, not a
//!   process-global singleton.
//!
//! # Invariants
//! - Every setting has a usable default; loading never panics.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ENV_DB_PATH: &str = "CADENCE_DB_PATH";
const ENV_TIMEZONE: &str = "CADENCE_TIMEZONE";
const ENV_LOG_DIR: &str = "CADENCE_LOG_DIR";
const ENV_LOG_LEVEL: &str = "CADENCE_LOG_LEVEL";

const DEFAULT_DB_PATH: &str = "cadence.db";
const DEFAULT_TIMEZONE: &str = "Europe/Moscow";

/// Runtime settings resolved once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: String,
    /// IANA timezone name; the transport layer resolves "today" with it
    /// before calling the date-only core.
    pub timezone: String,
    /// Absolute log directory. `None` leaves file logging disabled.
    pub log_dir: Option<String>,
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    /// Environment variable is set but not valid unicode.
    InvalidValue(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue(name) => write!(f, "environment variable {name} is not valid unicode"),
        }
    }
}

impl Error for ConfigError {}

/// Loads settings from the environment, filling defaults for anything
/// unset.
pub fn load_settings() -> Result<Settings, ConfigError> {
    Ok(Settings {
        db_path: read_var(ENV_DB_PATH)?.unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
        timezone: read_var(ENV_TIMEZONE)?.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
        log_dir: read_var(ENV_LOG_DIR)?,
        log_level: read_var(ENV_LOG_LEVEL)?
            .unwrap_or_else(|| crate::logging::default_log_level().to_string()),
    })
}

fn read_var(name: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_DB_PATH, DEFAULT_TIMEZONE};

    #[test]
    fn defaults_are_sane() {
        assert!(DEFAULT_DB_PATH.ends_with(".db"));
        assert!(DEFAULT_TIMEZONE.contains('/'));
    }
}
