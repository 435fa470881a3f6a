//! Configuration module for loading environment variables and settings.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Model used when GEMINI_IMAGE_MODEL is not set.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key (required)
    pub api_key: String,
    /// Directory where generated images are written (required, absolute)
    pub output_dir: PathBuf,
    /// Gemini model identifier
    pub model: String,
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingEnvVar` if GEMINI_API_KEY or OUTPUT_DIR is
    /// not set, and `ConfigError::InvalidValue` if either is set but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup function.
    ///
    /// `from_env` passes `std::env::var`; tests pass a closure over a map so
    /// startup failure modes are covered without mutating process environment.
    /// The lookup also resolves `HOME` for `~` expansion of OUTPUT_DIR.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = required(&lookup, "GEMINI_API_KEY")?;

        let raw_dir = required(&lookup, "OUTPUT_DIR")?;
        let output_dir = resolve_output_dir(&raw_dir, &lookup)?;

        let model = lookup("GEMINI_IMAGE_MODEL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());

        Ok(Self {
            api_key,
            output_dir,
            model,
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, ConfigError> {
    match lookup(name) {
        None => Err(ConfigError::missing_env_var(name)),
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::invalid_value(name, "value is empty"))
        }
        Some(value) => Ok(value),
    }
}

/// Expand a leading `~` against HOME and make the path absolute, so every
/// artifact path returned to clients is absolute regardless of where the
/// server process was started.
fn resolve_output_dir(
    raw: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<PathBuf, ConfigError> {
    let expanded = expand_home(raw.trim(), lookup);
    std::path::absolute(&expanded)
        .map_err(|e| ConfigError::invalid_value("OUTPUT_DIR", e.to_string()))
}

fn expand_home(raw: &str, lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if raw == "~" {
        if let Some(home) = lookup("HOME") {
            return PathBuf::from(home);
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = lookup("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(raw)
}
