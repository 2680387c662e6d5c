//! Display and message settings loaded from config.toml
//!
//! Every field has a default, so a missing file or a partial file is valid.
//! The Lambda bundle usually ships without one.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Discord accepts at most this many embeds per message.
pub const MAX_EMBEDS_PER_MESSAGE: usize = 10;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// How search results are laid out
    pub display: DisplaySettings,
    /// User-facing notice texts
    pub messages: Messages,
}

/// Result layout settings
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DisplaySettings {
    /// Number of cards shown as full image embeds; the rest are only counted
    pub max_full_results: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            max_full_results: 4,
        }
    }
}

/// Notice texts sent instead of results
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Messages {
    /// Card search matched nothing
    pub no_results: String,
    /// Glossary lookup matched nothing
    pub unknown_term: String,
    /// Any failure while running the query
    pub error: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            no_results: "No results found".to_string(),
            unknown_term: "Unknown term".to_string(),
            error: "Error processing request".to_string(),
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {:?}: {e}", path.as_ref()),
    })?;

    parse_config(&contents)
}

/// Parses settings from TOML text
pub fn parse_config(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    let shown = settings.display.max_full_results;
    if !(1..=MAX_EMBEDS_PER_MESSAGE).contains(&shown) {
        return Err(Error::Config {
            message: format!(
                "display.max_full_results must be 1..={MAX_EMBEDS_PER_MESSAGE}, got {shown}"
            ),
        });
    }
    Ok(settings)
}

/// Loads settings from `path`, falling back to defaults when the file does not exist.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Settings> {
    if path.as_ref().exists() {
        load_config(path)
    } else {
        tracing::info!(
            "No settings file at {:?}, using defaults",
            path.as_ref()
        );
        Ok(Settings::default())
    }
}
