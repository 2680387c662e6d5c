//! Process environment for both binaries.
//!
//! Values come from the real environment, optionally seeded from a `.env`
//! file by `dotenvy` in `main`. Secrets are never written to the settings file.

use crate::config::database;
use crate::errors::{Error, Result};
use std::path::PathBuf;

/// Environment-derived configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Discord application id, needed for follow-up webhooks
    pub application_id: u64,
    /// Bot token; optional for the Lambda, required by the gateway bot
    pub bot_token: Option<String>,
    /// SeaORM connection string for the card database
    pub database_url: String,
    /// Hex-encoded application public key for request signatures
    pub public_key: Option<String>,
    /// Name of the running Lambda function, target of the self-invocation
    pub function_name: Option<String>,
    /// Restrict gateway command registration to one guild
    pub guild_id: Option<u64>,
    /// Path of the TOML settings file
    pub settings_path: PathBuf,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `Error::Config` if `DISCORD_APP_ID` is missing or if an id
    /// variable is not a valid snowflake.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let application_id = lookup("DISCORD_APP_ID")
            .ok_or_else(|| Error::Config {
                message: "DISCORD_APP_ID must be set".to_string(),
            })
            .and_then(|raw| parse_snowflake("DISCORD_APP_ID", &raw))?;

        let guild_id = lookup("DISCORD_GUILD_ID")
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_snowflake("DISCORD_GUILD_ID", &raw))
            .transpose()?;

        Ok(Self {
            application_id,
            bot_token: lookup("DISCORD_BOT_TOKEN").filter(|t| !t.is_empty()),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| database::DEFAULT_DATABASE_URL.to_string()),
            public_key: lookup("DISCORD_PUBLIC_KEY").filter(|k| !k.trim().is_empty()),
            function_name: lookup("AWS_LAMBDA_FUNCTION_NAME"),
            guild_id,
            settings_path: lookup("LOR_BUDDY_CONFIG")
                .map_or_else(|| PathBuf::from("config.toml"), PathBuf::from),
        })
    }

    /// Returns the function name or a configuration error.
    pub fn require_function_name(&self) -> Result<&str> {
        self.function_name.as_deref().ok_or_else(|| Error::Config {
            message: "AWS_LAMBDA_FUNCTION_NAME must be set for self-invocation".to_string(),
        })
    }

    /// Returns the public key or a configuration error.
    pub fn require_public_key(&self) -> Result<&str> {
        self.public_key.as_deref().ok_or_else(|| Error::Config {
            message: "DISCORD_PUBLIC_KEY must be set to verify interactions".to_string(),
        })
    }

    /// Returns the bot token or a configuration error.
    pub fn require_bot_token(&self) -> Result<&str> {
        self.bot_token.as_deref().ok_or_else(|| Error::Config {
            message: "DISCORD_BOT_TOKEN must be set".to_string(),
        })
    }
}

fn parse_snowflake(key: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|e| Error::Config {
        message: format!("{key} is not a valid Discord id ({raw}): {e}"),
    })
}
