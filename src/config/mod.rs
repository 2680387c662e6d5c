/// Database configuration and connection management
pub mod database;

/// Process environment (Discord credentials, function name, guild)
pub mod env;

/// Display and message settings loaded from config.toml
pub mod settings;
