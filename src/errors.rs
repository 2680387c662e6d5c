//! Unified error types for `lor-buddy`.
//!
//! Transport failures (acknowledge, reinvoke, deliver) end the current
//! invocation. Query-stage failures are absorbed by the dispatcher and turned
//! into a user-facing notice.

use thiserror::Error;

/// Every failure the bot can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// Card/term store failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Discord REST or gateway failure
    #[error("Discord error: {0}")]
    Discord(Box<poise::serenity_prelude::Error>),

    /// The asynchronous self-invocation could not be submitted
    #[error("Reinvocation was not accepted: {message}")]
    Reinvoke {
        /// Reason reported by the execution substrate
        message: String,
    },

    /// Inbound event is not signed by Discord
    #[error("Invalid request signature: {message}")]
    InvalidSignature {
        /// Why verification failed
        message: String,
    },

    /// Inbound event could not be decoded into an interaction
    #[error("Malformed interaction envelope: {message}")]
    MalformedEnvelope {
        /// Decoding failure detail
        message: String,
    },

    /// No command table is registered under this name
    #[error("Unknown command '{name}'")]
    UnknownCommand {
        /// Command name as sent by Discord
        name: String,
    },

    /// An option value does not fit its filter (e.g. text for a numeric filter)
    #[error("Invalid value '{value}' for option '{option}'")]
    InvalidOption {
        /// Option name
        option: String,
        /// Raw value as submitted
        value: String,
    },

    /// A predicate names an attribute the target store does not have
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// Which predicate was rejected
        message: String,
    },

    /// `acknowledge` was already attempted for this interaction
    #[error("Interaction {request_id} was already acknowledged")]
    AlreadyAcknowledged {
        /// Interaction id
        request_id: String,
    },

    /// `deliver_result` was already attempted for this interaction
    #[error("Interaction {request_id} already received its follow-up")]
    AlreadyDelivered {
        /// Interaction id
        request_id: String,
    },

    /// JSON encoding/decoding failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Discord(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
