//! Interaction envelope - the inbound event plus its phase marker.
//!
//! The two invocations of one command share no memory, so the envelope is the
//! only carrier of phase state: the redelivered copy is the original gateway
//! event with one extra header. Everything else, including the body string,
//! is forwarded untouched.

use crate::errors::{Error, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Header injected into the forwarded event to mark the redelivery phase.
///
/// Uppercase on purpose: the HTTP gateway lowercases client header names, so
/// only a self-invocation can carry this exact key.
pub const REDELIVERY_HEADER: &str = "I_DEFERRED_THIS";

/// Discord interaction type for endpoint verification pings.
const INTERACTION_PING: u8 = 1;
/// Discord interaction type for slash commands.
const INTERACTION_APPLICATION_COMMAND: u8 = 2;

/// HTTP gateway event as delivered by API Gateway v2 or a function URL.
///
/// Only the fields the protocol reads are typed; the rest is kept verbatim so
/// the event can be forwarded to the self-invocation without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    /// Request headers (lowercased by the gateway)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Request body exactly as received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Whether `body` is base64 encoded
    #[serde(default)]
    pub is_base64_encoded: bool,
    /// Every other field of the event, preserved for forwarding
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GatewayEvent {
    /// Wraps a plain-text body in an otherwise empty event.
    #[must_use]
    pub fn from_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    /// Whether the redelivery marker header is present and true.
    ///
    /// The key is matched exactly; a lowercased copy sent by a client does
    /// not count.
    #[must_use]
    pub fn is_redelivery(&self) -> bool {
        self.headers
            .get(REDELIVERY_HEADER)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn decoded_body(&self) -> Result<String> {
        let raw = self.body.as_deref().ok_or_else(|| Error::MalformedEnvelope {
            message: "event has no body".to_string(),
        })?;

        if !self.is_base64_encoded {
            return Ok(raw.to_string());
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(raw)
            .map_err(|e| Error::MalformedEnvelope {
                message: format!("body is not valid base64: {e}"),
            })?;
        String::from_utf8(bytes).map_err(|e| Error::MalformedEnvelope {
            message: format!("body is not valid UTF-8: {e}"),
        })
    }
}

/// A user-supplied option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Boolean option
    Boolean(bool),
    /// Integer option
    Integer(i64),
    /// Number option
    Number(f64),
    /// String option
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Option name to value, in a stable order.
pub type Options = BTreeMap<String, OptionValue>;

#[derive(Deserialize)]
struct RawInteraction {
    id: String,
    application_id: String,
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    token: String,
    data: Option<RawCommandData>,
}

#[derive(Deserialize)]
struct RawCommandData {
    name: String,
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Deserialize)]
struct RawOption {
    name: String,
    value: Option<OptionValue>,
    #[serde(default)]
    options: Vec<RawOption>,
}

fn collect_options(raw: Vec<RawOption>, into: &mut Options) {
    for option in raw {
        match option.value {
            Some(value) => {
                into.insert(option.name, value);
            }
            // Subcommand or group: only its leaves carry values
            None => collect_options(option.options, into),
        }
    }
}

/// One slash-command invocation, carried across both phases.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    request_id: String,
    application_id: String,
    token: String,
    command_name: String,
    options: Options,
    redelivered: bool,
    event: GatewayEvent,
}

impl Envelope {
    /// Interaction id, stable across redelivery.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Application the interaction was sent to.
    #[must_use]
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Interaction token used by the callback and follow-up endpoints.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Registered command name.
    #[must_use]
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// Options as submitted at invocation time.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// `true` once the dispatcher has handed this envelope to itself.
    #[must_use]
    pub const fn is_redelivered(&self) -> bool {
        self.redelivered
    }

    /// Body string exactly as it arrived.
    #[must_use]
    pub fn raw_body(&self) -> &str {
        self.event.body.as_deref().unwrap_or_default()
    }

    /// Sets the phase marker, both on the envelope and on the event to forward.
    pub fn mark_redelivered(&mut self) {
        self.redelivered = true;
        self.event
            .headers
            .insert(REDELIVERY_HEADER.to_string(), "true".to_string());
    }

    /// Serialized event for the self-invocation.
    pub fn forward_payload(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.event).map_err(Into::into)
    }
}

/// What an inbound event turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Endpoint verification ping, answered with a pong
    Ping,
    /// Slash command to dispatch
    Command(Envelope),
    /// Interaction type this bot does not handle
    Unsupported {
        /// Discord interaction type
        kind: u8,
    },
}

impl Inbound {
    /// Decodes a gateway event into an interaction.
    ///
    /// # Errors
    /// Returns `Error::MalformedEnvelope` if the body is missing, cannot be
    /// decoded, or is a command without command data.
    pub fn from_event(event: GatewayEvent) -> Result<Self> {
        let body = event.decoded_body()?;
        let raw: RawInteraction =
            serde_json::from_str(&body).map_err(|e| Error::MalformedEnvelope {
                message: format!("body is not an interaction: {e}"),
            })?;

        match raw.kind {
            INTERACTION_PING => Ok(Self::Ping),
            INTERACTION_APPLICATION_COMMAND => {
                let data = raw.data.ok_or_else(|| Error::MalformedEnvelope {
                    message: format!("command interaction {} has no data", raw.id),
                })?;
                let mut options = Options::new();
                collect_options(data.options, &mut options);

                Ok(Self::Command(Envelope {
                    request_id: raw.id,
                    application_id: raw.application_id,
                    token: raw.token,
                    command_name: data.name,
                    options,
                    redelivered: event.is_redelivery(),
                    event,
                }))
            }
            kind => Ok(Self::Unsupported { kind }),
        }
    }
}
