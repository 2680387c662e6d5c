//! Deferred two-phase interaction protocol.
//!
//! Discord expects a first reply within a few seconds, but a search plus the
//! follow-up may take longer. The first delivery of a command therefore only
//! acknowledges and hands the envelope back to the same function; the
//! redelivery does the work and posts the follow-up.

/// Follow-up content model
pub mod content;
/// Two-phase state machine
pub mod dispatcher;
/// Inbound event and interaction decoding
pub mod envelope;
/// Asynchronous self-invocation
pub mod invoker;
/// Deferred response and follow-up calls
pub mod responder;
/// Ed25519 request signature check
pub mod signature;

pub use dispatcher::{DispatchState, Dispatcher};
pub use envelope::{Envelope, GatewayEvent, Inbound};
pub use signature::SignatureVerifier;
