//! Request signature check.
//!
//! Discord signs every interaction with the application's Ed25519 key: the
//! signature covers the timestamp header followed by the body bytes. Requests
//! that fail the check must be answered with 401; Discord sends a badly signed
//! request when the endpoint URL is saved and expects exactly that.
//!
//! A forwarded redelivery keeps both headers and the body untouched, so it
//! passes the same check.

use crate::{
    errors::{Error, Result},
    interaction::envelope::GatewayEvent,
};
use ed25519_dalek::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH, Signature, Verifier, VerifyingKey};

/// Hex-encoded Ed25519 signature.
pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
/// Timestamp prefixed to the signed message.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Verifies inbound events against the application public key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    /// Verifier for an already decoded key.
    #[must_use]
    pub const fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Parses the public key shown in the Discord developer portal.
    ///
    /// # Errors
    /// Returns `Error::Config` if the value is not a hex-encoded Ed25519 key.
    pub fn from_hex(public_key: &str) -> Result<Self> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] = decode_fixed(public_key.trim()).ok_or_else(|| {
            Error::Config {
                message: "DISCORD_PUBLIC_KEY must be 64 hex characters".to_string(),
            }
        })?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|e| Error::Config {
            message: format!("DISCORD_PUBLIC_KEY is not a valid Ed25519 key: {e}"),
        })?;
        Ok(Self::new(key))
    }

    /// Checks the signature headers against the decoded body.
    ///
    /// # Errors
    /// Returns `Error::InvalidSignature` if a header is missing, the
    /// signature is not well formed, or it does not match.
    pub fn verify(&self, event: &GatewayEvent) -> Result<()> {
        let signature = event
            .header(SIGNATURE_HEADER)
            .ok_or_else(|| rejected(format!("missing {SIGNATURE_HEADER} header")))?;
        let timestamp = event
            .header(TIMESTAMP_HEADER)
            .ok_or_else(|| rejected(format!("missing {TIMESTAMP_HEADER} header")))?;

        let signature: [u8; SIGNATURE_LENGTH] = decode_fixed(signature)
            .ok_or_else(|| rejected("signature is not 128 hex characters".to_string()))?;
        let body = event
            .decoded_body()
            .map_err(|e| rejected(format!("body cannot be verified: {e}")))?;

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body.as_bytes());

        self.key
            .verify(&message, &Signature::from_bytes(&signature))
            .map_err(|_| rejected("signature does not match".to_string()))
    }
}

fn decode_fixed<const N: usize>(value: &str) -> Option<[u8; N]> {
    hex::decode(value).ok()?.try_into().ok()
}

fn rejected(message: String) -> Error {
    Error::InvalidSignature { message }
}
