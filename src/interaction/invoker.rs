//! Self-invoker - hands the marked envelope to a fresh invocation of this function.
//!
//! The call only waits until Lambda has queued the event, never for the
//! redelivery to run, so the first invocation stays inside Discord's deadline.

use crate::{
    errors::{Error, Result},
    interaction::envelope::Envelope,
};
use async_trait::async_trait;
use aws_sdk_lambda::{error::DisplayErrorContext, primitives::Blob, types::InvocationType};
use tracing::info;

/// Status Lambda returns when an `Event` invocation is queued.
const EVENT_ACCEPTED: i32 = 202;

/// Re-submits an envelope to the serving entry point.
#[async_trait]
pub trait SelfInvoker: Send + Sync {
    /// Submits the redelivery. Returns once it is accepted for execution.
    async fn reinvoke(&self, envelope: &Envelope) -> Result<()>;
}

/// `SelfInvoker` using the Lambda `Invoke` API with `InvocationType::Event`.
#[derive(Debug, Clone)]
pub struct LambdaSelfInvoker {
    client: aws_sdk_lambda::Client,
    function_name: String,
}

impl LambdaSelfInvoker {
    /// Invoker targeting `function_name`.
    #[must_use]
    pub fn new(client: aws_sdk_lambda::Client, function_name: impl Into<String>) -> Self {
        Self {
            client,
            function_name: function_name.into(),
        }
    }
}

#[async_trait]
impl SelfInvoker for LambdaSelfInvoker {
    async fn reinvoke(&self, envelope: &Envelope) -> Result<()> {
        let payload = envelope.forward_payload()?;

        let output = self
            .client
            .invoke()
            .function_name(&self.function_name)
            .invocation_type(InvocationType::Event)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| Error::Reinvoke {
                message: DisplayErrorContext(&e).to_string(),
            })?;

        if output.status_code() != EVENT_ACCEPTED {
            return Err(Error::Reinvoke {
                message: format!("unexpected invoke status {}", output.status_code()),
            });
        }

        info!(
            request_id = envelope.request_id(),
            function = %self.function_name,
            "Redelivery queued"
        );
        Ok(())
    }
}
