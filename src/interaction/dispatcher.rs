//! Dispatcher - the two-phase state machine.
//!
//! ```text
//! first delivery:  Received -> Acknowledged
//! redelivery:      Received -> Executing -> Delivered | Failed
//! ```
//!
//! The acknowledgment is always attempted before the redelivery is
//! submitted. Query failures are absorbed into an error follow-up; transport
//! failures (acknowledge, reinvoke, deliver) end the invocation with an error.

use crate::{
    core::pipeline::CommandPipeline,
    errors::Result,
    interaction::{envelope::Envelope, invoker::SelfInvoker, responder::Responder},
};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Protocol state of one envelope within one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Envelope received, nothing done yet
    Received,
    /// Deferred response sent and redelivery submitted (terminal, first delivery)
    Acknowledged,
    /// Query running (redelivery)
    Executing,
    /// Results or empty notice delivered (terminal, redelivery)
    Delivered,
    /// Query failed and the error notice was delivered (terminal, redelivery)
    Failed,
}

/// Routes each envelope to the acknowledge or the reply path.
pub struct Dispatcher {
    responder: Arc<dyn Responder>,
    invoker: Arc<dyn SelfInvoker>,
    pipeline: Arc<CommandPipeline>,
}

impl Dispatcher {
    /// Dispatcher wired to its collaborators.
    #[must_use]
    pub fn new(
        responder: Arc<dyn Responder>,
        invoker: Arc<dyn SelfInvoker>,
        pipeline: Arc<CommandPipeline>,
    ) -> Self {
        Self {
            responder,
            invoker,
            pipeline,
        }
    }

    /// Handles one envelope and returns the terminal state reached.
    ///
    /// # Errors
    /// Returns the transport error if acknowledging, submitting the
    /// redelivery or delivering the follow-up fails.
    #[instrument(
        skip(self, envelope),
        fields(request_id = %envelope.request_id(), command = %envelope.command_name())
    )]
    pub async fn dispatch(&self, envelope: Envelope) -> Result<DispatchState> {
        info!(
            state = ?DispatchState::Received,
            redelivered = envelope.is_redelivered(),
            "Envelope received"
        );
        if envelope.is_redelivered() {
            self.reply(&envelope).await
        } else {
            self.defer(envelope).await
        }
    }

    async fn defer(&self, mut envelope: Envelope) -> Result<DispatchState> {
        self.responder
            .acknowledge(&envelope)
            .await
            .inspect_err(|e| error!("Acknowledgment failed, not reinvoking: {}", e))?;

        envelope.mark_redelivered();
        // No compensation exists for this failure: the user keeps seeing the
        // deferred state until Discord expires the interaction token.
        self.invoker.reinvoke(&envelope).await.inspect_err(|e| {
            error!("Interaction acknowledged but redelivery was not submitted: {}", e);
        })?;

        info!(state = ?DispatchState::Acknowledged, "Deferred and reinvoked");
        Ok(DispatchState::Acknowledged)
    }

    async fn reply(&self, envelope: &Envelope) -> Result<DispatchState> {
        info!(state = ?DispatchState::Executing, "Running the query");

        let (state, content) = match self
            .pipeline
            .answer(envelope.command_name(), envelope.options())
            .await
        {
            Ok(content) => (DispatchState::Delivered, content),
            Err(e) => {
                error!("Error processing request: {}", e);
                (DispatchState::Failed, self.pipeline.error_notice())
            }
        };

        self.responder
            .deliver_result(envelope, content)
            .await
            .inspect_err(|e| error!("Follow-up delivery failed: {}", e))?;

        info!(state = ?state, "Follow-up sent");
        Ok(state)
    }
}
