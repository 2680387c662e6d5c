//! Lambda handler - maps gateway events to dispatcher calls and HTTP responses.
//!
//! Every event is signature-checked before it is decoded, redeliveries
//! included. The handler never returns `Err` to the runtime, so a failed
//! redelivery is not retried because of a handler error. Lambda still retries
//! asynchronous invocations that time out or crash, and the delivery ledger
//! only spans one process: deploy the function with its asynchronous
//! `MaximumRetryAttempts` set to 0, or a retried redelivery can post a second
//! follow-up.

use crate::{
    errors::Error,
    interaction::{DispatchState, Dispatcher, GatewayEvent, Inbound, SignatureVerifier},
};
use lambda_runtime::LambdaEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Discord interaction callback type answering a ping.
const CALLBACK_PONG: u8 = 1;

/// HTTP response in the gateway's proxy format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    /// HTTP status
    pub status_code: u16,
    /// Response headers
    pub headers: BTreeMap<String, String>,
    /// JSON body, empty when there is nothing to say
    pub body: String,
}

impl GatewayResponse {
    fn json(status_code: u16, body: &serde_json::Value) -> Self {
        Self {
            status_code,
            headers: BTreeMap::from([(
                "content-type".to_string(),
                "application/json".to_string(),
            )]),
            body: body.to_string(),
        }
    }

    fn empty(status_code: u16) -> Self {
        Self {
            status_code,
            headers: BTreeMap::new(),
            body: String::new(),
        }
    }

    fn rejected(status_code: u16, message: &str) -> Self {
        Self::json(status_code, &json!({ "error": message }))
    }
}

/// Verifies, decodes and dispatches gateway events.
pub struct Handler {
    verifier: SignatureVerifier,
    dispatcher: Dispatcher,
}

impl Handler {
    /// Handler checking signatures with `verifier` before dispatching.
    #[must_use]
    pub const fn new(verifier: SignatureVerifier, dispatcher: Dispatcher) -> Self {
        Self {
            verifier,
            dispatcher,
        }
    }

    /// Handles one Lambda invocation.
    ///
    /// # Errors
    /// Never; every failure is logged and turned into a status code.
    pub async fn handle_event(
        &self,
        event: LambdaEvent<GatewayEvent>,
    ) -> Result<GatewayResponse, lambda_runtime::Error> {
        let (payload, context) = event.into_parts();
        info!(aws_request_id = %context.request_id, "Invocation received");
        Ok(self.respond(payload).await)
    }

    /// Response for a single gateway event.
    pub async fn respond(&self, event: GatewayEvent) -> GatewayResponse {
        if let Err(e) = self.verifier.verify(&event) {
            warn!("Rejecting unsigned event: {}", e);
            return GatewayResponse::rejected(401, "invalid request signature");
        }

        let inbound = match Inbound::from_event(event) {
            Ok(inbound) => inbound,
            Err(e) => {
                warn!("Rejecting event: {}", e);
                return GatewayResponse::rejected(400, "malformed interaction");
            }
        };

        match inbound {
            Inbound::Ping => {
                info!("Answering endpoint ping");
                GatewayResponse::json(200, &json!({ "type": CALLBACK_PONG }))
            }
            Inbound::Unsupported { kind } => {
                warn!(kind, "Ignoring unsupported interaction type");
                GatewayResponse::rejected(400, "unsupported interaction type")
            }
            Inbound::Command(envelope) => match self.dispatcher.dispatch(envelope).await {
                Ok(DispatchState::Acknowledged) => GatewayResponse::empty(202),
                Ok(state) => {
                    GatewayResponse::json(200, &json!({ "state": format!("{state:?}") }))
                }
                Err(Error::MalformedEnvelope { message }) => {
                    warn!("Rejecting command: {}", message);
                    GatewayResponse::rejected(400, "malformed interaction")
                }
                Err(e) => {
                    error!("Invocation ended with a transport failure: {}", e);
                    GatewayResponse::empty(500)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        config::settings::Settings,
        core::{filters::CommandRegistry, pipeline::CommandPipeline, search::Record},
        interaction::{envelope::REDELIVERY_HEADER, signature::SIGNATURE_HEADER},
        test_utils::{
            Call, CallLog, RecordingInvoker, RecordingResponder, StubExecutor, command_event,
            sign_event, test_verifier,
        },
    };
    use lambda_runtime::Context;
    use std::sync::Arc;

    const PING: &str = r#"{"id":"1","application_id":"42","type":1}"#;

    fn handler(log: &CallLog, responder: RecordingResponder) -> Handler {
        let records = vec![Record {
            name: "Teemo".to_string(),
            description: None,
            media: vec!["https://cdn.example/04BC001.png".to_string()],
        }];
        let dispatcher = Dispatcher::new(
            Arc::new(responder),
            Arc::new(RecordingInvoker::new(Arc::clone(log))),
            Arc::new(CommandPipeline::new(
                Arc::new(StubExecutor::returning(records)),
                CommandRegistry::default(),
                Settings::default(),
            )),
        );
        Handler::new(test_verifier(), dispatcher)
    }

    #[tokio::test]
    async fn test_signed_ping_is_answered_with_pong() {
        let log = CallLog::default();
        let handler = handler(&log, RecordingResponder::new(Arc::clone(&log)));

        let response = handler.respond(sign_event(GatewayEvent::from_body(PING))).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"type":1}"#);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsigned_ping_is_unauthorized() {
        let log = CallLog::default();
        let handler = handler(&log, RecordingResponder::new(Arc::clone(&log)));

        let response = handler.respond(GatewayEvent::from_body(PING)).await;
        assert_eq!(response.status_code, 401);
    }

    #[tokio::test]
    async fn test_tampered_command_never_reaches_the_dispatcher() {
        let log = CallLog::default();
        let handler = handler(&log, RecordingResponder::new(Arc::clone(&log)));

        let mut tampered = sign_event(command_event("903", "lorcard", &[("name", "teemo".into())]));
        tampered.body = tampered.body.map(|body| body.replace("teemo", "jinx"));
        assert_eq!(handler.respond(tampered).await.status_code, 401);

        let mut unsigned = sign_event(command_event("904", "lorcard", &[]));
        unsigned.headers.remove(SIGNATURE_HEADER);
        assert_eq!(handler.respond(unsigned).await.status_code, 401);

        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_delivery_is_accepted() {
        let log = CallLog::default();
        let handler = handler(&log, RecordingResponder::new(Arc::clone(&log)));
        let event = sign_event(command_event("900", "lorcard", &[("name", "teemo".into())]));

        let response = handler.respond(event).await;
        assert_eq!(response.status_code, 202);

        let calls = log.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], Call::Acknowledge("900".to_string()));
        assert!(matches!(&calls[1], Call::Reinvoke(e) if e.is_redelivered()));
    }

    #[tokio::test]
    async fn test_redelivery_is_answered_with_ok() {
        let log = CallLog::default();
        let handler = handler(&log, RecordingResponder::new(Arc::clone(&log)));
        // The marker is added after signing, as the self-invocation does
        let mut event = sign_event(command_event("901", "lorcard", &[("name", "teemo".into())]));
        event
            .headers
            .insert(REDELIVERY_HEADER.to_string(), "true".to_string());

        let response = handler.respond(event).await;
        assert_eq!(response.status_code, 200);
        assert!(response.body.contains("Delivered"));

        let calls = log.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], Call::Deliver(id, _) if id == "901"));
    }

    #[tokio::test]
    async fn test_malformed_and_unsupported_events_are_rejected() {
        let log = CallLog::default();
        let handler = handler(&log, RecordingResponder::new(Arc::clone(&log)));

        let response = handler
            .respond(sign_event(GatewayEvent::from_body("not json")))
            .await;
        assert_eq!(response.status_code, 400);

        // Nothing to verify without a body
        let response = handler.respond(GatewayEvent::default()).await;
        assert_eq!(response.status_code, 401);

        let autocomplete = r#"{"id":"2","application_id":"42","type":4,"token":"t"}"#;
        let response = handler
            .respond(sign_event(GatewayEvent::from_body(autocomplete)))
            .await;
        assert_eq!(response.status_code, 400);

        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_an_invocation_error() {
        let log = CallLog::default();
        let handler = handler(
            &log,
            RecordingResponder::new(Arc::clone(&log)).failing_acknowledge(),
        );
        let event = sign_event(command_event("902", "lorcard", &[("name", "teemo".into())]));

        let result = handler
            .handle_event(LambdaEvent::new(event, Context::default()))
            .await;
        let response = result.unwrap();
        assert_eq!(response.status_code, 500);

        // Acknowledgment failed, so nothing was reinvoked
        assert_eq!(
            *log.lock().unwrap(),
            vec![Call::Acknowledge("902".to_string())]
        );
    }
}
