//! Shared test utilities for `LorBuddy`.
//!
//! This module provides an in-memory card database seeded with a handful of
//! cards and terms, interaction payload builders, and recording fakes for the
//! protocol collaborators.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        filters::{Predicate, Store},
        search::{QueryExecutor, Record},
    },
    entities::{card, term},
    errors::{Error, Result},
    interaction::{
        content::ReplyContent,
        envelope::{Envelope, GatewayEvent, Inbound, OptionValue},
        invoker::SelfInvoker,
        responder::Responder,
        signature::{SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER},
    },
};
use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Card with sensible defaults; override fields with struct update syntax.
///
/// # Defaults
/// * unit, cost 1, 1/1, collectible, set1, common
/// * `search_name`: lowercase `name`
/// * `image_url`: `https://cdn.example/<code>.png`
#[must_use]
pub fn test_card(code: &str, name: &str) -> card::Model {
    card::Model {
        card_code: code.to_string(),
        name: name.to_string(),
        search_name: name.to_lowercase(),
        description: String::new(),
        levelup_description: String::new(),
        attack: 1,
        cost: 1,
        health: 1,
        keywords: String::new(),
        supertype: String::new(),
        card_type: "unit".to_string(),
        subtypes: String::new(),
        regions: String::new(),
        card_set: "set1".to_string(),
        spell_speed: String::new(),
        rarity: "common".to_string(),
        image_url: format!("https://cdn.example/{code}.png"),
        collectible: true,
    }
}

fn spell(code: &str, name: &str, cost: i32, speed: &str) -> card::Model {
    card::Model {
        attack: 0,
        health: 0,
        cost,
        card_type: "spell".to_string(),
        spell_speed: speed.to_string(),
        keywords: speed.to_string(),
        regions: "piltoverzaun".to_string(),
        ..test_card(code, name)
    }
}

/// Inserts a card.
pub async fn insert_card(db: &DatabaseConnection, card: card::Model) -> Result<card::Model> {
    let card = card::ActiveModel {
        card_code: Set(card.card_code),
        name: Set(card.name),
        search_name: Set(card.search_name),
        description: Set(card.description),
        levelup_description: Set(card.levelup_description),
        attack: Set(card.attack),
        cost: Set(card.cost),
        health: Set(card.health),
        keywords: Set(card.keywords),
        supertype: Set(card.supertype),
        card_type: Set(card.card_type),
        subtypes: Set(card.subtypes),
        regions: Set(card.regions),
        card_set: Set(card.card_set),
        spell_speed: Set(card.spell_speed),
        rarity: Set(card.rarity),
        image_url: Set(card.image_url),
        collectible: Set(card.collectible),
    };
    card.insert(db).await.map_err(Into::into)
}

/// Inserts a glossary term.
pub async fn insert_term(
    db: &DatabaseConnection,
    name: &str,
    description: &str,
) -> Result<term::Model> {
    term::ActiveModel {
        search_name: Set(name.to_lowercase()),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// In-memory database with four cards and two terms.
///
/// | card | type | cost | atk/hp | region | speed | keywords |
/// |---|---|---|---|---|---|---|
/// | Storm Herald | unit | 4 | 3/3 | piltoverzaun | | |
/// | Statikk Shock | spell | 4 | | piltoverzaun | fast | fast |
/// | Mystic Shot | spell | 2 | | piltoverzaun | fast | fast |
/// | Teemo | unit | 1 | 1/1 | bandlecity | | elusive |
pub async fn setup_seeded_db() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;

    insert_card(
        &db,
        card::Model {
            cost: 4,
            attack: 3,
            health: 3,
            regions: "piltoverzaun".to_string(),
            ..test_card("01PZ005", "Storm Herald")
        },
    )
    .await?;
    insert_card(&db, spell("01PZ037", "Statikk Shock", 4, "fast")).await?;
    insert_card(&db, spell("01PZ052", "Mystic Shot", 2, "fast")).await?;
    insert_card(
        &db,
        card::Model {
            keywords: "elusive".to_string(),
            regions: "bandlecity".to_string(),
            supertype: "champion".to_string(),
            ..test_card("04BC001", "Teemo")
        },
    )
    .await?;

    insert_term(&db, "Elusive", "Can only be blocked by an Elusive unit.").await?;
    insert_term(&db, "Fast", "Fast spells can be played at any time.").await?;

    Ok(db)
}

/// Discord application-command body with string/integer options.
#[must_use]
pub fn command_body(request_id: &str, command: &str, options: &[(&str, OptionValue)]) -> String {
    let options: Vec<_> = options
        .iter()
        .map(|(name, value)| json!({ "name": name, "type": 3, "value": value }))
        .collect();
    json!({
        "id": request_id,
        "application_id": "42",
        "type": 2,
        "token": format!("token-{request_id}"),
        "data": { "name": command, "options": options },
    })
    .to_string()
}

/// Gateway event carrying a command body.
#[must_use]
pub fn command_event(
    request_id: &str,
    command: &str,
    options: &[(&str, OptionValue)],
) -> GatewayEvent {
    GatewayEvent::from_body(command_body(request_id, command, options))
}

/// First-delivery envelope.
#[must_use]
pub fn command_envelope(
    request_id: &str,
    command: &str,
    options: &[(&str, OptionValue)],
) -> Envelope {
    match Inbound::from_event(command_event(request_id, command, options)).unwrap() {
        Inbound::Command(envelope) => envelope,
        other => unreachable!("command body decoded as {other:?}"),
    }
}

/// Fixed application key used to sign test events.
#[must_use]
pub fn test_signing_key() -> SigningKey {
    SigningKey::from_bytes(&[7; 32])
}

/// Verifier matching `test_signing_key`.
#[must_use]
pub fn test_verifier() -> SignatureVerifier {
    SignatureVerifier::new(test_signing_key().verifying_key())
}

/// Adds the timestamp and signature headers Discord would send for `event`'s body.
#[must_use]
pub fn sign_event(mut event: GatewayEvent) -> GatewayEvent {
    let timestamp = "1700000000";
    let message = format!("{timestamp}{}", event.body.as_deref().unwrap_or_default());
    let signature = test_signing_key().sign(message.as_bytes());

    event
        .headers
        .insert(TIMESTAMP_HEADER.to_string(), timestamp.to_string());
    event
        .headers
        .insert(SIGNATURE_HEADER.to_string(), hex::encode(signature.to_bytes()));
    event
}

/// Collaborator call as seen by the fakes.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `acknowledge(request_id)`
    Acknowledge(String),
    /// `reinvoke`, with the envelope decoded back from the forwarded payload
    Reinvoke(Envelope),
    /// `search(store, predicates)`
    Search(Store, Vec<Predicate>),
    /// `deliver_result(request_id, content)`
    Deliver(String, ReplyContent),
}

/// Ordered log shared between fakes.
pub type CallLog = Arc<Mutex<Vec<Call>>>;

fn transport_failure(what: &str) -> Error {
    Error::Io(std::io::Error::other(format!("{what} failed")))
}

/// `Responder` that records calls.
pub struct RecordingResponder {
    log: CallLog,
    fail_acknowledge: bool,
    fail_delivery: bool,
}

impl RecordingResponder {
    /// Responder whose calls succeed.
    #[must_use]
    pub const fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_acknowledge: false,
            fail_delivery: false,
        }
    }

    /// Makes `acknowledge` fail after recording the call.
    #[must_use]
    pub const fn failing_acknowledge(mut self) -> Self {
        self.fail_acknowledge = true;
        self
    }

    /// Makes `deliver_result` fail after recording the call.
    #[must_use]
    pub const fn failing_delivery(mut self) -> Self {
        self.fail_delivery = true;
        self
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn acknowledge(&self, envelope: &Envelope) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(Call::Acknowledge(envelope.request_id().to_string()));
        if self.fail_acknowledge {
            return Err(transport_failure("acknowledge"));
        }
        Ok(())
    }

    async fn deliver_result(&self, envelope: &Envelope, content: ReplyContent) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(Call::Deliver(envelope.request_id().to_string(), content));
        if self.fail_delivery {
            return Err(transport_failure("deliver"));
        }
        Ok(())
    }
}

/// `SelfInvoker` that decodes and records the forwarded payload.
pub struct RecordingInvoker {
    log: CallLog,
    fail: bool,
}

impl RecordingInvoker {
    /// Invoker whose submissions are accepted.
    #[must_use]
    pub const fn new(log: CallLog) -> Self {
        Self { log, fail: false }
    }

    /// Makes submissions fail after recording them.
    #[must_use]
    pub const fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl SelfInvoker for RecordingInvoker {
    async fn reinvoke(&self, envelope: &Envelope) -> Result<()> {
        let payload = envelope.forward_payload()?;
        let event: GatewayEvent = serde_json::from_slice(&payload)?;
        let Inbound::Command(forwarded) = Inbound::from_event(event)? else {
            unreachable!("forwarded payload is always a command");
        };
        self.log.lock().unwrap().push(Call::Reinvoke(forwarded));

        if self.fail {
            return Err(Error::Reinvoke {
                message: "function is throttled".to_string(),
            });
        }
        Ok(())
    }
}

/// `QueryExecutor` returning a fixed outcome.
pub struct StubExecutor {
    records: Option<Vec<Record>>,
    log: Option<CallLog>,
}

impl StubExecutor {
    /// Always returns `records`.
    #[must_use]
    pub const fn returning(records: Vec<Record>) -> Self {
        Self {
            records: Some(records),
            log: None,
        }
    }

    /// Always fails with a database error.
    #[must_use]
    pub const fn failing() -> Self {
        Self {
            records: None,
            log: None,
        }
    }

    /// Records searches into `log`.
    #[must_use]
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }
}

#[async_trait]
impl QueryExecutor for StubExecutor {
    async fn search(&self, store: Store, predicates: &[Predicate]) -> Result<Vec<Record>> {
        if let Some(log) = &self.log {
            log.lock()
                .unwrap()
                .push(Call::Search(store, predicates.to_vec()));
        }
        self.records
            .clone()
            .ok_or_else(|| Error::Database(sea_orm::DbErr::Custom("scan failed".to_string())))
    }
}
