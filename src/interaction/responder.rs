//! Responder - the two Discord calls a deferred command makes.
//!
//! `acknowledge` posts the deferred callback ("thinking…") and
//! `deliver_result` posts the follow-up message. Both go through the REST API
//! rather than the webhook HTTP response, so the acknowledgment is on its way
//! before the self-invocation is submitted.

use crate::{
    errors::{Error, Result},
    interaction::{
        content::{DisplayItem, ReplyContent},
        envelope::Envelope,
    },
};
use async_trait::async_trait;
use lru::LruCache;
use poise::serenity_prelude as serenity;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Platform reply primitives used by the dispatcher.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Tells Discord a follow-up will come later. At most once per interaction.
    async fn acknowledge(&self, envelope: &Envelope) -> Result<()>;

    /// Sends the single follow-up for the interaction.
    async fn deliver_result(&self, envelope: &Envelope, content: ReplyContent) -> Result<()>;
}

/// Number of interaction ids remembered by a warm process.
const LEDGER_CAPACITY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(1023);

/// Remembers which interactions were acknowledged or answered.
///
/// A claim is taken before the network call and never released, so a failed
/// call is not attempted again.
#[derive(Debug)]
pub struct DeliveryLedger {
    acknowledged: Mutex<LruCache<String, ()>>,
    delivered: Mutex<LruCache<String, ()>>,
}

impl Default for DeliveryLedger {
    fn default() -> Self {
        Self::new(LEDGER_CAPACITY)
    }
}

impl DeliveryLedger {
    /// Ledger remembering up to `capacity` ids per phase.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            acknowledged: Mutex::new(LruCache::new(capacity)),
            delivered: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Claims the acknowledgment for `request_id`.
    ///
    /// # Errors
    /// Returns `Error::AlreadyAcknowledged` if it was claimed before.
    pub fn claim_acknowledgement(&self, request_id: &str) -> Result<()> {
        if claim(&self.acknowledged, request_id) {
            Ok(())
        } else {
            Err(Error::AlreadyAcknowledged {
                request_id: request_id.to_string(),
            })
        }
    }

    /// Claims the follow-up for `request_id`.
    ///
    /// # Errors
    /// Returns `Error::AlreadyDelivered` if it was claimed before.
    pub fn claim_delivery(&self, request_id: &str) -> Result<()> {
        if claim(&self.delivered, request_id) {
            Ok(())
        } else {
            Err(Error::AlreadyDelivered {
                request_id: request_id.to_string(),
            })
        }
    }
}

fn claim(cache: &Mutex<LruCache<String, ()>>, request_id: &str) -> bool {
    let mut seen = cache.lock().unwrap_or_else(PoisonError::into_inner);
    if seen.contains(request_id) {
        return false;
    }
    seen.put(request_id.to_string(), ());
    true
}

/// Deferred callback body (interaction response type 5).
#[must_use]
pub fn deferred_response() -> serenity::CreateInteractionResponse {
    serenity::CreateInteractionResponse::Defer(serenity::CreateInteractionResponseMessage::new())
}

/// Renders reply content as a follow-up message.
///
/// Every item becomes one embed. The embeds share the first item's image URL
/// as their `url`, which makes Discord show the images as one gallery.
/// Notices carry no embeds.
#[must_use]
pub fn followup_message(content: &ReplyContent) -> serenity::CreateInteractionResponseFollowup {
    match content {
        ReplyContent::Items { items, summary } => {
            let followup =
                serenity::CreateInteractionResponseFollowup::new().embeds(item_embeds(items));
            match summary {
                Some(text) => followup.content(text.clone()),
                None => followup,
            }
        }
        ReplyContent::Notice { text, ephemeral } => {
            serenity::CreateInteractionResponseFollowup::new()
                .content(text.clone())
                .ephemeral(*ephemeral)
        }
    }
}

/// One embed per item, all sharing the first image URL.
#[must_use]
pub fn item_embeds(items: &[DisplayItem]) -> Vec<serenity::CreateEmbed> {
    let gallery_url = items.iter().find_map(|item| item.media.as_deref());
    items
        .iter()
        .map(|item| item_embed(item, gallery_url))
        .collect()
}

fn item_embed(item: &DisplayItem, gallery_url: Option<&str>) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new();
    if let Some(media) = &item.media {
        embed = embed.image(media.clone());
        if let Some(url) = gallery_url {
            embed = embed.url(url);
        }
    } else {
        // Text-only items (definitions) show their title
        embed = embed.title(item.title.clone());
    }
    if let Some(description) = &item.description {
        embed = embed.description(description.clone());
    }
    embed
}

/// `Responder` backed by Discord's REST API.
pub struct DiscordResponder {
    http: Arc<serenity::Http>,
    ledger: DeliveryLedger,
}

impl DiscordResponder {
    /// Creates a responder; `http` must know the application id for follow-ups.
    #[must_use]
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self {
            http,
            ledger: DeliveryLedger::default(),
        }
    }

    /// Builds the REST client for an application. Interaction endpoints are
    /// authorised by the interaction token, so the bot token may be empty.
    #[must_use]
    pub fn http_for(application_id: u64, bot_token: Option<&str>) -> Arc<serenity::Http> {
        let http = serenity::Http::new(bot_token.unwrap_or_default());
        http.set_application_id(serenity::ApplicationId::new(application_id));
        Arc::new(http)
    }
}

fn interaction_id(envelope: &Envelope) -> Result<serenity::InteractionId> {
    envelope
        .request_id()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(serenity::InteractionId::new)
        .ok_or_else(|| Error::MalformedEnvelope {
            message: format!("'{}' is not an interaction id", envelope.request_id()),
        })
}

#[async_trait]
impl Responder for DiscordResponder {
    async fn acknowledge(&self, envelope: &Envelope) -> Result<()> {
        let id = interaction_id(envelope)?;
        self.ledger.claim_acknowledgement(envelope.request_id())?;

        debug!(request_id = envelope.request_id(), "Sending deferred response");
        self.http
            .create_interaction_response(id, envelope.token(), &deferred_response(), Vec::new())
            .await?;
        info!(request_id = envelope.request_id(), "Interaction acknowledged");
        Ok(())
    }

    async fn deliver_result(&self, envelope: &Envelope, content: ReplyContent) -> Result<()> {
        self.ledger.claim_delivery(envelope.request_id())?;

        let followup = followup_message(&content);
        debug!(request_id = envelope.request_id(), ?content, "Sending follow-up");
        self.http
            .create_followup_message(envelope.token(), &followup, Vec::new())
            .await?;
        info!(request_id = envelope.request_id(), "Follow-up delivered");
        Ok(())
    }
}
