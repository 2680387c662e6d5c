//! Discord slash commands and the reply rendering they share.

/// `lorcard` and `lordefine`
pub mod cards;

pub use cards::*;

use crate::{
    bot::{BotData, Context},
    errors::{Error, Result},
    interaction::{
        content::ReplyContent,
        envelope::{OptionValue, Options},
        responder::item_embeds,
    },
};
use tracing::{error, info};

/// Every command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![lorcard(), lordefine()]
}

/// Renders reply content as a poise reply.
#[must_use]
pub fn reply(content: &ReplyContent) -> poise::CreateReply {
    match content {
        ReplyContent::Items { items, summary } => {
            let reply = item_embeds(items)
                .into_iter()
                .fold(poise::CreateReply::default(), poise::CreateReply::embed);
            match summary {
                Some(text) => reply.content(text.clone()),
                None => reply,
            }
        }
        ReplyContent::Notice { text, ephemeral } => poise::CreateReply::default()
            .content(text.clone())
            .ephemeral(*ephemeral),
    }
}

/// Collects the options the user actually filled in.
fn collect_options<const N: usize>(pairs: [(&str, Option<OptionValue>); N]) -> Options {
    pairs
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
}

/// Defers, runs the pipeline and sends exactly one reply.
async fn answer(ctx: Context<'_>, options: Options) -> Result<()> {
    let command = ctx.command().name.clone();
    ctx.defer().await?;

    let pipeline = &ctx.data().pipeline;
    let content = match pipeline.answer(&command, &options).await {
        Ok(content) => content,
        Err(e) => {
            error!(command = %command, "Error processing request: {}", e);
            pipeline.error_notice()
        }
    };

    ctx.send(reply(&content)).await?;
    info!(command = %command, "Reply sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::content::DisplayItem;

    #[test]
    fn test_only_filled_options_are_collected() {
        let options = collect_options([
            ("name", Some(OptionValue::from("jinx"))),
            ("cost_equals", None),
            ("attack_greater", Some(OptionValue::from(2_i64))),
        ]);

        assert_eq!(options.len(), 2);
        assert_eq!(options["name"], OptionValue::Text("jinx".to_string()));
        assert_eq!(options["attack_greater"], OptionValue::Integer(2));
    }

    #[test]
    fn test_items_become_embeds_with_summary() {
        let content = ReplyContent::Items {
            items: vec![
                DisplayItem {
                    title: "Storm Herald".to_string(),
                    description: None,
                    media: Some("https://cdn.example/01PZ005.png".to_string()),
                },
                DisplayItem {
                    title: "Teemo".to_string(),
                    description: None,
                    media: Some("https://cdn.example/04BC001.png".to_string()),
                },
            ],
            summary: Some("Storm Herald, Teemo".to_string()),
        };

        let reply = reply(&content);
        assert_eq!(reply.embeds.len(), 2);
        assert_eq!(reply.content.as_deref(), Some("Storm Herald, Teemo"));
        assert_eq!(reply.ephemeral, None);
    }

    #[test]
    fn test_notice_is_ephemeral_text() {
        let reply = reply(&ReplyContent::notice("No results found"));
        assert!(reply.embeds.is_empty());
        assert_eq!(reply.content.as_deref(), Some("No results found"));
        assert_eq!(reply.ephemeral, Some(true));
    }

    #[test]
    fn test_registered_command_names_match_the_registry() {
        let registry = crate::core::filters::CommandRegistry::default();
        for command in all() {
            assert!(registry.find(&command.name).is_some(), "{}", command.name);
        }
    }
}
