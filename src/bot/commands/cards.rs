//! Card search and glossary commands - `lorcard` and `lordefine`.
//!
//! Parameter names are the option names the command tables map, so the
//! gateway and the Lambda see identical option sets.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]
    #![allow(clippy::too_many_arguments)]

    use crate::{
        bot::{
            Context,
            commands::{answer, collect_options},
        },
        errors::Result,
        interaction::envelope::OptionValue,
    };

    /// Search Legends of Runeterra cards.
    ///
    /// Every filter is optional; a card must match all the filters given.
    #[poise::command(slash_command)]
    pub async fn lorcard(
        ctx: Context<'_>,
        #[description = "Words in the card name"] name: Option<String>,
        #[description = "Words in the card text"] description: Option<String>,
        #[description = "Words in the level-up text"] level_up: Option<String>,
        #[description = "Exact attack (units only)"] attack_equals: Option<i64>,
        #[description = "Attack greater than (units only)"] attack_greater: Option<i64>,
        #[description = "Attack less than (units only)"] attack_less: Option<i64>,
        #[description = "Exact health (units only)"] health_equals: Option<i64>,
        #[description = "Health greater than (units only)"] health_greater: Option<i64>,
        #[description = "Health less than (units only)"] health_less: Option<i64>,
        #[description = "Exact mana cost"] cost_equals: Option<i64>,
        #[description = "Mana cost greater than"] cost_greater: Option<i64>,
        #[description = "Mana cost less than"] cost_less: Option<i64>,
        #[description = "Keyword, e.g. elusive"] keyword: Option<String>,
        #[description = "Supertype, e.g. champion"] supertype: Option<String>,
        #[description = "Card type, e.g. unit or spell"]
        #[rename = "type"]
        card_type: Option<String>,
        #[description = "Subtype, e.g. yeti"] subtype: Option<String>,
        #[description = "Region, e.g. piltoverzaun"] region: Option<String>,
        #[description = "Card set, e.g. set1"] set: Option<String>,
        #[description = "Spell speed: burst, fast or slow"] speed: Option<String>,
        #[description = "Rarity: common, rare, epic or champion"] rarity: Option<String>,
    ) -> Result<()> {
        let text = |value: Option<String>| value.map(OptionValue::Text);
        let number = |value: Option<i64>| value.map(OptionValue::Integer);

        let options = collect_options([
            ("name", text(name)),
            ("description", text(description)),
            ("level_up", text(level_up)),
            ("attack_equals", number(attack_equals)),
            ("attack_greater", number(attack_greater)),
            ("attack_less", number(attack_less)),
            ("health_equals", number(health_equals)),
            ("health_greater", number(health_greater)),
            ("health_less", number(health_less)),
            ("cost_equals", number(cost_equals)),
            ("cost_greater", number(cost_greater)),
            ("cost_less", number(cost_less)),
            ("keyword", text(keyword)),
            ("supertype", text(supertype)),
            ("type", text(card_type)),
            ("subtype", text(subtype)),
            ("region", text(region)),
            ("set", text(set)),
            ("speed", text(speed)),
            ("rarity", text(rarity)),
        ]);

        answer(ctx, options).await
    }

    /// Look up a Legends of Runeterra keyword or term.
    #[poise::command(slash_command)]
    pub async fn lordefine(
        ctx: Context<'_>,
        #[description = "Term to define, e.g. elusive"] term: String,
    ) -> Result<()> {
        let options = collect_options([("term", Some(OptionValue::Text(term)))]);
        answer(ctx, options).await
    }
}

pub use inner::*;
