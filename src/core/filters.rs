//! Command tables - declarative mapping from slash-command options to store predicates.
//!
//! Each command is one `CommandTable`: the store it searches, how each option
//! becomes predicates, and how the records are presented. Adding a command
//! means adding a table, not a handler.

use crate::{
    errors::{Error, Result},
    interaction::envelope::{OptionValue, Options},
};
use tracing::debug;

/// Which table a command searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Store {
    /// Card table
    Cards,
    /// Glossary table
    Terms,
}

/// A searchable store attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    /// Lowercase card name
    SearchName,
    /// Card rules text
    Description,
    /// Champion level-up text
    LevelupDescription,
    /// Unit attack
    Attack,
    /// Unit health
    Health,
    /// Mana cost
    Cost,
    /// Keyword refs
    Keywords,
    /// Supertype (champion)
    Supertype,
    /// Card type (unit, spell, ...)
    CardType,
    /// Subtypes (yeti, elite, ...)
    Subtypes,
    /// Region refs
    Regions,
    /// Card set
    Set,
    /// Spell speed ref
    SpellSpeed,
    /// Rarity ref
    Rarity,
    /// Lowercase glossary term
    TermName,
}

impl Attribute {
    /// Whether values for this attribute are integers.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Attack | Self::Health | Self::Cost)
    }
}

/// How an option value is compared against its attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Every whitespace-separated word must appear
    ContainsWords,
    /// The whole value must appear
    Contains,
    /// Exact match
    Equals,
    /// Strictly greater
    Greater,
    /// Strictly less
    Less,
}

/// Right-hand side of an equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Lowercased text
    Text(String),
    /// Integer
    Number(i64),
}

/// One comparison against an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Substring match
    Contains(String),
    /// Equality
    Equals(Operand),
    /// Greater than
    Greater(i64),
    /// Less than
    Less(i64),
}

/// A single store filter. A query matches records satisfying all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Attribute compared
    pub attribute: Attribute,
    /// Comparison applied
    pub comparison: Comparison,
}

impl Predicate {
    fn text_equals(attribute: Attribute, value: &str) -> Self {
        Self {
            attribute,
            comparison: Comparison::Equals(Operand::Text(value.to_string())),
        }
    }
}

/// Maps one option name to predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Option name as registered with Discord
    pub option: &'static str,
    /// Attribute searched
    pub attribute: Attribute,
    /// Comparison used
    pub matcher: Matcher,
    /// Also restrict to units (attack/health only make sense for units)
    pub implies_unit: bool,
}

impl FieldMapping {
    const fn new(option: &'static str, attribute: Attribute, matcher: Matcher) -> Self {
        Self {
            option,
            attribute,
            matcher,
            implies_unit: false,
        }
    }

    const fn unit(option: &'static str, attribute: Attribute, matcher: Matcher) -> Self {
        Self {
            option,
            attribute,
            matcher,
            implies_unit: true,
        }
    }
}

/// How records are turned into a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Image gallery of the first few records, the rest counted
    Gallery,
    /// Title and description of the first record
    Definition,
}

/// Declarative description of one slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTable {
    /// Command name
    pub name: &'static str,
    /// Store searched
    pub store: Store,
    /// Option mappings
    pub fields: &'static [FieldMapping],
    /// Reply layout
    pub presentation: Presentation,
}

const CARD_FIELDS: &[FieldMapping] = &[
    FieldMapping::new("name", Attribute::SearchName, Matcher::ContainsWords),
    FieldMapping::new("description", Attribute::Description, Matcher::ContainsWords),
    FieldMapping::new("level_up", Attribute::LevelupDescription, Matcher::ContainsWords),
    FieldMapping::unit("attack_equals", Attribute::Attack, Matcher::Equals),
    FieldMapping::unit("attack_greater", Attribute::Attack, Matcher::Greater),
    FieldMapping::unit("attack_less", Attribute::Attack, Matcher::Less),
    FieldMapping::unit("health_equals", Attribute::Health, Matcher::Equals),
    FieldMapping::unit("health_greater", Attribute::Health, Matcher::Greater),
    FieldMapping::unit("health_less", Attribute::Health, Matcher::Less),
    FieldMapping::new("cost_equals", Attribute::Cost, Matcher::Equals),
    FieldMapping::new("cost_greater", Attribute::Cost, Matcher::Greater),
    FieldMapping::new("cost_less", Attribute::Cost, Matcher::Less),
    FieldMapping::new("keyword", Attribute::Keywords, Matcher::Contains),
    FieldMapping::new("supertype", Attribute::Supertype, Matcher::Equals),
    FieldMapping::new("type", Attribute::CardType, Matcher::Equals),
    FieldMapping::new("subtype", Attribute::Subtypes, Matcher::Contains),
    FieldMapping::new("region", Attribute::Regions, Matcher::Contains),
    FieldMapping::new("set", Attribute::Set, Matcher::Equals),
    FieldMapping::new("speed", Attribute::SpellSpeed, Matcher::Equals),
    FieldMapping::new("rarity", Attribute::Rarity, Matcher::Equals),
];

const TERM_FIELDS: &[FieldMapping] = &[FieldMapping::new(
    "term",
    Attribute::TermName,
    Matcher::Equals,
)];

/// `/lorcard` - multi-filter card search.
pub const CARD_COMMAND: CommandTable = CommandTable {
    name: "lorcard",
    store: Store::Cards,
    fields: CARD_FIELDS,
    presentation: Presentation::Gallery,
};

/// `/lordefine` - glossary lookup.
pub const DEFINE_COMMAND: CommandTable = CommandTable {
    name: "lordefine",
    store: Store::Terms,
    fields: TERM_FIELDS,
    presentation: Presentation::Definition,
};

/// The set of commands the bot answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRegistry {
    tables: Vec<CommandTable>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new(vec![CARD_COMMAND, DEFINE_COMMAND])
    }
}

impl CommandRegistry {
    /// Registry with exactly these tables.
    #[must_use]
    pub const fn new(tables: Vec<CommandTable>) -> Self {
        Self { tables }
    }

    /// Looks up a command by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CommandTable> {
        self.tables.iter().find(|table| table.name == name)
    }
}

impl CommandTable {
    /// Translates submitted options into predicates.
    ///
    /// Text is lowercased to match the store's search columns. Options the
    /// table does not know are ignored.
    ///
    /// # Errors
    /// Returns `Error::InvalidOption` when a numeric filter gets a non-integer.
    pub fn build_predicates(&self, options: &Options) -> Result<Vec<Predicate>> {
        let mut predicates = Vec::new();
        let mut wants_unit = false;

        for (name, value) in options {
            let Some(mapping) = self.fields.iter().find(|f| f.option == name.as_str()) else {
                debug!(command = self.name, option = %name, "Ignoring unknown option");
                continue;
            };
            wants_unit |= mapping.implies_unit;
            push_predicates(mapping, name, value, &mut predicates)?;
        }

        let unit = Predicate::text_equals(Attribute::CardType, "unit");
        if wants_unit && !predicates.contains(&unit) {
            predicates.push(unit);
        }
        Ok(predicates)
    }
}

fn push_predicates(
    mapping: &FieldMapping,
    name: &str,
    value: &OptionValue,
    predicates: &mut Vec<Predicate>,
) -> Result<()> {
    let attribute = mapping.attribute;
    match mapping.matcher {
        Matcher::ContainsWords => {
            let text = normalise(value);
            predicates.extend(text.split_whitespace().map(|word| Predicate {
                attribute,
                comparison: Comparison::Contains(word.to_string()),
            }));
        }
        Matcher::Contains => predicates.push(Predicate {
            attribute,
            comparison: Comparison::Contains(normalise(value)),
        }),
        Matcher::Equals if attribute.is_numeric() => predicates.push(Predicate {
            attribute,
            comparison: Comparison::Equals(Operand::Number(integer(name, value)?)),
        }),
        Matcher::Equals => predicates.push(Predicate::text_equals(attribute, &normalise(value))),
        Matcher::Greater => predicates.push(Predicate {
            attribute,
            comparison: Comparison::Greater(integer(name, value)?),
        }),
        Matcher::Less => predicates.push(Predicate {
            attribute,
            comparison: Comparison::Less(integer(name, value)?),
        }),
    }
    Ok(())
}

fn normalise(value: &OptionValue) -> String {
    value.to_string().trim().to_lowercase()
}

#[allow(clippy::cast_possible_truncation)]
fn integer(name: &str, value: &OptionValue) -> Result<i64> {
    let parsed = match value {
        OptionValue::Integer(i) => Some(*i),
        OptionValue::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
        OptionValue::Text(s) => s.trim().parse::<i64>().ok(),
        OptionValue::Number(_) | OptionValue::Boolean(_) => None,
    };
    parsed.ok_or_else(|| Error::InvalidOption {
        option: name.to_string(),
        value: value.to_string(),
    })
}
