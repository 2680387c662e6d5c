//! Card entity - One collectible card as written by the data-load job.
//!
//! Every searchable text column is stored lowercase so that user input can be
//! matched after a plain `to_lowercase()`. List-valued attributes (keywords,
//! subtypes, regions) are stored as comma-separated lowercase refs.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Card database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    /// Game card code (e.g., "01IO012")
    #[sea_orm(primary_key, auto_increment = false)]
    pub card_code: String,
    /// Display name with original casing (e.g., "Statikk Shock")
    pub name: String,
    /// Lowercase name used for `contains` matching
    pub search_name: String,
    /// Lowercase rules text
    pub description: String,
    /// Lowercase level-up text, empty for non-champions
    pub levelup_description: String,
    /// Attack value, 0 for non-units
    pub attack: i32,
    /// Mana cost
    pub cost: i32,
    /// Health value, 0 for non-units
    pub health: i32,
    /// Comma-separated keyword refs (e.g., "elusive,fast")
    pub keywords: String,
    /// Lowercase supertype (e.g., "champion"), empty when none
    pub supertype: String,
    /// Lowercase card type (e.g., "unit", "spell")
    #[sea_orm(column_name = "type")]
    pub card_type: String,
    /// Comma-separated lowercase subtypes
    pub subtypes: String,
    /// Comma-separated region refs (e.g., "piltoverzaun")
    pub regions: String,
    /// Lowercase set ref (e.g., "set1")
    #[sea_orm(column_name = "set")]
    pub card_set: String,
    /// Lowercase spell speed ref, empty for non-spells
    pub spell_speed: String,
    /// Lowercase rarity ref (e.g., "common")
    pub rarity: String,
    /// Full card art URL shown in embeds
    pub image_url: String,
    /// Whether the card can be put in a deck
    pub collectible: bool,
}

/// Cards have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
