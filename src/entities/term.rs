//! Term entity - Glossary entries (keywords and game vocabulary) for `lordefine`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Term database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "terms")]
pub struct Model {
    /// Lowercase lookup key
    #[sea_orm(primary_key, auto_increment = false)]
    pub search_name: String,
    /// Display name (e.g., "Elusive")
    pub name: String,
    /// Definition text
    pub description: String,
}

/// `Term` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
