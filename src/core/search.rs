//! Query executor - runs predicate lists against the card and term tables.
//!
//! The store is read-only at request time. Reads are idempotent, so concurrent
//! redeliveries need no coordination.

use crate::{
    core::filters::{Attribute, Comparison, Operand, Predicate, Store},
    entities::{Card, Term, card, term},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::{LikeExpr, SimpleExpr},
};
use tracing::debug;

/// A matched record, as much of it as the reply needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Display name
    pub name: String,
    /// Text shown under the name, if any
    pub description: Option<String>,
    /// Image URLs
    pub media: Vec<String>,
}

/// Data-store search capability.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Returns every record in `store` matching all `predicates`.
    async fn search(&self, store: Store, predicates: &[Predicate]) -> Result<Vec<Record>>;
}

/// `QueryExecutor` over the `SeaORM` card database.
#[derive(Debug, Clone)]
pub struct SeaOrmExecutor {
    db: DatabaseConnection,
}

impl SeaOrmExecutor {
    /// Executor reading from `db`.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QueryExecutor for SeaOrmExecutor {
    async fn search(&self, store: Store, predicates: &[Predicate]) -> Result<Vec<Record>> {
        debug!(?store, predicates = predicates.len(), "Running search");
        match store {
            Store::Cards => search_cards(&self.db, predicates).await,
            Store::Terms => search_terms(&self.db, predicates).await,
        }
    }
}

async fn search_cards(db: &DatabaseConnection, predicates: &[Predicate]) -> Result<Vec<Record>> {
    let mut condition = Condition::all();
    for predicate in predicates {
        condition = condition.add(expression(card_column(predicate)?, &predicate.comparison));
    }

    let cards = Card::find()
        .filter(condition)
        .order_by_asc(card::Column::Name)
        .all(db)
        .await?;

    Ok(cards.into_iter().map(Record::from).collect())
}

async fn search_terms(db: &DatabaseConnection, predicates: &[Predicate]) -> Result<Vec<Record>> {
    let mut condition = Condition::all();
    for predicate in predicates {
        condition = condition.add(expression(term_column(predicate)?, &predicate.comparison));
    }

    let terms = Term::find()
        .filter(condition)
        .order_by_asc(term::Column::Name)
        .all(db)
        .await?;

    Ok(terms.into_iter().map(Record::from).collect())
}

fn card_column(predicate: &Predicate) -> Result<card::Column> {
    Ok(match predicate.attribute {
        Attribute::SearchName => card::Column::SearchName,
        Attribute::Description => card::Column::Description,
        Attribute::LevelupDescription => card::Column::LevelupDescription,
        Attribute::Attack => card::Column::Attack,
        Attribute::Health => card::Column::Health,
        Attribute::Cost => card::Column::Cost,
        Attribute::Keywords => card::Column::Keywords,
        Attribute::Supertype => card::Column::Supertype,
        Attribute::CardType => card::Column::CardType,
        Attribute::Subtypes => card::Column::Subtypes,
        Attribute::Regions => card::Column::Regions,
        Attribute::Set => card::Column::CardSet,
        Attribute::SpellSpeed => card::Column::SpellSpeed,
        Attribute::Rarity => card::Column::Rarity,
        Attribute::TermName => return Err(unsupported(predicate, Store::Cards)),
    })
}

fn term_column(predicate: &Predicate) -> Result<term::Column> {
    match predicate.attribute {
        Attribute::TermName => Ok(term::Column::SearchName),
        _ => Err(unsupported(predicate, Store::Terms)),
    }
}

fn unsupported(predicate: &Predicate, store: Store) -> Error {
    Error::InvalidQuery {
        message: format!("{:?} cannot be searched in {store:?}", predicate.attribute),
    }
}

fn expression<C: ColumnTrait>(column: C, comparison: &Comparison) -> SimpleExpr {
    match comparison {
        Comparison::Contains(text) => column.like(contains_pattern(text)),
        Comparison::Equals(Operand::Text(text)) => column.eq(text.as_str()),
        Comparison::Equals(Operand::Number(n)) => column.eq(*n),
        Comparison::Greater(n) => column.gt(*n),
        Comparison::Less(n) => column.lt(*n),
    }
}

/// `LIKE` pattern matching `text` literally anywhere in the value.
fn contains_pattern(text: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}

impl From<card::Model> for Record {
    fn from(card: card::Model) -> Self {
        let media = if card.image_url.is_empty() {
            Vec::new()
        } else {
            vec![card.image_url]
        };
        Self {
            name: card.name,
            description: None,
            media,
        }
    }
}

impl From<term::Model> for Record {
    fn from(term: term::Model) -> Self {
        Self {
            name: term.name,
            description: Some(term.description),
            media: Vec::new(),
        }
    }
}
