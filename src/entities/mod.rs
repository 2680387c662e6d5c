//! Entity module - Contains all SeaORM entity definitions for the database.
//! The runtime only reads these tables; the data-load job owns the writes.

pub mod card;
pub mod term;

// Re-export specific types to avoid conflicts
pub use card::{Column as CardColumn, Entity as Card, Model as CardModel};
pub use term::{Column as TermColumn, Entity as Term, Model as TermModel};
