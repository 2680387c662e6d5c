//! Core business logic - framework-agnostic command tables, store queries and
//! reply formatting.

/// Option-to-predicate tables, one per command
pub mod filters;
/// Record-to-reply formatting
pub mod format;
/// Generic command handler tying the other modules together
pub mod pipeline;
/// Query executor over the card database
pub mod search;
