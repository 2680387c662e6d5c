//! Command pipeline - options to predicates to records to reply.
//!
//! Shared by the Lambda dispatcher and the gateway bot. It never talks to
//! Discord; callers decide what to do with a failure.

use crate::{
    config::settings::Settings,
    core::{filters::CommandRegistry, format, search::QueryExecutor},
    errors::{Error, Result},
    interaction::{content::ReplyContent, envelope::Options},
};
use std::sync::Arc;
use tracing::{debug, info};

/// Generic handler for every registered command table.
pub struct CommandPipeline {
    executor: Arc<dyn QueryExecutor>,
    registry: CommandRegistry,
    settings: Settings,
}

impl CommandPipeline {
    /// Pipeline answering the commands in `registry`.
    #[must_use]
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        registry: CommandRegistry,
        settings: Settings,
    ) -> Self {
        Self {
            executor,
            registry,
            settings,
        }
    }

    /// Runs `command` with `options` and formats the result.
    ///
    /// # Errors
    /// Returns an error for an unknown command, an invalid option value or a
    /// failed query. An empty result is not an error.
    pub async fn answer(&self, command: &str, options: &Options) -> Result<ReplyContent> {
        let table = self
            .registry
            .find(command)
            .ok_or_else(|| Error::UnknownCommand {
                name: command.to_string(),
            })?;

        let predicates = table.build_predicates(options)?;
        debug!(command, ?predicates, "Filters compiled, running search");

        let records = self.executor.search(table.store, &predicates).await?;
        info!(command, count = records.len(), "Search completed");

        Ok(format::render(table.presentation, &records, &self.settings))
    }

    /// Notice sent when `answer` fails.
    #[must_use]
    pub fn error_notice(&self) -> ReplyContent {
        format::error_notice(&self.settings)
    }
}
