//! Reply formatting - records to follow-up content.

use crate::{
    config::settings::Settings,
    core::{filters::Presentation, search::Record},
    interaction::content::{DisplayItem, ReplyContent},
};

/// Builds the follow-up for a successful query.
///
/// An empty record list always produces the command's empty-result notice,
/// never the error notice.
#[must_use]
pub fn render(presentation: Presentation, records: &[Record], settings: &Settings) -> ReplyContent {
    match presentation {
        Presentation::Gallery => gallery(records, settings),
        Presentation::Definition => definition(records, settings),
    }
}

/// Generic failure notice.
#[must_use]
pub fn error_notice(settings: &Settings) -> ReplyContent {
    ReplyContent::notice(settings.messages.error.clone())
}

fn gallery(records: &[Record], settings: &Settings) -> ReplyContent {
    if records.is_empty() {
        return ReplyContent::notice(settings.messages.no_results.clone());
    }

    let shown = &records[..records.len().min(settings.display.max_full_results)];
    let remaining = records.len() - shown.len();

    let mut summary = shown
        .iter()
        .map(|record| record.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if remaining > 0 {
        summary.push_str(&format!(", and {remaining} other results"));
    }

    ReplyContent::Items {
        items: shown
            .iter()
            .map(|record| DisplayItem {
                title: record.name.clone(),
                description: None,
                media: record.media.first().cloned(),
            })
            .collect(),
        summary: Some(summary),
    }
}

fn definition(records: &[Record], settings: &Settings) -> ReplyContent {
    let Some(first) = records.first() else {
        return ReplyContent::notice(settings.messages.unknown_term.clone());
    };

    ReplyContent::Items {
        items: vec![DisplayItem {
            title: first.name.clone(),
            description: first.description.clone(),
            media: first.media.first().cloned(),
        }],
        summary: None,
    }
}
