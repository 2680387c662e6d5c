//! Follow-up content, independent of how it is rendered for Discord.

/// One displayed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    /// Title or label
    pub title: String,
    /// Optional body text
    pub description: Option<String>,
    /// Optional image URL
    pub media: Option<String>,
}

/// Payload of the single follow-up sent for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyContent {
    /// Formatted records
    Items {
        /// Records shown in full
        items: Vec<DisplayItem>,
        /// Summary line sent as message text
        summary: Option<String>,
    },
    /// Plain message for empty results and errors
    Notice {
        /// Message text
        text: String,
        /// Only visible to the invoking user
        ephemeral: bool,
    },
}

impl ReplyContent {
    /// Ephemeral notice.
    #[must_use]
    pub fn notice(text: impl Into<String>) -> Self {
        Self::Notice {
            text: text.into(),
            ephemeral: true,
        }
    }

    /// Text part of the reply, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Items { summary, .. } => summary.as_deref(),
            Self::Notice { text, .. } => Some(text),
        }
    }

    /// Media references carried by the reply.
    #[must_use]
    pub fn media(&self) -> Vec<&str> {
        match self {
            Self::Items { items, .. } => items.iter().filter_map(|i| i.media.as_deref()).collect(),
            Self::Notice { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_is_ephemeral() {
        let notice = ReplyContent::notice("No results found");
        assert_eq!(notice.text(), Some("No results found"));
        assert!(matches!(notice, ReplyContent::Notice { ephemeral: true, .. }));
        assert!(notice.media().is_empty());
    }

    #[test]
    fn test_items_expose_summary_and_media() {
        let content = ReplyContent::Items {
            items: vec![
                DisplayItem {
                    title: "Elusive".to_string(),
                    description: Some("Can only be blocked by an Elusive unit.".to_string()),
                    media: None,
                },
                DisplayItem {
                    title: "Teemo".to_string(),
                    description: None,
                    media: Some("https://cdn.example/teemo.png".to_string()),
                },
            ],
            summary: Some("Teemo".to_string()),
        };
        assert_eq!(content.text(), Some("Teemo"));
        assert_eq!(content.media(), vec!["https://cdn.example/teemo.png"]);
    }
}
