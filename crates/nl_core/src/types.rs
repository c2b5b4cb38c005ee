use serde::{Deserialize, Serialize};

/// Extracted content of a single article page. Immutable once extracted;
/// an empty `body_text` means "nothing to summarize", never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSnapshot {
    pub title: String,
    pub body_text: String,
    pub source_url: String,
}

impl ArticleSnapshot {
    pub fn has_body(&self) -> bool {
        !self.body_text.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.body_text.split_whitespace().count()
    }
}

/// User-chosen verbosity setting. Serialized as its integer value so it can
/// live next to the other persisted settings keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SummaryLevel {
    /// Full article, no summary.
    Full,
    #[default]
    Medium,
    Brief,
}

impl SummaryLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            SummaryLevel::Full => "full article",
            SummaryLevel::Medium => "medium summary",
            SummaryLevel::Brief => "brief summary",
        }
    }
}

impl From<SummaryLevel> for u8 {
    fn from(level: SummaryLevel) -> u8 {
        level as u8
    }
}

impl TryFrom<u8> for SummaryLevel {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(SummaryLevel::Full),
            1 => Ok(SummaryLevel::Medium),
            2 => Ok(SummaryLevel::Brief),
            other => Err(format!("summary level must be 0, 1 or 2, got {}", other)),
        }
    }
}

/// An AI-generated summary for the current page, cached for the page's
/// lifetime keyed by level. Never persisted across page loads.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryResult {
    pub level: SummaryLevel,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One exchange entry in the chat/explain panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// An interest-taxonomy row. The taxonomy content itself is external
/// configuration data; ids are treated as opaque everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    pub id: u32,
    pub name: String,
}
