pub mod chat;
pub mod commands;
pub mod summary;

pub use chat::{PanelMode, PanelSession, MAX_RETAINED_TURNS};
pub use commands::PanelCommand;
pub use summary::{SummaryController, SummaryState, SummaryView};

pub mod prelude {
    pub use super::chat::PanelSession;
    pub use super::commands::PanelCommand;
    pub use super::summary::{SummaryController, SummaryState, SummaryView};
    pub use nl_core::{ArticleSnapshot, Error, Result, SummaryLevel};
}
