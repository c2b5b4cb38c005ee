pub mod error;
pub mod prefs;
pub mod types;
pub mod urls;

pub use error::Error;
pub use types::{ArticleSnapshot, ConversationTurn, Interest, Role, SummaryLevel, SummaryResult};
pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::prefs::{PrefChange, PrefKey, PrefUpdate, PreferenceStore};
    pub use super::types::{ArticleSnapshot, ConversationTurn, Role, SummaryLevel, SummaryResult};
    pub use super::{Error, Result};
}
