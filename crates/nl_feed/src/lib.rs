pub mod api;
pub mod filter;
pub mod personalize;

pub use api::{BackendClient, RecommendedArticle, UserHandle, UserProfile, DEFAULT_BACKEND_URL};
pub use filter::{apply_filter, filter_entries, show_all, FeedOutcome, FeedView, RecommendedSet, Visibility};
pub use personalize::PersonalizedFeed;

pub mod prelude {
    pub use super::api::BackendClient;
    pub use super::filter::{FeedOutcome, FeedView, RecommendedSet};
    pub use super::personalize::PersonalizedFeed;
    pub use nl_core::{Error, Result};
}
