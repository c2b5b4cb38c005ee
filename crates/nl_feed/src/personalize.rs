use tracing::{debug, info, warn};

use nl_core::prefs::{PrefKey, PreferenceStore};
use nl_extract::FeedEntry;

use crate::api::BackendClient;
use crate::filter::{apply_filter, filter_entries, FeedOutcome, FeedView, RecommendedSet};

/// Runs the homepage personalization pass. Default-open: without a stored
/// user id, or on any backend failure, the feed is left untouched and `None`
/// is returned; filtering must never hide content it cannot restore.
pub struct PersonalizedFeed {
    client: BackendClient,
    page_size: usize,
}

impl PersonalizedFeed {
    pub const DEFAULT_PAGE_SIZE: usize = 50;

    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub async fn run(
        &self,
        prefs: &dyn PreferenceStore,
        entries: &[FeedEntry],
        view: &mut dyn FeedView,
    ) -> Option<FeedOutcome> {
        let user_id = match prefs.get(&[PrefKey::UserId]).await {
            Ok(stored) => stored.user_id,
            Err(e) => {
                warn!("preference read failed, leaving the feed unfiltered: {}", e);
                return None;
            }
        };
        let Some(user_id) = user_id else {
            debug!("no stored user id; showing the full feed");
            return None;
        };

        let recommended = match self
            .client
            .recommended_articles(&user_id, self.page_size)
            .await
        {
            Ok(articles) => {
                RecommendedSet::from_links(articles.iter().map(|a| a.link.as_str()))
            }
            Err(e) => {
                warn!(
                    "recommended-article fetch failed, leaving the feed unfiltered: {}",
                    e
                );
                return None;
            }
        };

        let outcome = filter_entries(entries, &recommended);
        info!(
            "personalized feed: showing {} of {} articles",
            outcome.shown, outcome.total
        );
        apply_filter(&outcome, view);
        Some(outcome)
    }
}
