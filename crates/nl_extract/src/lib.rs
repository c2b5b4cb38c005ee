pub mod annotate;
pub mod extract;
pub mod feed;
pub mod pages;

pub use annotate::{highlight_keywords, reading_time, DEFAULT_KEYWORDS};
pub use extract::{extract_article, fetch_article, TITLE_PLACEHOLDER};
pub use feed::{fetch_feed, parse_feed, FeedEntry};
pub use pages::{classify, PageKind, SITE_HOST, SITE_URL};

pub mod prelude {
    pub use super::extract::extract_article;
    pub use super::feed::{parse_feed, FeedEntry};
    pub use super::pages::{classify, PageKind};
    pub use nl_core::{ArticleSnapshot, Error, Result};
}
