use nl_core::Result;
use scraper::{Html, Selector};
use serde::Serialize;

/// One homepage story entry, in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub url: String,
    pub title: String,
    /// Teaser text shown under the headline; empty when the entry has none.
    pub description: String,
}

/// Parses the homepage listing into its story entries.
pub fn parse_feed(html: &str) -> Vec<FeedEntry> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a.story-link").unwrap();
    let title_selector = Selector::parse(".home-title").unwrap();
    let desc_selector = Selector::parse(".home-desc").unwrap();

    let mut entries = Vec::new();
    for link in document.select(&link_selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let title = link
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        let description = link
            .select(&desc_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        entries.push(FeedEntry {
            url: href.to_string(),
            title,
            description,
        });
    }
    entries
}

/// Fetches the homepage and parses its story entries.
pub async fn fetch_feed(client: &reqwest::Client, base_url: &str) -> Result<Vec<FeedEntry>> {
    let html = client
        .get(base_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(parse_feed(&html))
}
