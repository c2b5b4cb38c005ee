use nl_core::{ArticleSnapshot, Result};
use scraper::{Html, Selector};

/// Literal fallback used when neither the designated title element nor a
/// top-level heading is present.
pub const TITLE_PLACEHOLDER: &str = "this article";

const TITLE_SELECTOR: &str = ".story-title";
const HEADING_SELECTOR: &str = "h1";
const BODY_PARAGRAPH_SELECTOR: &str = ".articlebody p";

/// Extracts an [`ArticleSnapshot`] from raw HTML. Pure read: an absent body
/// container yields an empty `body_text`, which callers treat as "nothing to
/// summarize" and skip downstream work silently.
pub fn extract_article(html: &str, url: &str) -> ArticleSnapshot {
    let document = Html::parse_document(html);

    let title = first_text(&document, TITLE_SELECTOR)
        .or_else(|| first_text(&document, HEADING_SELECTOR))
        .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string());

    let paragraph_selector = Selector::parse(BODY_PARAGRAPH_SELECTOR).unwrap();
    let body_text = document
        .select(&paragraph_selector)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    ArticleSnapshot {
        title,
        body_text,
        source_url: url.to_string(),
    }
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Fetches an article page and extracts its snapshot.
pub async fn fetch_article(client: &reqwest::Client, url: &str) -> Result<ArticleSnapshot> {
    let html = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(extract_article(&html, url))
}
