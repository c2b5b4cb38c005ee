use url::Url;

/// The news site this pipeline augments.
pub const SITE_HOST: &str = "thehackernews.com";
pub const SITE_URL: &str = "https://thehackernews.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// A single-article page, recognized by its year-prefixed path
    /// (e.g. `/2025/11/some-story.html`).
    Article,
    /// The homepage listing.
    Home,
    Other,
}

pub fn classify(url: &str) -> PageKind {
    let Ok(parsed) = Url::parse(url) else {
        return PageKind::Other;
    };
    let on_site = parsed
        .host_str()
        .map(|host| host == SITE_HOST || host.ends_with(&format!(".{}", SITE_HOST)))
        .unwrap_or(false);
    if !on_site {
        return PageKind::Other;
    }

    let mut segments = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter();

    match segments.next() {
        None => PageKind::Home,
        Some(first) if first.len() == 4 && first.bytes().all(|b| b.is_ascii_digit()) => {
            PageKind::Article
        }
        _ => PageKind::Other,
    }
}
