use url::Url;

/// Normalizes a URL for set-membership comparison: the query string (and any
/// fragment) is removed and a trailing slash is stripped. Idempotent.
pub fn normalize(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string().trim_end_matches('/').to_string()
        }
        // Not an absolute URL; fall back to a textual strip so relative
        // hrefs still compare consistently.
        Err(_) => {
            let stripped = raw.trim().split(['?', '#']).next().unwrap_or(raw);
            stripped.trim_end_matches('/').to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_query_and_trailing_slash() {
        assert_eq!(normalize("https://x.com/y?a=1"), normalize("https://x.com/y"));
        assert_eq!(normalize("https://x.com/y/"), normalize("https://x.com/y"));
        assert_eq!(normalize("https://x.com/y?a=1"), normalize("https://x.com/y/"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "https://x.com/y?a=1",
            "https://x.com/y/",
            "https://x.com",
            "/2025/01/post.html?m=1",
            "not a url at all/",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw}");
        }
    }

    #[test]
    fn test_normalize_keeps_distinct_paths_distinct() {
        assert_ne!(normalize("https://x.com/y"), normalize("https://x.com/z"));
    }
}
