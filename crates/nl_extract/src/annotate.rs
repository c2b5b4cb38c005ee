use regex::Regex;

/// Average adult reading speed used for the estimate.
const WORDS_PER_MINUTE: usize = 200;

/// Keywords highlighted on article pages.
pub const DEFAULT_KEYWORDS: [&str; 4] = ["security", "privacy", "AI", "crypto"];

/// Estimated reading time in whole minutes, never less than one.
pub fn reading_time(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    (words.div_ceil(WORDS_PER_MINUTE)).max(1) as u32
}

/// Wraps whole-word, case-insensitive keyword matches in a highlight span.
/// Callers pass raw text once; the output is presentation markup.
pub fn highlight_keywords(text: &str, keywords: &[&str]) -> String {
    let mut output = text.to_string();
    for keyword in keywords {
        let pattern = format!(r"(?i)\b({})\b", regex::escape(keyword));
        let re = Regex::new(&pattern).unwrap();
        output = re
            .replace_all(&output, r#"<span class="highlight-keyword">$1</span>"#)
            .into_owned();
    }
    output
}
