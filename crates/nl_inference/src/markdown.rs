use regex::Regex;

/// Cleans a raw model completion for direct HTML rendering: strips
/// leading/trailing Markdown code fences and converts any bold markers the
/// model emitted despite the HTML-only instruction.
pub fn clean_model_html(raw: &str) -> String {
    let mut text = raw.trim();

    for fence in ["```html", "```"] {
        if let Some(rest) = text.strip_prefix(fence) {
            text = rest.trim_start();
            break;
        }
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    let bold = Regex::new(r"\*\*([^*]+)\*\*").unwrap();
    bold.replace_all(text, "<strong>$1</strong>").into_owned()
}
