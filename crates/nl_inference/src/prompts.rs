use nl_core::{ArticleSnapshot, ConversationTurn, SummaryLevel};

use crate::client::CompletionRequest;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const MEDIUM_SUMMARY_MAX_TOKENS: u32 = 500;
pub const BRIEF_SUMMARY_MAX_TOKENS: u32 = 250;
pub const CHAT_MAX_TOKENS: u32 = 500;
pub const EXPLAIN_MAX_TOKENS: u32 = 300;

const SUMMARY_SYSTEM_PROMPT: &str = "You are an assistant that summarizes news articles. \
Respond with semantic HTML only: <p> for paragraphs and <ul>/<li> for bullet lists. \
Wrap key entities, numbers, and technical terms in <strong> tags. Do not use Markdown.";

const EXPLAIN_SYSTEM_PROMPT: &str = "You are a helpful assistant that explains technical \
topics in simple, concise terms. Format your response with HTML: use <strong> for important \
terms and <ul>/<li> for bullet points, and keep explanations brief (3-4 sentences max). \
Be clear and direct.";

/// The prompt pair for a summary at the given level, or `None` for
/// [`SummaryLevel::Full`], which never produces a request.
pub fn summary_request(article: &ArticleSnapshot, level: SummaryLevel) -> Option<CompletionRequest> {
    let (instructions, max_tokens) = match level {
        SummaryLevel::Full => return None,
        SummaryLevel::Medium => (
            "Summarize the following article in 150-200 words. Start with a short overview \
             paragraph, follow it with 3-5 bullet points covering the key details, and end \
             with a one-sentence conclusion.",
            MEDIUM_SUMMARY_MAX_TOKENS,
        ),
        SummaryLevel::Brief => (
            "Summarize the following article in 50-75 words. Keep the structure minimal: \
             a single short paragraph, with at most one list if strictly necessary.",
            BRIEF_SUMMARY_MAX_TOKENS,
        ),
    };

    let user_prompt = format!(
        "{}\n\nArticle Title: \"{}\"\n\nArticle Content:\n{}",
        instructions, article.title, article.body_text
    );

    Some(CompletionRequest::new(
        vec![
            ConversationTurn::system(SUMMARY_SYSTEM_PROMPT),
            ConversationTurn::user(user_prompt),
        ],
        max_tokens,
    ))
}

/// System turn that seeds a chat panel with the full article as context.
pub fn chat_system_turn(article: &ArticleSnapshot) -> ConversationTurn {
    ConversationTurn::system(format!(
        "You are a helpful AI assistant. You have read the following article and can answer \
         questions about it. Format your responses with HTML: use <strong> for important terms, \
         <ul> and <li> for bullet points when appropriate.\n\n\
         Article Title: \"{}\"\n\n\
         Article Content:\n{}\n\n\
         Answer questions based on the article content. Be concise but thorough. If the \
         question is not directly related to the article, you can still answer it helpfully, \
         but try to relate it to the article when possible.",
        article.title, article.body_text
    ))
}

/// A chat turn: the article-seeded system turn, the accumulated history, and
/// the new user message.
pub fn chat_request(
    article: &ArticleSnapshot,
    history: &[ConversationTurn],
    message: &str,
) -> CompletionRequest {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(chat_system_turn(article));
    messages.extend_from_slice(history);
    messages.push(ConversationTurn::user(message));
    CompletionRequest::new(messages, CHAT_MAX_TOKENS)
}

/// A one-shot "explain this selection" request seeded with the article
/// context.
pub fn explain_request(article: &ArticleSnapshot, selection: &str) -> CompletionRequest {
    let user_prompt = format!(
        "Article context:\n{}\n\nSelected text: \"{}\"\n\nExplain this briefly in simple \
         terms with HTML formatting. Use bold for key terms and bullet points where helpful.",
        article.body_text, selection
    );
    CompletionRequest::new(
        vec![
            ConversationTurn::system(EXPLAIN_SYSTEM_PROMPT),
            ConversationTurn::user(user_prompt),
        ],
        EXPLAIN_MAX_TOKENS,
    )
}
