use std::sync::Arc;

use tracing::debug;

use nl_core::{ArticleSnapshot, ConversationTurn, Result};
use nl_inference::{prompts, CompletionModel};

/// How the panel was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    /// Open-ended Q&A seeded with the full article.
    Chat,
    /// One-shot simplification of a selected fragment.
    Explain,
}

/// Upper bound on retained turns (12 exchanges). Once exceeded, the oldest
/// exchange pair is dropped before the next send.
pub const MAX_RETAINED_TURNS: usize = 24;

/// One open panel's conversation. Owns its history outright, so several
/// panels can coexist and nothing leaks across pages. The history lives only
/// as long as the session; closing the panel drops it.
pub struct PanelSession {
    mode: PanelMode,
    article: ArticleSnapshot,
    turns: Vec<ConversationTurn>,
    model: Arc<dyn CompletionModel>,
}

impl PanelSession {
    pub fn chat(model: Arc<dyn CompletionModel>, article: ArticleSnapshot) -> Self {
        Self {
            mode: PanelMode::Chat,
            article,
            turns: Vec::new(),
            model,
        }
    }

    pub fn mode(&self) -> PanelMode {
        self.mode
    }

    pub fn article(&self) -> &ArticleSnapshot {
        &self.article
    }

    /// Accumulated user/assistant turns (the article-seeded system turn is
    /// rebuilt per request and never stored).
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Sends a user message with the article context and the accumulated
    /// history; appends the exchange on success.
    pub async fn send(&mut self, message: &str) -> Result<String> {
        let request = prompts::chat_request(&self.article, &self.turns, message);
        let reply = self.model.complete(&request).await?;
        self.push_exchange(ConversationTurn::user(message), reply.clone());
        Ok(reply)
    }

    /// Explains a selected fragment in simple terms. The exchange is kept in
    /// the history so follow-up questions can refer back to it.
    pub async fn explain(&mut self, selection: &str) -> Result<String> {
        self.mode = PanelMode::Explain;
        let request = prompts::explain_request(&self.article, selection);
        let reply = self.model.complete(&request).await?;
        self.push_exchange(
            ConversationTurn::user(format!("Explain this: \"{}\"", selection)),
            reply.clone(),
        );
        Ok(reply)
    }

    fn push_exchange(&mut self, user: ConversationTurn, reply: String) {
        self.turns.push(user);
        self.turns.push(ConversationTurn::assistant(reply));
        while self.turns.len() > MAX_RETAINED_TURNS {
            debug!("trimming oldest panel exchange");
            self.turns.drain(0..2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nl_core::Role;
    use nl_inference::CompletionRequest;
    use std::sync::Mutex;

    struct EchoModel {
        requests: Mutex<Vec<CompletionRequest>>,
        reply: String,
    }

    impl EchoModel {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            })
        }

        fn last_request(&self) -> CompletionRequest {
            self.requests.lock().unwrap().last().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete_raw(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn article() -> ArticleSnapshot {
        ArticleSnapshot {
            title: "T".to_string(),
            body_text: "Body of the article.".to_string(),
            source_url: "https://thehackernews.com/2025/11/t.html".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_appends_alternating_exchange() {
        let model = EchoModel::new("<p>answer</p>");
        let mut session = PanelSession::chat(model.clone(), article());

        session.send("what happened?").await.unwrap();
        session.send("and then?").await.unwrap();

        let turns = session.turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[2].role, Role::User);
        assert_eq!(turns[3].role, Role::Assistant);

        // The second request must carry the first exchange as context.
        let request = model.last_request();
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].content, "what happened?");
    }

    #[tokio::test]
    async fn test_failed_send_leaves_history_untouched() {
        struct FailModel;

        #[async_trait]
        impl CompletionModel for FailModel {
            fn name(&self) -> &str {
                "fail"
            }

            async fn complete_raw(&self, _request: &CompletionRequest) -> Result<String> {
                Err(nl_core::Error::RemoteApi("down".to_string()))
            }
        }

        let mut session = PanelSession::chat(Arc::new(FailModel), article());
        assert!(session.send("hello").await.is_err());
        assert!(session.turns().is_empty());
    }

    #[tokio::test]
    async fn test_explain_switches_mode_and_keeps_followup_context() {
        let model = EchoModel::new("<p>simple</p>");
        let mut session = PanelSession::chat(model.clone(), article());

        let reply = session.explain("TLS handshake").await.unwrap();
        assert_eq!(reply, "<p>simple</p>");
        assert_eq!(session.mode(), PanelMode::Explain);
        assert_eq!(session.turns().len(), 2);
        assert!(session.turns()[0].content.contains("TLS handshake"));

        // A follow-up question sees the explanation in its history.
        session.send("why does that matter?").await.unwrap();
        let request = model.last_request();
        assert!(request
            .messages
            .iter()
            .any(|turn| turn.content.contains("Explain this: \"TLS handshake\"")));
    }

    #[tokio::test]
    async fn test_markdown_bold_is_converted_in_replies() {
        let model = EchoModel::new("The **key** point");
        let mut session = PanelSession::chat(model, article());

        let reply = session.send("summarize").await.unwrap();
        assert_eq!(reply, "The <strong>key</strong> point");

        let explained = session.explain("key").await.unwrap();
        assert_eq!(explained, "The <strong>key</strong> point");
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let model = EchoModel::new("a");
        let mut session = PanelSession::chat(model.clone(), article());

        for i in 0..20 {
            session.send(&format!("q{i}")).await.unwrap();
        }
        assert_eq!(session.turns().len(), MAX_RETAINED_TURNS);
        // Oldest exchanges were dropped.
        assert_eq!(session.turns()[0].content, "q8");
    }
}
