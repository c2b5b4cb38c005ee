use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use nl_core::{ConversationTurn, Error, Result};

use crate::markdown::clean_model_html;

/// Sentinel shipped in place of a real credential. Any call made with it
/// fails before network traffic with a setup instruction.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ConversationTurn>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ConversationTurn>, max_tokens: u32) -> Self {
        Self {
            messages,
            max_tokens,
            temperature: crate::prompts::DEFAULT_TEMPERATURE,
        }
    }
}

/// A chat-completion model. Stateless: every call is independent and no
/// retries are performed here; failures surface to the caller, which may
/// offer a manual retry affordance.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    fn name(&self) -> &str;

    /// The completion text exactly as returned by the backing model.
    async fn complete_raw(&self, request: &CompletionRequest) -> Result<String>;

    /// A completion with fence/bold cleanup applied on every success.
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        Ok(clean_model_html(&self.complete_raw(request).await?))
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

pub struct OpenAiModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiModel {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn check_credential(&self) -> Result<()> {
        if self.api_key.trim().is_empty() || self.api_key == PLACEHOLDER_API_KEY {
            return Err(Error::Configuration(
                "no API key configured; set NEWSLENS_API_KEY to enable summaries and chat"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl CompletionModel for OpenAiModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete_raw(&self, request: &CompletionRequest) -> Result<String> {
        self.check_credential()?;

        let body = ChatRequest {
            model: &self.model,
            messages: request
                .messages
                .iter()
                .map(|turn| ChatMessage {
                    role: turn.role.as_str(),
                    content: &turn.content,
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| format!("API request failed with status {}", status));
            return Err(Error::RemoteApi(message));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::RemoteApi(format!("malformed completion payload: {}", e)))?;

        payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::RemoteApi("completion payload contained no choices".to_string()))
    }
}
