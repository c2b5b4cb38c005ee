use std::path::PathBuf;

use nl_feed::DEFAULT_BACKEND_URL;
use nl_inference::PLACEHOLDER_API_KEY;

/// Runtime configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// LLM API credential. Defaults to the placeholder sentinel, which makes
    /// every completion call fail with a setup instruction.
    pub api_key: String,
    pub model: String,
    pub backend_url: String,
    pub prefs_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("NEWSLENS_API_KEY")
                .unwrap_or_else(|_| PLACEHOLDER_API_KEY.to_string()),
            model: std::env::var("NEWSLENS_MODEL")
                .unwrap_or_else(|_| nl_inference::client::DEFAULT_MODEL.to_string()),
            backend_url: std::env::var("NEWSLENS_BACKEND_URL")
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            prefs_path: std::env::var("NEWSLENS_PREFS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("newslens-prefs.json")),
        }
    }
}
