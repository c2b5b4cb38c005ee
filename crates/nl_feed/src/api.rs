use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use nl_core::{Error, Interest, Result};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// HTTP client for the local personalization backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct CreateUserBody<'a> {
    job: &'a str,
    interest_ids: &'a [u32],
}

#[derive(Serialize)]
struct UpdateUserBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    job: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interest_ids: Option<&'a [u32]>,
}

#[derive(Debug, Deserialize)]
pub struct UserHandle {
    #[serde(rename = "userId")]
    pub user_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub job: String,
    #[serde(default)]
    pub interests: Vec<Interest>,
}

/// One server-recommended article. Only the link participates in filtering;
/// the rest is presentation data.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendedArticle {
    pub link: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn create_user(&self, job: &str, interest_ids: &[u32]) -> Result<UserHandle> {
        let response = self
            .client
            .post(format!("{}/user", self.base_url))
            .json(&CreateUserBody { job, interest_ids })
            .send()
            .await?;
        parse(response).await
    }

    pub async fn update_user(
        &self,
        user_id: &str,
        job: Option<&str>,
        interest_ids: Option<&[u32]>,
    ) -> Result<UserHandle> {
        let response = self
            .client
            .patch(format!("{}/user/{}", self.base_url, user_id))
            .json(&UpdateUserBody { job, interest_ids })
            .send()
            .await?;
        parse(response).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserProfile> {
        let response = self
            .client
            .get(format!("{}/user/{}", self.base_url, user_id))
            .send()
            .await?;
        parse(response).await
    }

    /// The recommended-article list for a user, bounded by `limit`.
    pub async fn recommended_articles(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<RecommendedArticle>> {
        let response = self
            .client
            .get(format!("{}/articles", self.base_url))
            .query(&[("userId", user_id), ("limit", &limit.to_string())])
            .send()
            .await?;
        parse(response).await
    }
}

/// Maps non-success responses to [`Error::RemoteApi`] (passing the
/// server-supplied `error` message through when present) and decodes the
/// success payload, treating a malformed body as a remote failure too.
async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| format!("backend request failed with status {}", status));
        return Err(Error::RemoteApi(message));
    }
    response
        .json()
        .await
        .map_err(|e| Error::RemoteApi(format!("malformed backend payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_backend_is_a_network_error() {
        let client = BackendClient::new("http://127.0.0.1:1");
        let err = client.recommended_articles("1", 50).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)), "got {err:?}");
    }

    #[test]
    fn test_recommended_article_tolerates_extra_fields() {
        let json = r#"{
            "id": 3,
            "link": "https://thehackernews.com/2025/11/a.html",
            "title": "A",
            "relevance_score": 85.5,
            "job_score": 75.0,
            "imageUrl": "https://img"
        }"#;
        let article: RecommendedArticle = serde_json::from_str(json).unwrap();
        assert_eq!(article.link, "https://thehackernews.com/2025/11/a.html");
        assert_eq!(article.relevance_score, Some(85.5));
    }
}
