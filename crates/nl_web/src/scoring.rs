use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use nl_core::{ArticleSnapshot, ConversationTurn, Error, Interest, Result};
use nl_inference::{CompletionModel, CompletionRequest};

const SCORING_MAX_TOKENS: u32 = 800;
const SCORING_TEMPERATURE: f32 = 0.2;
/// Long articles are truncated before scoring, as the original pipeline did.
const SCORING_BODY_LIMIT: usize = 3000;

/// Per-job and per-interest relevance ratings (0-100) for one article.
#[derive(Debug, Default, Clone)]
pub struct ArticleScores {
    pub job_scores: HashMap<String, f64>,
    pub interest_scores: HashMap<u32, f64>,
}

#[derive(Deserialize)]
struct RawScores {
    #[serde(default)]
    job_scores: HashMap<String, f64>,
    #[serde(default)]
    interest_scores: HashMap<String, f64>,
}

/// Rates one article for every job role and interest in a single model call.
/// A failed call surfaces as an error; ingest callers log it and fall back
/// to zero scores so the article stays usable.
pub async fn score_article(
    model: &dyn CompletionModel,
    article: &ArticleSnapshot,
    jobs: &[&str],
    interests: &[Interest],
) -> Result<ArticleScores> {
    let request = scoring_request(article, jobs, interests);
    let reply = model.complete(&request).await?;
    parse_scores(&reply)
}

fn scoring_request(
    article: &ArticleSnapshot,
    jobs: &[&str],
    interests: &[Interest],
) -> CompletionRequest {
    let jobs_list = jobs
        .iter()
        .map(|job| format!("- {}", job))
        .collect::<Vec<_>>()
        .join("\n");
    let interests_list = interests
        .iter()
        .map(|interest| format!("- {}: {}", interest.id, interest.name))
        .collect::<Vec<_>>()
        .join("\n");
    let body: String = article.body_text.chars().take(SCORING_BODY_LIMIT).collect();

    let user_prompt = format!(
        "You are an expert content analyzer. Rate how relevant this article is for \
         different job roles and interests, each on a 0-100 scale.\n\n\
         Article text:\n{}\n\n\
         JOB ROLES:\n{}\n\n\
         INTERESTS (id: name):\n{}\n\n\
         Respond with JSON only, in this exact shape:\n\
         {{\"job_scores\": {{\"<job role>\": <0-100>}}, \
         \"interest_scores\": {{\"<interest id>\": <0-100>}}}}",
        body, jobs_list, interests_list
    );

    let mut request = CompletionRequest::new(
        vec![ConversationTurn::user(user_prompt)],
        SCORING_MAX_TOKENS,
    );
    request.temperature = SCORING_TEMPERATURE;
    request
}

fn parse_scores(reply: &str) -> Result<ArticleScores> {
    // Models occasionally wrap the object in prose; take the outermost braces.
    let start = reply.find('{');
    let end = reply.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(Error::RemoteApi(
            "scoring reply contained no JSON object".to_string(),
        ));
    };
    let raw: RawScores = serde_json::from_str(&reply[start..=end])
        .map_err(|e| Error::RemoteApi(format!("malformed scoring reply: {}", e)))?;

    let mut scores = ArticleScores {
        job_scores: raw.job_scores,
        interest_scores: HashMap::new(),
    };
    for (key, value) in raw.interest_scores {
        match key.trim().parse::<u32>() {
            Ok(id) => {
                scores.interest_scores.insert(id, value);
            }
            Err(_) => debug!("ignoring non-numeric interest key {:?}", key),
        }
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedModel {
        reply: String,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionModel for CannedModel {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete_raw(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn article() -> ArticleSnapshot {
        ArticleSnapshot {
            title: "T".to_string(),
            body_text: "Body.".to_string(),
            source_url: "https://thehackernews.com/2025/11/t.html".to_string(),
        }
    }

    #[tokio::test]
    async fn test_scores_parse_through_fences_and_prose() {
        let model = CannedModel {
            reply: "```\nHere you go: {\"job_scores\": {\"Security Engineer\": 85}, \
                    \"interest_scores\": {\"3\": 70, \"bogus\": 10}}\n```"
                .to_string(),
            requests: Mutex::new(Vec::new()),
        };
        let interests = vec![Interest {
            id: 3,
            name: "Malware Analysis".to_string(),
        }];
        let scores = score_article(&model, &article(), &["Security Engineer"], &interests)
            .await
            .unwrap();
        assert_eq!(scores.job_scores["Security Engineer"], 85.0);
        assert_eq!(scores.interest_scores[&3], 70.0);
        assert_eq!(scores.interest_scores.len(), 1);

        let request = model.requests.lock().unwrap().pop().unwrap();
        assert!(request.messages[0].content.contains("- 3: Malware Analysis"));
        assert_eq!(request.temperature, SCORING_TEMPERATURE);
    }

    #[tokio::test]
    async fn test_reply_without_json_is_an_error() {
        let model = CannedModel {
            reply: "I cannot rate this article.".to_string(),
            requests: Mutex::new(Vec::new()),
        };
        let err = score_article(&model, &article(), &[], &[]).await.unwrap_err();
        assert!(matches!(err, Error::RemoteApi(_)));
    }
}
