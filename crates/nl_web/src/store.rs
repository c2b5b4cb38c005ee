use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nl_core::urls::normalize;
use nl_core::Interest;

/// Job roles accepted by the profile endpoints.
pub const VALID_JOBS: [&str; 6] = [
    "Security Engineer",
    "Software Developer",
    "DevOps/SRE",
    "System Administrator",
    "Security Analyst",
    "Other",
];

pub fn is_valid_job(job: &str) -> bool {
    VALID_JOBS.contains(&job)
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub id: u64,
    pub job: String,
    pub created_at: DateTime<Utc>,
    pub interest_ids: Vec<u32>,
}

/// An article as held by the backend: presentation fields plus the per-job
/// and per-interest relevance scores produced at ingest time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredArticle {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub job_scores: HashMap<String, f64>,
    #[serde(default)]
    pub interest_scores: HashMap<u32, f64>,
}

/// A stored article ranked for one user.
#[derive(Debug, Clone)]
pub struct RankedArticle {
    pub id: u64,
    pub article: StoredArticle,
    pub job_score: f64,
    pub avg_interest_score: f64,
    pub relevance_score: f64,
}

/// In-memory backend state: users, the scored article pool, and the interest
/// taxonomy (external configuration data, loaded at startup).
#[derive(Debug, Default)]
pub struct Backend {
    next_user_id: u64,
    users: HashMap<u64, UserRecord>,
    articles: Vec<(u64, StoredArticle)>,
    next_article_id: u64,
    taxonomy: HashMap<u32, String>,
}

impl Backend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: Vec<StoredArticle>) -> Self {
        let mut backend = Self::new();
        for article in articles {
            backend.insert_article(article);
        }
        backend
    }

    pub fn set_taxonomy(&mut self, interests: Vec<Interest>) {
        self.taxonomy = interests.into_iter().map(|i| (i.id, i.name)).collect();
    }

    pub fn interest_name(&self, id: u32) -> Option<&str> {
        self.taxonomy.get(&id).map(String::as_str)
    }

    /// Resolves a user's interest ids against the taxonomy; ids without a
    /// taxonomy row are omitted, as the original join did.
    pub fn resolve_interests(&self, user: &UserRecord) -> Vec<Interest> {
        let mut interests: Vec<Interest> = user
            .interest_ids
            .iter()
            .filter_map(|id| {
                self.taxonomy.get(id).map(|name| Interest {
                    id: *id,
                    name: name.clone(),
                })
            })
            .collect();
        interests.sort_by_key(|i| i.id);
        interests
    }

    pub fn create_user(&mut self, job: String, interest_ids: Vec<u32>) -> u64 {
        self.next_user_id += 1;
        let id = self.next_user_id;
        self.users.insert(
            id,
            UserRecord {
                id,
                job,
                created_at: Utc::now(),
                interest_ids,
            },
        );
        id
    }

    pub fn get_user(&self, id: u64) -> Option<&UserRecord> {
        self.users.get(&id)
    }

    /// Applies the provided fields; returns false when the user is unknown.
    pub fn update_user(
        &mut self,
        id: u64,
        job: Option<String>,
        interest_ids: Option<Vec<u32>>,
    ) -> bool {
        let Some(user) = self.users.get_mut(&id) else {
            return false;
        };
        if let Some(job) = job {
            user.job = job;
        }
        if let Some(ids) = interest_ids {
            user.interest_ids = ids;
        }
        true
    }

    /// Inserts an article unless its normalized link is already present;
    /// returns the stored id either way.
    pub fn insert_article(&mut self, article: StoredArticle) -> (u64, bool) {
        let link = normalize(&article.link);
        if let Some((id, _)) = self
            .articles
            .iter()
            .find(|(_, existing)| normalize(&existing.link) == link)
        {
            return (*id, false);
        }
        self.next_article_id += 1;
        let id = self.next_article_id;
        self.articles.push((id, article));
        (id, true)
    }

    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    /// Ranks the pool for one user: only articles scored for the user's job
    /// qualify; relevance = job score x 0.4 + average interest score x 0.6,
    /// averaged over the user's own interests (0 when none match).
    pub fn recommended(&self, user: &UserRecord, limit: usize) -> Vec<RankedArticle> {
        let mut ranked: Vec<RankedArticle> = self
            .articles
            .iter()
            .filter_map(|(id, article)| {
                let job_score = *article.job_scores.get(&user.job)?;
                let matched: Vec<f64> = user
                    .interest_ids
                    .iter()
                    .filter_map(|interest| article.interest_scores.get(interest).copied())
                    .collect();
                let avg_interest_score = if matched.is_empty() {
                    0.0
                } else {
                    matched.iter().sum::<f64>() / matched.len() as f64
                };
                let relevance_score = job_score * 0.4 + avg_interest_score * 0.6;
                Some(RankedArticle {
                    id: *id,
                    article: article.clone(),
                    job_score,
                    avg_interest_score,
                    relevance_score,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(limit);
        ranked
    }
}
