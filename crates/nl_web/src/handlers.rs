use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::store::{is_valid_job, StoredArticle, VALID_JOBS};
use crate::AppState;

fn error_response(status: StatusCode, message: impl Into<String>) -> impl IntoResponse {
    (status, Json(json!({ "error": message.into() })))
}

fn invalid_job_message() -> String {
    format!("Invalid job. Must be one of: {}", VALID_JOBS.join(", "))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub job: Option<String>,
    #[serde(default)]
    pub interest_ids: Vec<u32>,
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let Some(job) = body.job else {
        return error_response(StatusCode::BAD_REQUEST, "job is required").into_response();
    };
    if !is_valid_job(&job) {
        return error_response(StatusCode::BAD_REQUEST, invalid_job_message()).into_response();
    }

    let id = state
        .backend
        .write()
        .await
        .create_user(job, body.interest_ids);
    info!("created user {}", id);
    (StatusCode::CREATED, Json(json!({ "userId": id }))).into_response()
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let backend = state.backend.read().await;
    let Some(user) = backend.get_user(id) else {
        return error_response(StatusCode::NOT_FOUND, "User not found").into_response();
    };
    let interests = backend.resolve_interests(user);
    Json(json!({
        "id": user.id,
        "job": user.job,
        "created_at": user.created_at.to_rfc3339(),
        "interests": interests,
    }))
    .into_response()
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub job: Option<String>,
    pub interest_ids: Option<Vec<u32>>,
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    if let Some(job) = &body.job {
        if !is_valid_job(job) {
            return error_response(StatusCode::BAD_REQUEST, invalid_job_message()).into_response();
        }
    }
    let updated = state
        .backend
        .write()
        .await
        .update_user(id, body.job, body.interest_ids);
    if !updated {
        return error_response(StatusCode::NOT_FOUND, "User not found").into_response();
    }
    Json(json!({ "userId": id })).into_response()
}

#[derive(Deserialize)]
pub struct ArticlesQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<u64>,
    pub limit: Option<usize>,
}

const DEFAULT_ARTICLE_LIMIT: usize = 10;

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ArticlesQuery>,
) -> impl IntoResponse {
    let Some(user_id) = query.user_id else {
        return error_response(StatusCode::BAD_REQUEST, "userId query parameter is required")
            .into_response();
    };
    let limit = query.limit.unwrap_or(DEFAULT_ARTICLE_LIMIT);

    let backend = state.backend.read().await;
    let Some(user) = backend.get_user(user_id) else {
        return error_response(StatusCode::NOT_FOUND, "User not found").into_response();
    };

    let ranked = backend.recommended(user, limit);
    let body: Vec<serde_json::Value> = ranked
        .into_iter()
        .map(|entry| {
            json!({
                "id": entry.id,
                "title": entry.article.title,
                "summary": entry.article.summary,
                "link": entry.article.link,
                "category": entry.article.category,
                "subcategory": entry.article.subcategory,
                "date": entry.article.date,
                "imageUrl": entry.article.image_url,
                "job_score": round2(entry.job_score),
                "avg_interest_score": round2(entry.avg_interest_score),
                "relevance_score": round2(entry.relevance_score),
            })
        })
        .collect();
    Json(body).into_response()
}

pub async fn ingest_article(
    State(state): State<Arc<AppState>>,
    Json(article): Json<StoredArticle>,
) -> impl IntoResponse {
    let (id, inserted) = state.backend.write().await.insert_article(article);
    if inserted {
        info!("ingested article {}", id);
        (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
    } else {
        Json(json!({ "id": id })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(85.456), 85.46);
        assert_eq!(round2(40.0), 40.0);
    }

    #[test]
    fn test_invalid_job_message_lists_roles() {
        let message = invalid_job_message();
        assert!(message.contains("Security Engineer"));
        assert!(message.contains("Other"));
    }
}
