use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod scoring;
pub mod state;
pub mod store;

pub use state::AppState;
pub use store::{Backend, RankedArticle, StoredArticle, UserRecord, VALID_JOBS};

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/user", post(handlers::create_user))
        .route(
            "/user/:id",
            get(handlers::get_user).patch(handlers::update_user),
        )
        .route(
            "/articles",
            get(handlers::list_articles).post(handlers::ingest_article),
        )
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::store::{Backend, StoredArticle};
    pub use crate::AppState;
    pub use nl_core::{Error, Result};
}
