use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, tag},
    middleware::jwt::require_token,
    AppState,
};

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let api_v1 = Router::new()
        .route("/tags", get(tag::list_tags).post(tag::add_tag))
        .route("/tags/:id", put(tag::edit_tag))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/health", get(health))
        .route("/auth", post(auth::login))
        .nest("/api/v1", api_v1)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
