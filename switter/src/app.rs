//! Wiring: services over a storage handle, and the router over the services

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use switter_graph::SharedStorage;
use tower_http::{
    compression::CompressionLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::SessionConfig,
    handlers::{feed, health, pages, users},
    middleware::require_session,
    repository::GraphRepository,
    services::{AuthService, FeedService},
    session::SessionKey,
    AppState,
};

/// Build the application state on top of `storage`
pub async fn build_state(storage: SharedStorage, session: &SessionConfig) -> anyhow::Result<AppState> {
    let repo = Arc::new(GraphRepository::new(storage, session.bcrypt_cost).await?);
    let keys = SessionKey::new(session.jwt_key.as_bytes(), session.issuer.clone(), session.ttl)?;

    Ok(AppState {
        auth_service: Arc::new(AuthService::new(repo.clone(), keys)),
        feed_service: Arc::new(FeedService::new(repo)),
    })
}

pub fn build_router(state: AppState) -> Router {
    // Everything under /auth needs a session
    let authenticated = Router::new()
        .route("/feed", get(feed::feed))
        .route("/new_post", post(feed::new_post))
        .route("/logout", post(users::logout))
        .route("/id/:id/like", get(feed::like).post(feed::like))
        .route("/:user/follow", get(feed::follow).post(feed::follow))
        .route("/:user", get(feed::user_posts))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/", get(pages::index))
        .route("/login", get(pages::login_page))
        .route("/register", get(pages::register_page))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .nest("/auth", authenticated)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
}
