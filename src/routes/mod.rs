use crate::{config::Config, middleware::cors::cors_layer, services::leaderboard::Leaderboard};
use axum::{middleware, routing::post, Extension, Router};
use std::sync::Arc;

mod leaderboard;
mod pages;

/// Function for creating the router with all the application routes,
/// the config and leaderboard service are provided to the routes as
/// extensions
///
/// `config`      The application config
/// `leaderboard` The upstream leaderboard service
pub fn router(config: Arc<Config>, leaderboard: Arc<Leaderboard>) -> Router {
    Router::new()
        .merge(pages::router())
        .nest("/api", api_router())
        .layer(Extension(config))
        .layer(Extension(leaderboard))
}

/// Creates a router for the routes that reside under /api
fn api_router() -> Router {
    Router::new()
        // Leaderboard proxy, only POST and preflight requests are accepted
        .route(
            "/leaderboard",
            post(leaderboard::proxy_leaderboard).fallback(leaderboard::method_not_allowed),
        )
        // CORS middleware is applied to all API routes to allow browser access
        .layer(middleware::from_fn(cors_layer))
}
