//! MerchMagic Server: axum routes over the session, quota, billing
//! and mockup services.

pub mod config;
pub mod error;
pub mod handlers;
pub mod session;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes;
    Router::new()
        .route("/api/auth/google/url", get(handlers::auth::google_url))
        .route("/auth/callback", get(handlers::auth::callback))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/user/profile", get(handlers::user::profile))
        .route("/api/user/delete-account", post(handlers::user::delete_account))
        .route("/api/user/generate", post(handlers::mockup::generate))
        .route("/api/user/edit", post(handlers::mockup::edit))
        .route(
            "/api/create-checkout-session",
            post(handlers::billing::create_checkout_session),
        )
        .route("/api/webhooks/stripe", post(handlers::billing::stripe_webhook))
        .route(
            "/.well-known/assetlinks.json",
            get(handlers::well_known::assetlinks),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
