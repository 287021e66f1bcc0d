pub mod appresult;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod exchanges;
pub mod index;
pub mod profiles;
pub mod res;
pub mod reviews;
pub mod search;
pub mod session;
pub mod skills;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{Router, extract::FromRef, routing::get};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

pub use appresult::{AppError, AppResult};
pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Arc<Config>,
}

/// The whole application: JSON API under `/api`, HTML pages at the root.
pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.session_minutes,
        )));

    let api = Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profiles::router())
        .nest("/skills", skills::router())
        .nest("/exchange", exchanges::router())
        .nest("/reviews", reviews::router())
        .nest("/search", search::router())
        .route("/dashboard", get(dashboard::dashboard));

    Router::new()
        .nest("/api", api)
        .merge(index::pages())
        .merge(auth::pages())
        .merge(profiles::pages())
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
