use axum::{
    Router, debug_handler,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use tower_sessions::Session;

use crate::{AppResult, AppState, include_res, session};

pub fn pages() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/search", get(search_page))
}

#[debug_handler]
pub async fn index(session: Session) -> AppResult<Response> {
    if session::current_user(&session).await?.is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    Ok(Html(include_res!(str, "/pages/index.html")).into_response())
}

#[debug_handler]
pub async fn search_page() -> impl IntoResponse {
    Html(include_res!(str, "/pages/search.html"))
}
