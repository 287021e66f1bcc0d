mod me;
mod page;

use axum::{Router, debug_handler, extract::State, routing::get};
use sqlx::SqlitePool;

use crate::{
    AppResult, AppState,
    appresult::{ApiJson, Reply},
    db::Profile,
    session::CurrentUser,
};

pub use me::{ProfileUpdate, ProfileView, fetch, load, update};

pub fn pages() -> Router<AppState> {
    Router::new().route("/u/{user_id}", get(page::profile))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(own_profile).put(update_profile))
}

#[debug_handler(state = AppState)]
pub(crate) async fn own_profile(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Reply<ProfileView>> {
    Ok(Reply::data(load(&db_pool, user_id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_profile(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(changes): ApiJson<ProfileUpdate>,
) -> AppResult<Reply<Profile>> {
    Ok(Reply::data(update(&db_pool, user_id, &changes).await?)
        .with_message("Profile updated successfully"))
}
