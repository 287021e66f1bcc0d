mod ledger;

use axum::{Router, debug_handler, extract::State, routing::get};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    AppResult, AppState,
    appresult::{ApiJson, ApiQuery, Reply},
    db::UserId,
    session::CurrentUser,
};

pub use ledger::{Review, ReviewStats, ReviewSummary, create, delete, round_rating, stats, summarize, update};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(list_reviews)
            .post(create_review)
            .put(update_review)
            .delete(delete_review),
    )
}

#[derive(Deserialize)]
pub(crate) struct ReviewsQuery {
    user_id: UserId,
}

#[derive(Deserialize)]
pub(crate) struct NewReview {
    receiver_id: UserId,
    rating: i64,
    #[serde(default)]
    comment: String,
}

#[derive(Deserialize)]
pub(crate) struct ReviewEdit {
    review_id: i64,
    rating: i64,
    #[serde(default)]
    comment: String,
}

#[derive(Deserialize)]
pub(crate) struct ReviewRef {
    review_id: i64,
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_reviews(
    State(db_pool): State<SqlitePool>,
    CurrentUser(_): CurrentUser,
    ApiQuery(ReviewsQuery { user_id }): ApiQuery<ReviewsQuery>,
) -> AppResult<Reply<ReviewSummary>> {
    Ok(Reply::data(summarize(&db_pool, user_id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_review(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(NewReview { receiver_id, rating, comment }): ApiJson<NewReview>,
) -> AppResult<Reply<serde_json::Value>> {
    let id = create(&db_pool, user_id, receiver_id, rating, &comment).await?;
    Ok(Reply::data(serde_json::json!({ "review_id": id }))
        .with_message("Review created successfully"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_review(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(ReviewEdit { review_id, rating, comment }): ApiJson<ReviewEdit>,
) -> AppResult<Reply<()>> {
    update(&db_pool, review_id, user_id, rating, &comment).await?;
    Ok(Reply::message("Review updated successfully"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_review(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(ReviewRef { review_id }): ApiJson<ReviewRef>,
) -> AppResult<Reply<()>> {
    delete(&db_pool, review_id, user_id).await?;
    Ok(Reply::message("Review deleted successfully"))
}
