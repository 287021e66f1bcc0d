mod lifecycle;

use axum::{
    Router, debug_handler,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    AppResult, AppState,
    appresult::{ApiJson, ApiPath, ApiQuery, Reply},
    db::UserId,
    session::CurrentUser,
};

pub use lifecycle::{Decision, Exchange, ListFilter, cancel, complete, create, list, transition};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exchanges).post(request_exchange).put(decide_exchange))
        .route("/{id}/complete", post(complete_exchange))
        .route("/{id}/cancel", post(cancel_exchange))
}

#[derive(Deserialize)]
pub(crate) struct NewExchange {
    receiver_id: UserId,
    message: String,
}

#[derive(Deserialize)]
pub(crate) struct ExchangeDecision {
    exchange_id: i64,
    status: Decision,
}

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    #[serde(rename = "type", default)]
    filter: ListFilter,
}

#[debug_handler(state = AppState)]
pub(crate) async fn request_exchange(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(NewExchange { receiver_id, message }): ApiJson<NewExchange>,
) -> AppResult<Reply<serde_json::Value>> {
    let id = create(&db_pool, user_id, receiver_id, &message).await?;
    Ok(Reply::data(serde_json::json!({ "exchange_id": id }))
        .with_message("Exchange request sent successfully"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn decide_exchange(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(ExchangeDecision { exchange_id, status }): ApiJson<ExchangeDecision>,
) -> AppResult<Reply<()>> {
    transition(&db_pool, exchange_id, user_id, status).await?;
    let verb = match status {
        Decision::Accepted => "accepted",
        Decision::Rejected => "rejected",
    };
    Ok(Reply::message(format!("Exchange request {verb} successfully")))
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_exchanges(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
    ApiQuery(ListQuery { filter }): ApiQuery<ListQuery>,
) -> AppResult<Reply<Vec<Exchange>>> {
    Ok(Reply::data(list(&db_pool, user_id, filter).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn complete_exchange(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(exchange_id): ApiPath<i64>,
) -> AppResult<Reply<()>> {
    complete(&db_pool, exchange_id, user_id).await?;
    Ok(Reply::message("Exchange marked as completed"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn cancel_exchange(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(exchange_id): ApiPath<i64>,
) -> AppResult<Reply<()>> {
    cancel(&db_pool, exchange_id, user_id).await?;
    Ok(Reply::message("Exchange request cancelled"))
}
