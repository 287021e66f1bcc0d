mod query;

use axum::{
    Router, debug_handler,
    extract::State,
    http::{Method, header},
    routing::get,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    AppResult, AppState,
    appresult::{ApiQuery, Reply},
};

pub use query::{Candidate, PAGE_SIZE, SearchPage, SearchParams, SortBy, search};

/// Public: no session needed, and any origin may call it.
pub fn router() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new().route("/", get(search_users)).layer(cors)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    q: Option<String>,
    category: Option<String>,
    location: Option<String>,
    skill_level: Option<String>,
    sort_by: Option<String>,
    page: Option<i64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl TryFrom<SearchQuery> for SearchParams {
    type Error = crate::AppError;

    fn try_from(query: SearchQuery) -> Result<Self, Self::Error> {
        Ok(SearchParams {
            query: non_blank(query.q),
            category: non_blank(query.category),
            location: non_blank(query.location),
            level: non_blank(query.skill_level)
                .map(|level| level.parse())
                .transpose()?,
            sort_by: non_blank(query.sort_by)
                .map(|key| SortBy::parse(&key))
                .unwrap_or_default(),
            page: query.page.unwrap_or(1),
        })
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn search_users(
    State(db_pool): State<SqlitePool>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> AppResult<Reply<SearchPage>> {
    let params = SearchParams::try_from(query)?;
    Ok(Reply::data(search(&db_pool, &params).await?))
}
