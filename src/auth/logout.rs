use axum::{debug_handler, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{AppResult, appresult::ApiQuery, session};

#[derive(Deserialize)]
pub(crate) struct LogoutQuery {
    pub(crate) return_url: Option<String>,
}

#[debug_handler]
pub(crate) async fn logout(
    ApiQuery(LogoutQuery { return_url }): ApiQuery<LogoutQuery>,
    session: Session,
) -> AppResult<Redirect> {
    session::sign_out(&session).await?;

    // Local paths only.
    let target = match return_url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") => url,
        _ => "/login".to_string(),
    };
    Ok(Redirect::to(&target))
}
