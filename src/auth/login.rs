use axum::{
    debug_handler,
    response::{Html, IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppError, AppResult, db::UserId, include_res, session};

use super::{password, register::Account};

#[debug_handler]
pub(crate) async fn login_page(session: Session) -> AppResult<Response> {
    if session::current_user(&session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(include_res!(str, "/pages/login.html")).into_response())
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub(crate) async fn authenticate(
    db_pool: &SqlitePool,
    email: &str,
    password: &str,
) -> AppResult<Account> {
    let row: Option<(UserId, String, String, String)> =
        sqlx::query_as("SELECT id,full_name,email,password_hash FROM users WHERE email=?")
            .bind(email.trim().to_lowercase())
            .fetch_optional(db_pool)
            .await?;

    let Some((id, full_name, email, password_hash)) = row else {
        return Err(AppError::InvalidCredentials);
    };

    if !password::verify(password.to_owned(), password_hash).await? {
        tracing::info!(user_id = id, "failed login");
        return Err(AppError::InvalidCredentials);
    }

    Ok(Account { id, full_name, email })
}
