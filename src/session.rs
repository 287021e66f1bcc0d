use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::{AppError, AppResult, db::UserId};

pub const USER_ID: &str = "user_id";

/// The logged-in user, taken from the session. Rejects with
/// [`AppError::LoginRequired`] when there is none.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(anyhow::anyhow!(msg)))?;

        current_user(&session)
            .await?
            .map(CurrentUser)
            .ok_or(AppError::LoginRequired)
    }
}

pub async fn current_user(session: &Session) -> AppResult<Option<UserId>> {
    Ok(session.get::<UserId>(USER_ID).await?)
}

pub async fn sign_in(session: &Session, user_id: UserId) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID, user_id).await?;
    Ok(())
}

pub async fn sign_out(session: &Session) -> AppResult<()> {
    session.flush().await?;
    Ok(())
}
