use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    AppError, AppResult,
    appresult::is_unique_violation,
    db::{self, UserId},
};

use super::password;

const EMAIL_TAKEN: &str = "Email already registered";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
}

fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) async fn create_user(
    db_pool: &SqlitePool,
    full_name: &str,
    email: &str,
    password: &str,
) -> AppResult<Account> {
    require("Full name", full_name)?;
    require("Email", email)?;
    require("Password", password)?;

    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Validation("Email address is not valid".to_owned()));
    }

    let password_hash = password::hash(password.to_owned()).await?;

    let mut tx = db::begin_write(db_pool).await?;

    if sqlx::query("SELECT 1 FROM users WHERE email=?")
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(EMAIL_TAKEN.to_owned()));
    }

    let inserted = sqlx::query_as::<_, Account>(
        "INSERT INTO users (full_name,email,password_hash) VALUES (?,?,?) RETURNING id,full_name,email",
    )
    .bind(full_name.trim())
    .bind(&email)
    .bind(password_hash)
    .fetch_one(&mut *tx)
    .await;

    let account = match inserted {
        Ok(account) => account,
        Err(err) if is_unique_violation(&err) => {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_owned()));
        }
        Err(err) => return Err(err.into()),
    };

    tx.commit().await?;
    tracing::info!(user_id = account.id, "registered");
    Ok(account)
}
