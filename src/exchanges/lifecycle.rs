//! Exchange requests between two users.
//!
//! The sender asks, the receiver decides. A request starts `pending`; only its
//! receiver may accept or reject it, only its sender may cancel it, and an
//! `accepted` exchange is marked `completed` by either participant. Every
//! transition is one conditional `UPDATE` guarded on the current status, so
//! two racing callers cannot both win: the loser matches zero rows.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    AppError, AppResult,
    appresult::is_unique_violation,
    db::{self, ExchangeStatus, UserId},
};

const DUPLICATE_REQUEST: &str = "You already have a pending request with this user";
const INVALID_OR_UNAUTHORIZED: &str = "Invalid exchange request or unauthorized";

/// An exchange with both parties' display names resolved.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Exchange {
    pub id: i64,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub sender_name: String,
    pub receiver_name: String,
    pub message: String,
    pub status: ExchangeStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// The decisions a receiver can make on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl From<Decision> for ExchangeStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Accepted => ExchangeStatus::Accepted,
            Decision::Rejected => ExchangeStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFilter {
    Sent,
    Received,
    #[default]
    #[serde(other)]
    All,
}

/// Opens a `pending` request from `sender` to `receiver`.
///
/// Fails with [`AppError::Conflict`] while another pending request exists for
/// the same ordered pair. The check and the insert share a transaction, and the
/// partial unique index on pending pairs catches whatever slips past it.
pub async fn create(
    db_pool: &SqlitePool,
    sender: UserId,
    receiver: UserId,
    message: &str,
) -> AppResult<i64> {
    if !db::user_exists(db_pool, receiver).await? {
        return Err(AppError::NotFound("User not found".to_owned()));
    }

    let mut tx = db::begin_write(db_pool).await?;

    let pending = sqlx::query(
        "SELECT 1 FROM exchanges WHERE sender_id=? AND receiver_id=? AND status='pending'",
    )
    .bind(sender)
    .bind(receiver)
    .fetch_optional(&mut *tx)
    .await?;
    if pending.is_some() {
        return Err(AppError::Conflict(DUPLICATE_REQUEST.to_owned()));
    }

    let inserted: Result<(i64,), _> = sqlx::query_as(
        "INSERT INTO exchanges (sender_id,receiver_id,message,status) VALUES (?,?,?,'pending') RETURNING id",
    )
    .bind(sender)
    .bind(receiver)
    .bind(message)
    .fetch_one(&mut *tx)
    .await;

    let (id,) = match inserted {
        Ok(row) => row,
        Err(err) if is_unique_violation(&err) => {
            return Err(AppError::Conflict(DUPLICATE_REQUEST.to_owned()));
        }
        Err(err) => return Err(err.into()),
    };

    tx.commit().await?;
    tracing::info!(exchange_id = id, sender, receiver, "exchange requested");
    Ok(id)
}

/// Accepts or rejects a pending request. Only its receiver may do this.
pub async fn transition(
    db_pool: &SqlitePool,
    exchange_id: i64,
    actor: UserId,
    decision: Decision,
) -> AppResult<()> {
    let status = ExchangeStatus::from(decision);
    let result = sqlx::query(
        "UPDATE exchanges SET status=?, updated_at=CURRENT_TIMESTAMP
         WHERE id=? AND receiver_id=? AND status='pending'",
    )
    .bind(status)
    .bind(exchange_id)
    .bind(actor)
    .execute(db_pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Unauthorized(INVALID_OR_UNAUTHORIZED.to_owned()));
    }

    tracing::info!(exchange_id, actor, %status, "exchange decided");
    Ok(())
}

/// Marks an accepted exchange as done. Either participant may do this.
pub async fn complete(db_pool: &SqlitePool, exchange_id: i64, actor: UserId) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE exchanges SET status='completed', updated_at=CURRENT_TIMESTAMP
         WHERE id=? AND status='accepted' AND (sender_id=? OR receiver_id=?)",
    )
    .bind(exchange_id)
    .bind(actor)
    .bind(actor)
    .execute(db_pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Unauthorized(INVALID_OR_UNAUTHORIZED.to_owned()));
    }

    tracing::info!(exchange_id, actor, "exchange completed");
    Ok(())
}

/// Withdraws a pending request. Only its sender may do this.
pub async fn cancel(db_pool: &SqlitePool, exchange_id: i64, actor: UserId) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE exchanges SET status='cancelled', updated_at=CURRENT_TIMESTAMP
         WHERE id=? AND sender_id=? AND status='pending'",
    )
    .bind(exchange_id)
    .bind(actor)
    .execute(db_pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Unauthorized(INVALID_OR_UNAUTHORIZED.to_owned()));
    }

    tracing::info!(exchange_id, actor, "exchange cancelled");
    Ok(())
}

/// Newest first.
pub async fn list(
    db_pool: &SqlitePool,
    user_id: UserId,
    filter: ListFilter,
) -> AppResult<Vec<Exchange>> {
    let condition = match filter {
        ListFilter::Sent => "e.sender_id=?1",
        ListFilter::Received => "e.receiver_id=?1",
        ListFilter::All => "(e.sender_id=?1 OR e.receiver_id=?1)",
    };

    let sql = format!(
        "SELECT e.id, e.sender_id, e.receiver_id,
                sender.full_name AS sender_name, receiver.full_name AS receiver_name,
                e.message, e.status, e.created_at, e.updated_at
         FROM exchanges e
         JOIN users sender ON e.sender_id = sender.id
         JOIN users receiver ON e.receiver_id = receiver.id
         WHERE {condition}
         ORDER BY e.created_at DESC, e.id DESC"
    );

    Ok(sqlx::query_as::<_, Exchange>(&sql)
        .bind(user_id)
        .fetch_all(db_pool)
        .await?)
}
