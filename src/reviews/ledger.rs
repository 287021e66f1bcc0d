use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    AppError, AppResult,
    appresult::is_unique_violation,
    db::{self, UserId},
};

const NOT_ELIGIBLE: &str = "You can only review users you have completed exchanges with";
const ALREADY_REVIEWED: &str = "You have already reviewed this user";
const NOT_FOUND_OR_UNAUTHORIZED: &str = "Review not found or unauthorized";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub reviewer_id: UserId,
    pub reviewer_name: String,
    pub reviewer_location: Option<String>,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReviewStats {
    pub total_reviews: i64,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewSummary {
    pub reviews: Vec<Review>,
    pub stats: ReviewStats,
}

/// Averages are shown with one decimal.
pub fn round_rating(average: f64) -> f64 {
    (average * 10.0).round() / 10.0
}

fn validate_rating(rating: i64) -> AppResult<()> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::Validation("Rating must be between 1 and 5".to_owned()))
    }
}

/// Records `reviewer`'s review of `receiver`. Allowed once per pair, and only
/// after the two have completed an exchange, whichever of them asked for it.
pub async fn create(
    db_pool: &SqlitePool,
    reviewer: UserId,
    receiver: UserId,
    rating: i64,
    comment: &str,
) -> AppResult<i64> {
    validate_rating(rating)?;

    let mut tx = db::begin_write(db_pool).await?;

    let completed = sqlx::query(
        "SELECT 1 FROM exchanges
         WHERE status='completed'
         AND ((sender_id=?1 AND receiver_id=?2) OR (sender_id=?2 AND receiver_id=?1))
         LIMIT 1",
    )
    .bind(reviewer)
    .bind(receiver)
    .fetch_optional(&mut *tx)
    .await?;
    if completed.is_none() {
        return Err(AppError::NotEligible(NOT_ELIGIBLE.to_owned()));
    }

    let existing = sqlx::query("SELECT 1 FROM reviews WHERE reviewer_id=? AND receiver_id=?")
        .bind(reviewer)
        .bind(receiver)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(ALREADY_REVIEWED.to_owned()));
    }

    let inserted: Result<(i64,), _> = sqlx::query_as(
        "INSERT INTO reviews (reviewer_id,receiver_id,rating,comment) VALUES (?,?,?,?) RETURNING id",
    )
    .bind(reviewer)
    .bind(receiver)
    .bind(rating)
    .bind(comment)
    .fetch_one(&mut *tx)
    .await;

    let (id,) = match inserted {
        Ok(row) => row,
        Err(err) if is_unique_violation(&err) => {
            return Err(AppError::Conflict(ALREADY_REVIEWED.to_owned()));
        }
        Err(err) => return Err(err.into()),
    };

    tx.commit().await?;
    tracing::info!(review_id = id, reviewer, receiver, rating, "review created");
    Ok(id)
}

pub async fn update(
    db_pool: &SqlitePool,
    review_id: i64,
    actor: UserId,
    rating: i64,
    comment: &str,
) -> AppResult<()> {
    validate_rating(rating)?;

    let result = sqlx::query(
        "UPDATE reviews SET rating=?, comment=?, updated_at=CURRENT_TIMESTAMP
         WHERE id=? AND reviewer_id=?",
    )
    .bind(rating)
    .bind(comment)
    .bind(review_id)
    .bind(actor)
    .execute(db_pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Unauthorized(NOT_FOUND_OR_UNAUTHORIZED.to_owned()));
    }
    tracing::info!(review_id, actor, rating, "review updated");
    Ok(())
}

pub async fn delete(db_pool: &SqlitePool, review_id: i64, actor: UserId) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM reviews WHERE id=? AND reviewer_id=?")
        .bind(review_id)
        .bind(actor)
        .execute(db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Unauthorized(NOT_FOUND_OR_UNAUTHORIZED.to_owned()));
    }
    tracing::info!(review_id, actor, "review deleted");
    Ok(())
}

pub async fn stats(db_pool: &SqlitePool, receiver: UserId) -> AppResult<ReviewStats> {
    let (total_reviews, average): (i64, f64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(AVG(rating), 0.0) FROM reviews WHERE receiver_id=?",
    )
    .bind(receiver)
    .fetch_one(db_pool)
    .await?;

    Ok(ReviewStats {
        total_reviews,
        average_rating: round_rating(average),
    })
}

/// All reviews `receiver` got, newest first, with the aggregate.
pub async fn summarize(db_pool: &SqlitePool, receiver: UserId) -> AppResult<ReviewSummary> {
    let reviews = sqlx::query_as::<_, Review>(
        "SELECT r.id, r.reviewer_id, u.full_name AS reviewer_name, u.location AS reviewer_location,
                r.rating, r.comment, r.created_at
         FROM reviews r
         JOIN users u ON r.reviewer_id = u.id
         WHERE r.receiver_id=?
         ORDER BY r.created_at DESC, r.id DESC",
    )
    .bind(receiver)
    .fetch_all(db_pool)
    .await?;

    Ok(ReviewSummary {
        reviews,
        stats: stats(db_pool, receiver).await?,
    })
}
