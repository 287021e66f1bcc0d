//! Fixtures shared by the unit tests: an in-memory store with the real schema
//! and shortcuts for the rows most tests need.

use sqlx::SqlitePool;

use crate::db::{self, ExchangeStatus, Level, UserId};

/// One connection only: every connection to `sqlite::memory:` is its own database.
pub async fn pool() -> SqlitePool {
    db::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory database")
}

/// A file-backed store with several connections, for tests that race writers.
/// Keep the returned directory alive for as long as the pool is used.
pub async fn shared_pool() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("qpq.db").display());
    let db_pool = db::connect(&url, 4).await.expect("file database");
    (dir, db_pool)
}

pub async fn user(db_pool: &SqlitePool, full_name: &str) -> UserId {
    user_at(db_pool, full_name, None, None).await
}

pub async fn user_at(
    db_pool: &SqlitePool,
    full_name: &str,
    location: Option<&str>,
    bio: Option<&str>,
) -> UserId {
    let email = format!("{}@example.com", full_name.to_lowercase().replace(' ', "."));
    let (id,): (UserId,) = sqlx::query_as(
        "INSERT INTO users (full_name,email,password_hash,location,bio) VALUES (?,?,'x',?,?) RETURNING id",
    )
    .bind(full_name)
    .bind(email)
    .bind(location)
    .bind(bio)
    .fetch_one(db_pool)
    .await
    .expect("insert user");
    id
}

pub async fn skill_id(db_pool: &SqlitePool, name: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as("SELECT id FROM skills WHERE name=?")
        .bind(name)
        .fetch_one(db_pool)
        .await
        .expect("seeded skill");
    id
}

pub async fn teach(db_pool: &SqlitePool, user_id: UserId, skill: &str, level: Level) {
    let skill_id = skill_id(db_pool, skill).await;
    sqlx::query("INSERT INTO taught_skills (user_id,skill_id,skill_level) VALUES (?,?,?)")
        .bind(user_id)
        .bind(skill_id)
        .bind(level)
        .execute(db_pool)
        .await
        .expect("insert taught skill");
}

pub async fn seek(db_pool: &SqlitePool, user_id: UserId, skill: &str, level: Level) {
    let skill_id = skill_id(db_pool, skill).await;
    sqlx::query("INSERT INTO sought_skills (user_id,skill_id,skill_level) VALUES (?,?,?)")
        .bind(user_id)
        .bind(skill_id)
        .bind(level)
        .execute(db_pool)
        .await
        .expect("insert sought skill");
}

/// Inserts an exchange directly in the given state, bypassing the lifecycle.
pub async fn exchange(
    db_pool: &SqlitePool,
    sender: UserId,
    receiver: UserId,
    status: ExchangeStatus,
) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO exchanges (sender_id,receiver_id,message,status) VALUES (?,?,'hi',?) RETURNING id",
    )
    .bind(sender)
    .bind(receiver)
    .bind(status)
    .fetch_one(db_pool)
    .await
    .expect("insert exchange");
    id
}

pub async fn review(db_pool: &SqlitePool, reviewer: UserId, receiver: UserId, rating: i64) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO reviews (reviewer_id,receiver_id,rating,comment) VALUES (?,?,?,'') RETURNING id",
    )
    .bind(reviewer)
    .bind(receiver)
    .bind(rating)
    .fetch_one(db_pool)
    .await
    .expect("insert review");
    id
}
