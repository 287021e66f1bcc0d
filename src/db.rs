use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::{
    Sqlite, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{AppError, include_res};

pub type UserId = i64;

/// How well someone knows a skill, on either side of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        use Level::*;
        match self {
            Beginner => "beginner",
            Intermediate => "intermediate",
            Advanced => "advanced",
        }
    }
}

impl FromStr for Level {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Level::*;
        match s {
            "beginner" => Ok(Beginner),
            "intermediate" => Ok(Intermediate),
            "advanced" => Ok(Advanced),
            _ => Err(AppError::Validation(format!("Invalid skill level '{s}'"))),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an exchange sits in its lifecycle. `completed`, `rejected` and
/// `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ExchangeStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

impl ExchangeStatus {
    pub fn as_str(&self) -> &'static str {
        use ExchangeStatus::*;
        match self {
            Pending => "pending",
            Accepted => "accepted",
            Rejected => "rejected",
            Completed => "completed",
            Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub category: String,
}

/// A catalogue skill as it appears on one user's ledger.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserSkill {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub skill_level: Level,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
}

pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    init_schema(&db_pool).await?;
    Ok(db_pool)
}

/// Creates missing tables and seeds the skill catalogue. Safe to run on every start.
pub async fn init_schema(db_pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_res!(str, "/schema.sql"))
        .execute(db_pool)
        .await?;
    Ok(())
}

/// A transaction holding the write lock from its first statement. Competing
/// writers queue on the busy timeout rather than failing mid-transaction.
pub async fn begin_write(db_pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    db_pool.begin_with("BEGIN IMMEDIATE").await
}

pub async fn user_exists(db_pool: &SqlitePool, user_id: UserId) -> Result<bool, sqlx::Error> {
    Ok(sqlx::query("SELECT 1 FROM users WHERE id=?")
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?
        .is_some())
}
