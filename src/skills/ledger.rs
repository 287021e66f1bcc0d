use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    AppError, AppResult,
    appresult::is_unique_violation,
    db::{self, Level, UserId, UserSkill},
};

const ALREADY_LISTED: &str = "You already have this skill in your profile";

/// Which side of a user's ledger a skill sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillList {
    /// Skills the user can teach
    Teaching,
    /// Skills the user wants to learn
    Learning,
}

impl SkillList {
    fn table(&self) -> &'static str {
        match self {
            SkillList::Teaching => "taught_skills",
            SkillList::Learning => "sought_skills",
        }
    }
}

pub async fn list(
    db_pool: &SqlitePool,
    user_id: UserId,
    which: SkillList,
) -> AppResult<Vec<UserSkill>> {
    let sql = format!(
        "SELECT s.id, s.name, s.category, l.skill_level
         FROM {} l
         JOIN skills s ON l.skill_id = s.id
         WHERE l.user_id=?
         ORDER BY s.category, s.name",
        which.table()
    );

    Ok(sqlx::query_as::<_, UserSkill>(&sql)
        .bind(user_id)
        .fetch_all(db_pool)
        .await?)
}

pub async fn add(
    db_pool: &SqlitePool,
    user_id: UserId,
    skill_id: i64,
    level: Level,
    which: SkillList,
) -> AppResult<()> {
    let mut tx = db::begin_write(db_pool).await?;

    if sqlx::query("SELECT 1 FROM skills WHERE id=?")
        .bind(skill_id)
        .fetch_optional(&mut *tx)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Skill not found".to_owned()));
    }

    let existing = sqlx::query(&format!(
        "SELECT 1 FROM {} WHERE user_id=? AND skill_id=?",
        which.table()
    ))
    .bind(user_id)
    .bind(skill_id)
    .fetch_optional(&mut *tx)
    .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(ALREADY_LISTED.to_owned()));
    }

    let inserted = sqlx::query(&format!(
        "INSERT INTO {} (user_id,skill_id,skill_level) VALUES (?,?,?)",
        which.table()
    ))
    .bind(user_id)
    .bind(skill_id)
    .bind(level)
    .execute(&mut *tx)
    .await;

    match inserted {
        Ok(_) => {}
        Err(err) if is_unique_violation(&err) => {
            return Err(AppError::Conflict(ALREADY_LISTED.to_owned()));
        }
        Err(err) => return Err(err.into()),
    }

    tx.commit().await?;
    tracing::info!(user_id, skill_id, %level, ?which, "skill added");
    Ok(())
}

/// Removing a skill that is not listed is not an error.
pub async fn remove(
    db_pool: &SqlitePool,
    user_id: UserId,
    skill_id: i64,
    which: SkillList,
) -> AppResult<()> {
    sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id=? AND skill_id=?",
        which.table()
    ))
    .bind(user_id)
    .bind(skill_id)
    .execute(db_pool)
    .await?;
    Ok(())
}
