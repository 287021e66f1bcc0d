use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    AppError, AppResult,
    db::{Profile, UserId, UserSkill},
    skills::{self, SkillList},
};

/// The logged-in user's own profile with both sides of the skill ledger.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    /// Skills taught
    pub skills: Vec<UserSkill>,
    /// Skills sought
    pub learning: Vec<UserSkill>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    /// If sent, must be the caller's own id.
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub full_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub async fn fetch(db_pool: &SqlitePool, user_id: UserId) -> AppResult<Profile> {
    sqlx::query_as::<_, Profile>(
        "SELECT id,full_name,email,location,bio,created_at FROM users WHERE id=?",
    )
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_owned()))
}

pub async fn load(db_pool: &SqlitePool, user_id: UserId) -> AppResult<ProfileView> {
    Ok(ProfileView {
        profile: fetch(db_pool, user_id).await?,
        skills: skills::list(db_pool, user_id, SkillList::Teaching).await?,
        learning: skills::list(db_pool, user_id, SkillList::Learning).await?,
    })
}

pub async fn update(
    db_pool: &SqlitePool,
    user_id: UserId,
    changes: &ProfileUpdate,
) -> AppResult<Profile> {
    if changes.user_id.is_some_and(|id| id != user_id) {
        return Err(AppError::Unauthorized("Unauthorized".to_owned()));
    }
    if changes.full_name.trim().is_empty() {
        return Err(AppError::Validation("Full name is required".to_owned()));
    }

    sqlx::query("UPDATE users SET full_name=?, location=?, bio=? WHERE id=?")
        .bind(changes.full_name.trim())
        .bind(blank_to_none(changes.location.as_deref()))
        .bind(blank_to_none(changes.bio.as_deref()))
        .bind(user_id)
        .execute(db_pool)
        .await?;

    tracing::info!(user_id, "profile updated");
    fetch(db_pool, user_id).await
}
