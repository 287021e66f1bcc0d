mod ledger;

use axum::{Router, debug_handler, extract::State, routing::get};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    AppResult, AppState,
    appresult::{ApiJson, Reply},
    db::{Level, Skill},
    session::CurrentUser,
};

pub use ledger::{SkillList, add, list, remove};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(catalog).post(add_skill).delete(remove_skill))
}

/// The whole catalogue, grouped by category.
pub async fn list_catalog(db_pool: &SqlitePool) -> AppResult<Vec<Skill>> {
    Ok(
        sqlx::query_as::<_, Skill>("SELECT id,name,category FROM skills ORDER BY category, name")
            .fetch_all(db_pool)
            .await?,
    )
}

#[derive(Deserialize)]
pub(crate) struct NewSkill {
    skill_id: i64,
    skill_level: Level,
    #[serde(rename = "type")]
    which: SkillList,
}

#[derive(Deserialize)]
pub(crate) struct SkillRef {
    skill_id: i64,
    #[serde(rename = "type")]
    which: SkillList,
}

#[debug_handler(state = AppState)]
pub(crate) async fn catalog(
    State(db_pool): State<SqlitePool>,
    CurrentUser(_): CurrentUser,
) -> AppResult<Reply<Vec<Skill>>> {
    Ok(Reply::data(list_catalog(&db_pool).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn add_skill(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(NewSkill { skill_id, skill_level, which }): ApiJson<NewSkill>,
) -> AppResult<Reply<()>> {
    add(&db_pool, user_id, skill_id, skill_level, which).await?;
    Ok(Reply::message("Skill added successfully"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn remove_skill(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(SkillRef { skill_id, which }): ApiJson<SkillRef>,
) -> AppResult<Reply<()>> {
    remove(&db_pool, user_id, skill_id, which).await?;
    Ok(Reply::message("Skill removed successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn catalogue_is_ordered_by_category_then_name() {
        let db_pool = test_support::pool().await;
        let skills = list_catalog(&db_pool).await.unwrap();

        let keys: Vec<_> = skills.iter().map(|s| (s.category.clone(), s.name.clone())).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(skills[0].category, "Art");
    }
}
