use axum::{
    debug_handler,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use sqlx::SqlitePool;

use crate::{
    AppError, AppResult, AppState,
    db::UserId,
    include_res,
    res::{self, escape_html, fill},
    reviews,
    skills::{self, SkillList},
};

use super::me;

#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    Path(user_id): Path<UserId>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Response> {
    let profile = match me::fetch(&db_pool, user_id).await {
        Ok(profile) => profile,
        Err(AppError::NotFound(_)) => return res::sorry("profile"),
        Err(err) => return Err(err),
    };

    let mut skill_items = String::new();
    for skill in skills::list(&db_pool, user_id, SkillList::Teaching).await? {
        skill_items += &fill(
            include_res!(str, "/pages/skill_item.html"),
            &[
                ("name", escape_html(&skill.name).as_str()),
                ("category", escape_html(&skill.category).as_str()),
                ("level", skill.skill_level.as_str()),
            ],
        );
    }

    let stats = reviews::stats(&db_pool, user_id).await?;

    Ok(Html(fill(
        include_res!(str, "/pages/profile.html"),
        &[
            ("user_id", user_id.to_string().as_str()),
            ("full_name", escape_html(&profile.full_name).as_str()),
            ("location", escape_html(profile.location.as_deref().unwrap_or("")).as_str()),
            ("rating", stats.average_rating.to_string().as_str()),
            ("review_count", stats.total_reviews.to_string().as_str()),
            ("skill_items", skill_items.as_str()),
            ("bio", res::markdown(profile.bio.as_deref().unwrap_or("")).as_str()),
        ],
    ))
    .into_response())
}
