//! Partner search: filters users by what they teach and where they are, ranks
//! them by reputation, and pages through the result ten at a time.

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    AppResult,
    db::{Level, UserId, UserSkill},
    reviews::round_rating,
    skills::{self, SkillList},
};

pub const PAGE_SIZE: i64 = 10;

const LIKE_ESCAPE: &str = " ESCAPE '\\'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Rating,
    Reviews,
    Name,
}

impl SortBy {
    /// Unknown keys sort by rating.
    pub fn parse(key: &str) -> Self {
        match key {
            "reviews" => SortBy::Reviews,
            "name" => SortBy::Name,
            _ => SortBy::Rating,
        }
    }

    fn order_clause(&self) -> &'static str {
        match self {
            SortBy::Rating => " ORDER BY rating DESC, u.id ASC",
            SortBy::Reviews => " ORDER BY review_count DESC, u.id ASC",
            SortBy::Name => " ORDER BY u.full_name ASC, u.id ASC",
        }
    }
}

/// Every filter is optional; those present must all hold.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    /// Substring of the name, the bio, or a taught skill's name
    pub query: Option<String>,
    /// Exact category of a taught skill
    pub category: Option<String>,
    /// Substring of the location
    pub location: Option<String>,
    /// Exact level of a taught skill
    pub level: Option<Level>,
    pub sort_by: SortBy,
    /// 1-based
    pub page: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Candidate {
    pub id: UserId,
    pub full_name: String,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub rating: f64,
    pub review_count: i64,
    #[sqlx(skip)]
    pub skills: Vec<UserSkill>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub results: Vec<Candidate>,
    pub page: i64,
    pub per_page: i64,
}

/// `%`, `_` and `\` typed by the user match themselves.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_like<'a>(qb: &mut QueryBuilder<'a, Sqlite>, column: &str, pattern: &str) {
    qb.push(column)
        .push(" LIKE ")
        .push_bind(pattern.to_owned())
        .push(LIKE_ESCAPE);
}

fn build(params: &SearchParams, page: i64) -> QueryBuilder<'_, Sqlite> {
    let mut qb = QueryBuilder::new(
        "SELECT u.id, u.full_name, u.location, u.bio,
                COALESCE((SELECT AVG(r.rating) FROM reviews r WHERE r.receiver_id = u.id), 0.0) AS rating,
                (SELECT COUNT(*) FROM reviews r WHERE r.receiver_id = u.id) AS review_count
         FROM users u
         WHERE 1=1",
    );

    if let Some(location) = &params.location {
        qb.push(" AND ");
        push_like(&mut qb, "u.location", &like_pattern(location));
    }

    let pattern = params.query.as_deref().map(like_pattern);

    // Category, level and a skill-name hit must all come from the same taught skill.
    if params.category.is_some() || params.level.is_some() {
        qb.push(
            " AND EXISTS (SELECT 1 FROM taught_skills ts JOIN skills s ON ts.skill_id = s.id
              WHERE ts.user_id = u.id",
        );
        if let Some(category) = &params.category {
            qb.push(" AND s.category = ").push_bind(category.clone());
        }
        if let Some(level) = params.level {
            qb.push(" AND ts.skill_level = ").push_bind(level);
        }
        if let Some(pattern) = &pattern {
            qb.push(" AND (");
            push_like(&mut qb, "u.full_name", pattern);
            qb.push(" OR ");
            push_like(&mut qb, "u.bio", pattern);
            qb.push(" OR ");
            push_like(&mut qb, "s.name", pattern);
            qb.push(")");
        }
        qb.push(")");
    } else if let Some(pattern) = &pattern {
        qb.push(" AND (");
        push_like(&mut qb, "u.full_name", pattern);
        qb.push(" OR ");
        push_like(&mut qb, "u.bio", pattern);
        qb.push(
            " OR EXISTS (SELECT 1 FROM taught_skills ts JOIN skills s ON ts.skill_id = s.id
              WHERE ts.user_id = u.id AND ",
        );
        push_like(&mut qb, "s.name", pattern);
        qb.push("))");
    }

    qb.push(params.sort_by.order_clause());
    qb.push(" LIMIT ")
        .push_bind(PAGE_SIZE)
        .push(" OFFSET ")
        .push_bind(page.saturating_sub(1).saturating_mul(PAGE_SIZE));
    qb
}

pub async fn search(db_pool: &SqlitePool, params: &SearchParams) -> AppResult<SearchPage> {
    let page = params.page.max(1);

    let mut results = build(params, page)
        .build_query_as::<Candidate>()
        .fetch_all(db_pool)
        .await?;

    for candidate in &mut results {
        candidate.rating = round_rating(candidate.rating);
        candidate.skills = skills::list(db_pool, candidate.id, SkillList::Teaching).await?;
    }

    Ok(SearchPage {
        results,
        page,
        per_page: PAGE_SIZE,
    })
}
