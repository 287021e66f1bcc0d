use axum::{debug_handler, extract::State};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    AppResult, AppState,
    appresult::Reply,
    db::{ExchangeStatus, Level, UserId},
    reviews,
    session::CurrentUser,
};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub teaching_skills: i64,
    pub learning_goals: i64,
    pub total_exchanges: i64,
    pub completed_exchanges: i64,
    pub pending_requests: i64,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UpcomingExchange {
    pub id: i64,
    pub status: ExchangeStatus,
    pub created_at: String,
    pub partner_id: UserId,
    pub partner_name: String,
    pub partner_location: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopSkill {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub skill_level: Level,
    pub potential_matches: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub upcoming_exchanges: Vec<UpcomingExchange>,
    pub top_skills: Vec<TopSkill>,
}

pub async fn load(db_pool: &SqlitePool, user_id: UserId) -> AppResult<Dashboard> {
    let (teaching_skills,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM taught_skills WHERE user_id=?")
            .bind(user_id)
            .fetch_one(db_pool)
            .await?;

    let (learning_goals,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM sought_skills WHERE user_id=?")
            .bind(user_id)
            .fetch_one(db_pool)
            .await?;

    let (total_exchanges, completed_exchanges, pending_requests): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN status='completed' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status='pending' AND receiver_id=?1 THEN 1 ELSE 0 END), 0)
         FROM exchanges
         WHERE sender_id=?1 OR receiver_id=?1",
    )
    .bind(user_id)
    .fetch_one(db_pool)
    .await?;

    let average_rating = reviews::stats(db_pool, user_id).await?.average_rating;

    let upcoming_exchanges = sqlx::query_as::<_, UpcomingExchange>(
        "SELECT e.id, e.status, e.created_at,
                u.id AS partner_id, u.full_name AS partner_name, u.location AS partner_location
         FROM exchanges e
         JOIN users u ON u.id = CASE WHEN e.sender_id=?1 THEN e.receiver_id ELSE e.sender_id END
         WHERE (e.sender_id=?1 OR e.receiver_id=?1)
         AND e.status IN ('pending', 'accepted')
         ORDER BY e.created_at DESC, e.id DESC
         LIMIT 5",
    )
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;

    let top_skills = sqlx::query_as::<_, TopSkill>(
        "SELECT s.id, s.name, s.category, ts.skill_level,
                (SELECT COUNT(DISTINCT ss.user_id) FROM sought_skills ss
                 WHERE ss.skill_id = s.id AND ss.user_id != ?1) AS potential_matches
         FROM taught_skills ts
         JOIN skills s ON ts.skill_id = s.id
         WHERE ts.user_id=?1
         ORDER BY potential_matches DESC, s.name ASC
         LIMIT 5",
    )
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;

    Ok(Dashboard {
        stats: DashboardStats {
            teaching_skills,
            learning_goals,
            total_exchanges,
            completed_exchanges,
            pending_requests,
            average_rating,
        },
        upcoming_exchanges,
        top_skills,
    })
}

#[debug_handler(state = AppState)]
pub async fn dashboard(
    State(db_pool): State<SqlitePool>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Reply<Dashboard>> {
    Ok(Reply::data(load(&db_pool, user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn empty_user_has_zeroes() {
        let db_pool = test_support::pool().await;
        let alice = test_support::user(&db_pool, "Alice").await;

        let board = load(&db_pool, alice).await.unwrap();
        assert_eq!(board.stats.total_exchanges, 0);
        assert_eq!(board.stats.completed_exchanges, 0);
        assert_eq!(board.stats.pending_requests, 0);
        assert_eq!(board.stats.average_rating, 0.0);
        assert!(board.upcoming_exchanges.is_empty());
        assert!(board.top_skills.is_empty());
    }

    #[tokio::test]
    async fn rollup_counts_and_partners() {
        let db_pool = test_support::pool().await;
        let alice = test_support::user_at(&db_pool, "Alice", Some("Porto"), None).await;
        let bob = test_support::user_at(&db_pool, "Bob", Some("Braga"), None).await;
        let carol = test_support::user(&db_pool, "Carol").await;

        test_support::teach(&db_pool, alice, "Guitar", Level::Advanced).await;
        test_support::teach(&db_pool, alice, "Rust", Level::Intermediate).await;
        test_support::seek(&db_pool, alice, "French", Level::Beginner).await;
        test_support::seek(&db_pool, alice, "Rust", Level::Advanced).await;
        test_support::seek(&db_pool, bob, "Rust", Level::Beginner).await;
        test_support::seek(&db_pool, carol, "Rust", Level::Beginner).await;
        test_support::seek(&db_pool, carol, "Guitar", Level::Beginner).await;

        test_support::exchange(&db_pool, bob, alice, ExchangeStatus::Pending).await;
        let sent = test_support::exchange(&db_pool, alice, carol, ExchangeStatus::Accepted).await;
        test_support::exchange(&db_pool, carol, alice, ExchangeStatus::Completed).await;
        test_support::exchange(&db_pool, alice, bob, ExchangeStatus::Pending).await;
        test_support::review(&db_pool, carol, alice, 4).await;
        test_support::review(&db_pool, bob, alice, 5).await;

        let board = load(&db_pool, alice).await.unwrap();
        assert_eq!(board.stats.teaching_skills, 2);
        assert_eq!(board.stats.learning_goals, 2);
        assert_eq!(board.stats.total_exchanges, 4);
        assert_eq!(board.stats.completed_exchanges, 1);
        // only the one Alice received
        assert_eq!(board.stats.pending_requests, 1);
        assert_eq!(board.stats.average_rating, 4.5);

        assert_eq!(board.upcoming_exchanges.len(), 3);
        let accepted = board.upcoming_exchanges.iter().find(|e| e.id == sent).unwrap();
        assert_eq!(accepted.partner_name, "Carol");
        assert!(board
            .upcoming_exchanges
            .iter()
            .all(|e| e.partner_id != alice && e.status != ExchangeStatus::Completed));

        // Alice's own wish to learn Rust does not count as a match.
        assert_eq!(board.top_skills[0].name, "Rust");
        assert_eq!(board.top_skills[0].potential_matches, 2);
        assert_eq!(board.top_skills[1].name, "Guitar");
        assert_eq!(board.top_skills[1].potential_matches, 1);
    }
}
