use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::streak::Streak;
use crate::streak::store::{RecordStore, StreakStore};

/// Postgres-backed store handed to the engine by request handlers.
pub struct PgStore<'a> {
    db: &'a PgPool,
}

impl<'a> PgStore<'a> {
    pub fn new(db: &'a PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for PgStore<'_> {
    async fn completed_days(&self, habit_id: Uuid) -> anyhow::Result<Vec<NaiveDate>> {
        let days = sqlx::query_scalar::<_, NaiveDate>(
            r#"
            SELECT DISTINCT record_date FROM habit_records
            WHERE habit_id = $1 AND completed = true
            ORDER BY record_date ASC
            "#,
        )
        .bind(habit_id)
        .fetch_all(self.db)
        .await?;

        Ok(days)
    }
}

#[async_trait]
impl StreakStore for PgStore<'_> {
    async fn get_streak(&self, habit_id: Uuid) -> anyhow::Result<Option<Streak>> {
        let streak =
            sqlx::query_as::<_, Streak>("SELECT * FROM streaks WHERE habit_id = $1")
                .bind(habit_id)
                .fetch_optional(self.db)
                .await?;

        Ok(streak)
    }

    async fn put_streak(&self, streak: &Streak) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE streaks SET
                current_streak = $2,
                longest_streak = $3,
                last_completed_date = $4
            WHERE habit_id = $1
            "#,
        )
        .bind(streak.habit_id)
        .bind(streak.current_streak)
        .bind(streak.longest_streak)
        .bind(streak.last_completed_date)
        .execute(self.db)
        .await?;

        Ok(())
    }
}
