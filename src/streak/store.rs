use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::streak::Streak;

/// Read side of the habit record history, as the engine needs it.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Distinct calendar days with a completed record for the habit,
    /// ascending.
    async fn completed_days(&self, habit_id: Uuid) -> anyhow::Result<Vec<NaiveDate>>;
}

/// Single current snapshot per habit.
#[async_trait]
pub trait StreakStore: Send + Sync {
    async fn get_streak(&self, habit_id: Uuid) -> anyhow::Result<Option<Streak>>;

    /// Replace the snapshot as a whole; there is no partial update.
    async fn put_streak(&self, streak: &Streak) -> anyhow::Result<()>;
}
