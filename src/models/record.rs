use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One daily check-in for a habit. The write path keeps at most one logical
/// record per (habit, calendar day); re-submitting the same day updates the
/// existing row instead of inserting a second one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HabitRecord {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub user_id: Uuid,
    pub record_date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
