use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::streak::Streak;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Optional numeric goal, e.g. goal_value = 30, goal_unit = "minutes".
    pub goal_value: Option<i32>,
    pub goal_unit: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Habit joined with its streak snapshot, as returned by `GET /api/habits`.
#[derive(Debug, Serialize)]
pub struct HabitWithStreak {
    #[serde(flatten)]
    pub habit: Habit,
    pub streak: Streak,
}
