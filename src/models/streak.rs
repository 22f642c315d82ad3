use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Derived streak snapshot, one per habit. Created zeroed when the habit is
/// created and mutated only by the streak engine.
///
/// Invariant: `longest_streak >= current_streak`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Streak {
    pub habit_id: Uuid,
    pub user_id: Uuid,
    /// Consecutive completed days ending at `last_completed_date`.
    pub current_streak: i32,
    /// Longest run ever observed for this habit.
    pub longest_streak: i32,
    pub last_completed_date: Option<NaiveDate>,
}

impl Streak {
    pub fn zeroed(habit_id: Uuid, user_id: Uuid) -> Self {
        Self {
            habit_id,
            user_id,
            current_streak: 0,
            longest_streak: 0,
            last_completed_date: None,
        }
    }
}
