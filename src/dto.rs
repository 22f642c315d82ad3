//! Request/response DTOs for the HTTP API.
//!
//! Conventions:
//! - `*Request` → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Validation is expressed via `validator` derive macros and checked at the
//!   handler boundary before anything reaches the stores or the streak engine

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::habit::Habit;
use crate::models::record::HabitRecord;
use crate::models::streak::Streak;

// ============================================================================
// Auth & profile
// ============================================================================

/// POST /api/auth/register
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(max = 100, message = "Nickname too long"))]
    pub nickname: Option<String>,

    #[validate(length(max = 200, message = "Goal description too long"))]
    pub goal_field: Option<String>,
}

/// POST /api/auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// POST /api/auth/refresh
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// PUT /api/profile
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "Nickname too long"))]
    pub nickname: Option<String>,

    #[validate(length(max = 200, message = "Goal description too long"))]
    pub goal_field: Option<String>,
}

// ============================================================================
// Habits
// ============================================================================

/// POST /api/habits
#[derive(Debug, Deserialize, Validate)]
pub struct CreateHabitRequest {
    #[validate(length(min = 1, max = 100, message = "Habit name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description too long"))]
    pub description: Option<String>,

    #[validate(range(min = 1, message = "Goal value must be positive"))]
    pub goal_value: Option<i32>,

    #[validate(length(max = 50, message = "Goal unit too long"))]
    pub goal_unit: Option<String>,

    #[validate(length(max = 50, message = "Category too long"))]
    pub category: Option<String>,
}

/// PUT /api/habits/:id — absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateHabitRequest {
    #[validate(length(min = 1, max = 100, message = "Habit name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description too long"))]
    pub description: Option<String>,

    #[validate(range(min = 1, message = "Goal value must be positive"))]
    pub goal_value: Option<i32>,

    #[validate(length(max = 50, message = "Goal unit too long"))]
    pub goal_unit: Option<String>,

    #[validate(length(max = 50, message = "Category too long"))]
    pub category: Option<String>,
}

// ============================================================================
// Records
// ============================================================================

/// POST /api/records — upserts on (habit, calendar day of `date`)
#[derive(Debug, Deserialize)]
pub struct UpsertRecordRequest {
    pub habit_id: Uuid,
    /// Any instant; only its calendar day matters. Default: now.
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    pub notes: Option<String>,
}

/// PUT /api/records/:id — absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateRecordRequest {
    pub completed: Option<bool>,
    pub notes: Option<String>,
}

/// GET /api/records query params
#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// ============================================================================
// Summary views
// ============================================================================

/// GET /api/today
#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub completed: i64,
    pub total: i64,
    pub progress: f64,
    pub habits: Vec<TodayHabit>,
}

#[derive(Debug, Serialize)]
pub struct TodayHabit {
    pub habit: Habit,
    pub record: Option<HabitRecord>,
    pub streak: Option<Streak>,
}

/// One day in GET /api/weekly-progress
#[derive(Debug, Serialize)]
pub struct DayProgress {
    pub date: NaiveDate,
    pub day_name: String,
    pub completed: i64,
    pub total: i64,
    pub progress: f64,
    pub is_today: bool,
}

/// GET /api/monthly-calendar query params
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    /// Target month formatted `YYYY-MM`.
    pub month: String,
    pub days: BTreeMap<NaiveDate, DayCount>,
}

#[derive(Debug, Serialize)]
pub struct DayCount {
    pub completed: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_bounds() {
        let ok = RegisterRequest {
            username: "kenji".into(),
            password: "long-enough-password".into(),
            nickname: None,
            goal_field: None,
        };
        assert!(ok.validate().is_ok());

        let short_username = RegisterRequest {
            username: "ab".into(),
            password: "long-enough-password".into(),
            nickname: None,
            goal_field: None,
        };
        assert!(short_username.validate().is_err());

        let short_password = RegisterRequest {
            username: "kenji".into(),
            password: "short".into(),
            nickname: None,
            goal_field: None,
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn habit_goal_must_be_positive() {
        let habit = CreateHabitRequest {
            name: "Morning run".into(),
            description: None,
            goal_value: Some(0),
            goal_unit: Some("km".into()),
            category: None,
        };
        assert!(habit.validate().is_err());
    }
}
