use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::dto::{CalendarQuery, CalendarResponse, DayCount, DayProgress, TodayHabit, TodayResponse};
use crate::error::{AppError, AppResult};
use crate::models::habit::Habit;
use crate::models::record::HabitRecord;
use crate::models::streak::Streak;
use crate::AppState;

pub async fn today(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<TodayResponse>> {
    let today = Utc::now().date_naive();

    let habits = sqlx::query_as::<_, Habit>(
        "SELECT * FROM habits WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    let records = sqlx::query_as::<_, HabitRecord>(
        "SELECT * FROM habit_records WHERE user_id = $1 AND record_date = $2",
    )
    .bind(auth_user.id)
    .bind(today)
    .fetch_all(&state.db)
    .await?;

    let streaks = sqlx::query_as::<_, Streak>("SELECT * FROM streaks WHERE user_id = $1")
        .bind(auth_user.id)
        .fetch_all(&state.db)
        .await?;

    let completed = records.iter().filter(|r| r.completed).count() as i64;
    let total = habits.len() as i64;
    let progress = if total > 0 {
        completed as f64 / total as f64
    } else {
        0.0
    };

    let habits = habits
        .into_iter()
        .map(|habit| {
            let record = records.iter().find(|r| r.habit_id == habit.id).cloned();
            let streak = streaks.iter().find(|s| s.habit_id == habit.id).cloned();
            TodayHabit {
                habit,
                record,
                streak,
            }
        })
        .collect();

    Ok(Json(TodayResponse {
        date: today,
        completed,
        total,
        progress,
        habits,
    }))
}

pub async fn weekly_progress(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<DayProgress>>> {
    let today = Utc::now().date_naive();
    let start = today - chrono::Duration::days(6);

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM habits WHERE user_id = $1")
        .bind(auth_user.id)
        .fetch_one(&state.db)
        .await?;

    let counts = completed_counts_by_day(&state, auth_user.id, start, today).await?;

    let days = (0..7)
        .map(|i| {
            let date = start + chrono::Duration::days(i);
            let completed = counts.get(&date).copied().unwrap_or(0);
            DayProgress {
                date,
                day_name: date.format("%a").to_string(),
                completed,
                total,
                progress: if total > 0 {
                    completed as f64 / total as f64
                } else {
                    0.0
                },
                is_today: date == today,
            }
        })
        .collect();

    Ok(Json(days))
}

pub async fn monthly_calendar(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<CalendarResponse>> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    let month_start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation("Invalid month or year".into()))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::Validation("Invalid month or year".into()))?;
    let month_end = next_month - chrono::Duration::days(1);

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM habits WHERE user_id = $1")
        .bind(auth_user.id)
        .fetch_one(&state.db)
        .await?;

    let counts = completed_counts_by_day(&state, auth_user.id, month_start, month_end).await?;

    let mut days = BTreeMap::new();
    let mut date = month_start;
    while date <= month_end {
        days.insert(
            date,
            DayCount {
                completed: counts.get(&date).copied().unwrap_or(0),
                total,
            },
        );
        date = date + chrono::Duration::days(1);
    }

    Ok(Json(CalendarResponse {
        month: month_start.format("%Y-%m").to_string(),
        days,
    }))
}

/// Habits completed per day in the range, keyed by calendar day.
async fn completed_counts_by_day(
    state: &AppState,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<BTreeMap<NaiveDate, i64>> {
    let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
        r#"
        SELECT record_date, COUNT(DISTINCT habit_id)
        FROM habit_records
        WHERE user_id = $1 AND completed = true AND record_date BETWEEN $2 AND $3
        GROUP BY record_date
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(rows.into_iter().collect())
}
