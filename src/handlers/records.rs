use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{NaiveTime, Utc};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::dto::{RecordQuery, UpdateRecordRequest, UpsertRecordRequest};
use crate::error::{AppError, AppResult};
use crate::models::habit::Habit;
use crate::models::record::HabitRecord;
use crate::streak::{engine, pg::PgStore};
use crate::AppState;

pub async fn list_records(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<RecordQuery>,
) -> AppResult<Json<Vec<HabitRecord>>> {
    let records = sqlx::query_as::<_, HabitRecord>(
        r#"
        SELECT * FROM habit_records
        WHERE user_id = $1
          AND ($2::date IS NULL OR record_date >= $2)
          AND ($3::date IS NULL OR record_date <= $3)
        ORDER BY record_date DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(records))
}

/// Upsert the record for (habit, calendar day): first check-in of a day
/// creates it, later check-ins the same day update it in place.
pub async fn upsert_record(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpsertRecordRequest>,
) -> AppResult<Json<HabitRecord>> {
    let _habit = sqlx::query_as::<_, Habit>(
        "SELECT * FROM habits WHERE id = $1 AND user_id = $2",
    )
    .bind(body.habit_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Habit not found".into()))?;

    let at = body.date.unwrap_or_else(Utc::now);
    let day = at.date_naive();

    let existing = sqlx::query_as::<_, HabitRecord>(
        r#"
        SELECT * FROM habit_records
        WHERE habit_id = $1 AND record_date = $2
        ORDER BY created_at ASC
        LIMIT 1
        "#,
    )
    .bind(body.habit_id)
    .bind(day)
    .fetch_optional(&state.db)
    .await?;

    let record = if let Some(existing) = existing {
        let record = sqlx::query_as::<_, HabitRecord>(
            r#"
            UPDATE habit_records SET completed = $2, notes = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(existing.id)
        .bind(body.completed)
        .bind(&body.notes)
        .fetch_one(&state.db)
        .await?;

        apply_completion_transition(&state, body.habit_id, existing.completed, record.completed, at)
            .await?;
        record
    } else {
        let record = sqlx::query_as::<_, HabitRecord>(
            r#"
            INSERT INTO habit_records (id, habit_id, user_id, record_date, completed, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(body.habit_id)
        .bind(auth_user.id)
        .bind(day)
        .bind(body.completed)
        .bind(&body.notes)
        .fetch_one(&state.db)
        .await?;

        apply_completion_transition(&state, body.habit_id, false, record.completed, at).await?;
        record
    };

    Ok(Json(record))
}

pub async fn update_record(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(record_id): Path<Uuid>,
    Json(body): Json<UpdateRecordRequest>,
) -> AppResult<Json<HabitRecord>> {
    let existing = sqlx::query_as::<_, HabitRecord>(
        "SELECT * FROM habit_records WHERE id = $1 AND user_id = $2",
    )
    .bind(record_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Record not found".into()))?;

    let record = sqlx::query_as::<_, HabitRecord>(
        r#"
        UPDATE habit_records SET
            completed = COALESCE($2, completed),
            notes = COALESCE($3, notes)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(record_id)
    .bind(body.completed)
    .bind(&body.notes)
    .fetch_one(&state.db)
    .await?;

    let at = existing.record_date.and_time(NaiveTime::MIN).and_utc();
    apply_completion_transition(&state, existing.habit_id, existing.completed, record.completed, at)
        .await?;

    Ok(Json(record))
}

/// Drive the streak engine from a record's completion transition. Edits that
/// leave `completed` unchanged (e.g. a notes tweak) don't touch the streak.
async fn apply_completion_transition(
    state: &AppState,
    habit_id: Uuid,
    was_completed: bool,
    is_completed: bool,
    at: chrono::DateTime<Utc>,
) -> AppResult<()> {
    let store = PgStore::new(&state.db);
    if !was_completed && is_completed {
        engine::on_record_completed(&store, habit_id, at).await?;
    } else if was_completed && !is_completed {
        engine::on_record_uncompleted(&store, habit_id).await?;
    }
    Ok(())
}
