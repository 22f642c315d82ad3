use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{CreateHabitRequest, UpdateHabitRequest};
use crate::error::{AppError, AppResult};
use crate::models::habit::{Habit, HabitWithStreak};
use crate::models::streak::Streak;
use crate::streak::{engine, pg::PgStore};
use crate::AppState;

pub async fn list_habits(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<HabitWithStreak>>> {
    let habits = sqlx::query_as::<_, Habit>(
        r#"
        SELECT * FROM habits
        WHERE user_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    let mut result = Vec::with_capacity(habits.len());
    for habit in habits {
        let streak = sqlx::query_as::<_, Streak>("SELECT * FROM streaks WHERE habit_id = $1")
            .bind(habit.id)
            .fetch_optional(&state.db)
            .await?
            .unwrap_or_else(|| Streak::zeroed(habit.id, habit.user_id));

        result.push(HabitWithStreak { habit, streak });
    }

    Ok(Json(result))
}

pub async fn get_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<Habit>> {
    let habit = sqlx::query_as::<_, Habit>(
        "SELECT * FROM habits WHERE id = $1 AND user_id = $2",
    )
    .bind(habit_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Habit not found".into()))?;

    Ok(Json(habit))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateHabitRequest>,
) -> AppResult<Json<Habit>> {
    body.validate()?;

    let id = Uuid::new_v4();

    // Habit and its zeroed streak snapshot are created together.
    let mut tx = state.db.begin().await?;

    let habit = sqlx::query_as::<_, Habit>(
        r#"
        INSERT INTO habits (id, user_id, name, description, goal_value, goal_unit, category)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(auth_user.id)
    .bind(&body.name)
    .bind(&body.description)
    .bind(body.goal_value)
    .bind(&body.goal_unit)
    .bind(&body.category)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO streaks (habit_id, user_id) VALUES ($1, $2)")
        .bind(id)
        .bind(auth_user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(habit))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
    Json(body): Json<UpdateHabitRequest>,
) -> AppResult<Json<Habit>> {
    body.validate()?;

    let habit = sqlx::query_as::<_, Habit>(
        r#"
        UPDATE habits SET
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            goal_value = COALESCE($5, goal_value),
            goal_unit = COALESCE($6, goal_unit),
            category = COALESCE($7, category)
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(habit_id)
    .bind(auth_user.id)
    .bind(&body.name)
    .bind(&body.description)
    .bind(body.goal_value)
    .bind(&body.goal_unit)
    .bind(&body.category)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Habit not found".into()))?;

    Ok(Json(habit))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    // Records and the streak snapshot go with the habit (FK cascade).
    let result = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
        .bind(habit_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Habit not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn get_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<Streak>> {
    let _habit = sqlx::query_as::<_, Habit>(
        "SELECT * FROM habits WHERE id = $1 AND user_id = $2",
    )
    .bind(habit_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Habit not found".into()))?;

    let streak = sqlx::query_as::<_, Streak>("SELECT * FROM streaks WHERE habit_id = $1")
        .bind(habit_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("No streak tracked for habit".into()))?;

    Ok(Json(streak))
}

/// Rebuild the streak snapshot from record history.
pub async fn recompute_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<Streak>> {
    let _habit = sqlx::query_as::<_, Habit>(
        "SELECT * FROM habits WHERE id = $1 AND user_id = $2",
    )
    .bind(habit_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Habit not found".into()))?;

    let store = PgStore::new(&state.db);
    let streak = engine::recompute(&store, habit_id).await?;

    Ok(Json(streak))
}
