use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::streak::Streak;
use crate::streak::store::{RecordStore, StreakStore};

#[derive(Debug, thiserror::Error)]
pub enum StreakError {
    #[error("no streak tracked for habit {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Apply a completion recorded at instant `at` to the habit's streak.
///
/// Only the calendar day of `at` matters; two completions on the same day are
/// the same day for streak purposes. The record itself must already be
/// persisted before this is called, so that the recompute fallback sees it.
pub async fn on_record_completed<S>(
    store: &S,
    habit_id: Uuid,
    at: DateTime<Utc>,
) -> Result<Streak, StreakError>
where
    S: RecordStore + StreakStore,
{
    let day = at.date_naive();
    let mut streak = store
        .get_streak(habit_id)
        .await?
        .ok_or(StreakError::NotFound(habit_id))?;

    match streak.last_completed_date {
        None => {
            streak.current_streak = 1;
            streak.last_completed_date = Some(day);
        }
        Some(last) if day == last => {
            // Re-completing the same day is a no-op.
        }
        Some(last) if day < last => {
            // Backfill behind the frontier. The incremental rule only knows
            // "same day" and "next day", so rebuild from history instead of
            // guessing.
            return recompute(store, habit_id).await;
        }
        Some(last) if (day - last).num_days() == 1 => {
            streak.current_streak += 1;
            streak.last_completed_date = Some(day);
        }
        Some(_) => {
            // Forward gap of at least one day breaks the run.
            streak.current_streak = 1;
            streak.last_completed_date = Some(day);
        }
    }

    streak.longest_streak = streak.longest_streak.max(streak.current_streak);
    store.put_streak(&streak).await?;
    Ok(streak)
}

/// React to a previously-completed record being flipped back to incomplete.
///
/// The incremental rule cannot undo an increment without knowing whether
/// other days still justify it, so this always rebuilds from history.
pub async fn on_record_uncompleted<S>(store: &S, habit_id: Uuid) -> Result<Streak, StreakError>
where
    S: RecordStore + StreakStore,
{
    recompute(store, habit_id).await
}

/// Rebuild the snapshot from the full set of completed days.
///
/// A pure function of that set, so running it twice on unchanged data yields
/// an identical snapshot.
pub async fn recompute<S>(store: &S, habit_id: Uuid) -> Result<Streak, StreakError>
where
    S: RecordStore + StreakStore,
{
    let mut streak = store
        .get_streak(habit_id)
        .await?
        .ok_or(StreakError::NotFound(habit_id))?;

    let days = store.completed_days(habit_id).await?;

    if days.is_empty() {
        // Zero completions zeroes the current run but does not erase the
        // historical maximum.
        streak.current_streak = 0;
        streak.last_completed_date = None;
    } else {
        let mut run = 1i32;
        let mut max_run = 1i32;
        for pair in days.windows(2) {
            let gap = (pair[1] - pair[0]).num_days();
            if gap == 0 {
                // Duplicate day; the store already dedups, skip if one slips
                // through.
                continue;
            }
            if gap == 1 {
                run += 1;
            } else {
                run = 1;
            }
            max_run = max_run.max(run);
        }
        streak.current_streak = run;
        streak.longest_streak = max_run;
        streak.last_completed_date = days.last().copied();
    }

    store.put_streak(&streak).await?;
    Ok(streak)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::streak::memory::MemoryStore;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    /// Persist the record the way the write path would, then run the engine.
    async fn complete(store: &MemoryStore, habit_id: Uuid, y: i32, m: u32, d: u32) -> Streak {
        store.set_completed(habit_id, day(y, m, d), true);
        on_record_completed(store, habit_id, at(y, m, d))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn first_completion_starts_a_streak() {
        let habit_id = Uuid::new_v4();
        let store = MemoryStore::with_habit(habit_id, Uuid::new_v4());

        let streak = complete(&store, habit_id, 2024, 1, 1).await;

        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.longest_streak, 1);
        assert_eq!(streak.last_completed_date, Some(day(2024, 1, 1)));
    }

    #[tokio::test]
    async fn same_day_completion_is_idempotent() {
        let habit_id = Uuid::new_v4();
        let store = MemoryStore::with_habit(habit_id, Uuid::new_v4());

        let first = complete(&store, habit_id, 2024, 1, 1).await;
        let second = complete(&store, habit_id, 2024, 1, 1).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn consecutive_days_extend_the_streak() {
        let habit_id = Uuid::new_v4();
        let store = MemoryStore::with_habit(habit_id, Uuid::new_v4());

        complete(&store, habit_id, 2024, 1, 1).await;
        complete(&store, habit_id, 2024, 1, 2).await;
        let streak = complete(&store, habit_id, 2024, 1, 3).await;

        assert_eq!(streak.current_streak, 3);
        assert_eq!(streak.longest_streak, 3);
        assert_eq!(streak.last_completed_date, Some(day(2024, 1, 3)));
    }

    #[tokio::test]
    async fn gap_resets_current_but_keeps_longest() {
        let habit_id = Uuid::new_v4();
        let store = MemoryStore::with_habit(habit_id, Uuid::new_v4());

        complete(&store, habit_id, 2024, 1, 1).await;
        complete(&store, habit_id, 2024, 1, 2).await;
        let streak = complete(&store, habit_id, 2024, 1, 4).await;

        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.longest_streak, 2);
        assert_eq!(streak.last_completed_date, Some(day(2024, 1, 4)));
    }

    #[tokio::test]
    async fn calendar_day_boundary_counts_as_consecutive() {
        let habit_id = Uuid::new_v4();
        let store = MemoryStore::with_habit(habit_id, Uuid::new_v4());

        // 23:59 and 00:01 the next day are ~2 minutes apart but land on
        // adjacent calendar days.
        store.set_completed(habit_id, day(2024, 3, 1), true);
        on_record_completed(
            &store,
            habit_id,
            Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap(),
        )
        .await
        .unwrap();

        store.set_completed(habit_id, day(2024, 3, 2), true);
        let streak = on_record_completed(
            &store,
            habit_id,
            Utc.with_ymd_and_hms(2024, 3, 2, 0, 1, 0).unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(streak.current_streak, 2);
    }

    #[tokio::test]
    async fn backfilled_earlier_day_rebuilds_from_history() {
        let habit_id = Uuid::new_v4();
        let store = MemoryStore::with_habit(habit_id, Uuid::new_v4());

        complete(&store, habit_id, 2024, 1, 2).await;
        complete(&store, habit_id, 2024, 1, 3).await;
        // Jan 1 arrives late; the run is now Jan 1..=Jan 3.
        let streak = complete(&store, habit_id, 2024, 1, 1).await;

        assert_eq!(streak.current_streak, 3);
        assert_eq!(streak.longest_streak, 3);
        assert_eq!(streak.last_completed_date, Some(day(2024, 1, 3)));
    }

    #[tokio::test]
    async fn incremental_matches_recompute_for_monotonic_insertion() {
        let habit_id = Uuid::new_v4();
        let store = MemoryStore::with_habit(habit_id, Uuid::new_v4());

        // Strictly increasing days with runs and gaps mixed in.
        let days = [
            (2024, 1, 1),
            (2024, 1, 2),
            (2024, 1, 3),
            (2024, 1, 7),
            (2024, 1, 8),
            (2024, 2, 1),
            (2024, 2, 2),
            (2024, 2, 3),
            (2024, 2, 4),
            (2024, 2, 5),
        ];
        let mut incremental = None;
        for (y, m, d) in days {
            incremental = Some(complete(&store, habit_id, y, m, d).await);
        }

        let recomputed = recompute(&store, habit_id).await.unwrap();
        assert_eq!(incremental.unwrap(), recomputed);
        assert_eq!(recomputed.current_streak, 5);
        assert_eq!(recomputed.longest_streak, 5);
        assert_eq!(recomputed.last_completed_date, Some(day(2024, 2, 5)));
    }

    #[tokio::test]
    async fn recompute_is_idempotent() {
        let habit_id = Uuid::new_v4();
        let store = MemoryStore::with_habit(habit_id, Uuid::new_v4());

        for (y, m, d) in [(2024, 1, 1), (2024, 1, 2), (2024, 1, 5)] {
            complete(&store, habit_id, y, m, d).await;
        }

        let first = recompute(&store, habit_id).await.unwrap();
        let second = recompute(&store, habit_id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn recompute_on_empty_history_keeps_longest() {
        let habit_id = Uuid::new_v4();
        let store = MemoryStore::with_habit(habit_id, Uuid::new_v4());

        complete(&store, habit_id, 2024, 1, 1).await;
        complete(&store, habit_id, 2024, 1, 2).await;
        store.set_completed(habit_id, day(2024, 1, 1), false);
        store.set_completed(habit_id, day(2024, 1, 2), false);

        let streak = on_record_uncompleted(&store, habit_id).await.unwrap();

        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 2);
        assert_eq!(streak.last_completed_date, None);
    }

    #[tokio::test]
    async fn uncompleting_a_day_rebuilds_the_snapshot() {
        let habit_id = Uuid::new_v4();
        let store = MemoryStore::with_habit(habit_id, Uuid::new_v4());

        // Complete Jan 1, Jan 2, then Jan 5 after a gap.
        complete(&store, habit_id, 2024, 1, 1).await;
        let s = complete(&store, habit_id, 2024, 1, 2).await;
        assert_eq!((s.current_streak, s.longest_streak), (2, 2));

        let s = complete(&store, habit_id, 2024, 1, 5).await;
        assert_eq!((s.current_streak, s.longest_streak), (1, 2));
        assert_eq!(s.last_completed_date, Some(day(2024, 1, 5)));

        // Un-complete Jan 5; only the Jan 1..=Jan 2 run remains.
        store.set_completed(habit_id, day(2024, 1, 5), false);
        let s = on_record_uncompleted(&store, habit_id).await.unwrap();
        assert_eq!((s.current_streak, s.longest_streak), (2, 2));
        assert_eq!(s.last_completed_date, Some(day(2024, 1, 2)));
    }

    #[tokio::test]
    async fn unknown_habit_is_not_found() {
        let store = MemoryStore::with_habit(Uuid::new_v4(), Uuid::new_v4());
        let missing = Uuid::new_v4();

        let err = on_record_completed(&store, missing, at(2024, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StreakError::NotFound(id) if id == missing));

        let err = recompute(&store, missing).await.unwrap_err();
        assert!(matches!(err, StreakError::NotFound(id) if id == missing));
    }
}
