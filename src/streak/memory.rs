use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::streak::Streak;
use crate::streak::store::{RecordStore, StreakStore};

/// Map-backed store mirroring the Postgres adapter, used by the engine tests.
#[derive(Default)]
pub struct MemoryStore {
    completed: Mutex<HashMap<Uuid, BTreeSet<NaiveDate>>>,
    streaks: Mutex<HashMap<Uuid, Streak>>,
}

impl MemoryStore {
    /// Store seeded with a zeroed snapshot, as habit creation would leave it.
    pub fn with_habit(habit_id: Uuid, user_id: Uuid) -> Self {
        let store = Self::default();
        store
            .streaks
            .lock()
            .unwrap()
            .insert(habit_id, Streak::zeroed(habit_id, user_id));
        store
    }

    pub fn set_completed(&self, habit_id: Uuid, day: NaiveDate, completed: bool) {
        let mut map = self.completed.lock().unwrap();
        let days = map.entry(habit_id).or_default();
        if completed {
            days.insert(day);
        } else {
            days.remove(&day);
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn completed_days(&self, habit_id: Uuid) -> anyhow::Result<Vec<NaiveDate>> {
        Ok(self
            .completed
            .lock()
            .unwrap()
            .get(&habit_id)
            .map(|days| days.iter().copied().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl StreakStore for MemoryStore {
    async fn get_streak(&self, habit_id: Uuid) -> anyhow::Result<Option<Streak>> {
        Ok(self.streaks.lock().unwrap().get(&habit_id).cloned())
    }

    async fn put_streak(&self, streak: &Streak) -> anyhow::Result<()> {
        self.streaks
            .lock()
            .unwrap()
            .insert(streak.habit_id, streak.clone());
        Ok(())
    }
}
