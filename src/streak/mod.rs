//! Streak computation and consistency engine.
//!
//! Keeps each habit's [`Streak`](crate::models::streak::Streak) snapshot
//! consistent with the true history of completed days, at calendar-day
//! granularity. Two entry algorithms: an incremental update applied on each
//! completion, and a full recomputation from history used whenever the
//! incremental rule cannot be trusted (un-completing a day, backfilling an
//! earlier day).
//!
//! The engine never touches the database directly; it goes through the
//! [`store::RecordStore`] and [`store::StreakStore`] traits, injected by the
//! caller. At runtime that is [`pg::PgStore`]; the engine tests run against a
//! map-backed store.

pub mod engine;
pub mod pg;
pub mod store;

#[cfg(test)]
pub(crate) mod memory;
