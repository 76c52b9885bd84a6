//! Daily reading streak.
//!
//! A streak counts consecutive calendar days on which a story was read.
//! Reading again on a day that was already counted changes nothing; missing
//! a day (or the clock moving backwards) starts the count over at one.

use chrono::NaiveDate;

use crate::db::Repository;
use crate::error::Result;
use crate::models::{ReadOutcome, StreakState};

/// Computes the state after a read on `today`.
pub fn advance(state: &StreakState, today: NaiveDate) -> ReadOutcome {
    let current_streak = match state.last_read_date {
        None => 1,
        Some(last) => match (today - last).num_days() {
            0 => return ReadOutcome::AlreadyCounted(*state),
            1 => state.current_streak.saturating_add(1),
            // Gaps and negative gaps both reset.
            _ => 1,
        },
    };

    ReadOutcome::Counted(StreakState {
        last_read_date: Some(today),
        current_streak,
        longest_streak: state.longest_streak.max(current_streak),
    })
}

/// The streak row, loaded once at startup and written through on every read.
pub struct StreakTracker {
    state: StreakState,
}

impl StreakTracker {
    pub async fn load(repository: &Repository) -> Result<Self> {
        let state = repository.get_streak().await?;
        Ok(Self { state })
    }

    pub fn state(&self) -> &StreakState {
        &self.state
    }

    pub async fn record_read(
        &mut self,
        repository: &Repository,
        today: NaiveDate,
    ) -> Result<ReadOutcome> {
        let outcome = advance(&self.state, today);
        if let ReadOutcome::Counted(next) = outcome {
            repository.save_streak(next).await?;
            tracing::info!(
                current = next.current_streak,
                longest = next.longest_streak,
                "Recorded read for {}",
                today
            );
        }
        self.state = outcome.state();
        Ok(outcome)
    }
}
