use chrono::NaiveDate;

/// The singleton reading streak. `longest_streak >= current_streak` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakState {
    pub last_read_date: Option<NaiveDate>,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A read was recorded; holds the new state.
    Counted(StreakState),
    /// Today was already counted; holds the unchanged state.
    AlreadyCounted(StreakState),
}

impl ReadOutcome {
    pub fn state(&self) -> StreakState {
        match self {
            ReadOutcome::Counted(state) | ReadOutcome::AlreadyCounted(state) => *state,
        }
    }
}
