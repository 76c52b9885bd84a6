mod story;
mod streak;

pub use story::{NewStory, Story, DATE_FORMAT};
pub use streak::{ReadOutcome, StreakState};
