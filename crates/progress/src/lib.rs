//! Daily Resolution and Progress Tracking (Layer 3)
//!
//! Which task is due today for each active goal, plus completion
//! percentages and streaks.

#![warn(missing_docs)]

pub mod resolution;
pub mod tracker;

pub use resolution::{
    ai_task_for, days_since_start, manual_task_for, resolve, ResolutionEngine, TodayTask,
};
pub use tracker::{streaks, BasicProgressTracker, GoalProgress, ProgressSnapshot, ProgressTracker};
