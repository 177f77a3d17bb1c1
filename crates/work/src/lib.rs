//! Goal Lifecycle and Completion (Layer 2)
//!
//! Goal creation, explicit status transitions, and per-task completion
//! tracking.

#![warn(missing_docs)]

pub mod error;
pub mod locks;
pub mod manager;
pub mod completion;

pub use error::{GoalError, Result};
pub use locks::GoalLocks;
pub use manager::{AiGoalSpec, GoalManager, ManualGoalSpec};
pub use completion::CompletionTracker;
