//! Progress tracking service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::FixedOffset;
use habitual_core::{
    calendar_date, Category, DailyTask, Goal, GoalId, GoalKind, GoalStatus, Time,
};
use habitual_storage::{Result, Storage};
use serde::Serialize;

use crate::resolution::days_since_start;

/// Progress tracking service.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    /// Progress of one goal as of `now`.
    fn goal_progress(&self, goal: &Goal, now: Time) -> GoalProgress;

    /// Take a progress snapshot of every goal a user owns.
    async fn snapshot(&self, user_id: &str, now: Time) -> Result<ProgressSnapshot>;
}

/// A snapshot of progress at a point in time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// When snapshot was taken
    pub timestamp: Time,

    /// Per-goal progress, in store order
    pub goals: Vec<GoalProgress>,
}

/// Progress of a single goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    /// Goal
    pub goal_id: GoalId,

    /// Goal kind
    #[serde(rename = "type")]
    pub kind: GoalKind,

    /// Goal category
    pub category: Category,

    /// Goal status
    pub status: GoalStatus,

    /// Completed tasks
    pub completed_days: u32,

    /// Tasks needed to finish the goal
    pub target_days: u32,

    /// Percentage complete (0-100)
    pub percentage: f32,

    /// Plan day in effect as of the snapshot
    pub current_day: u32,

    /// Consecutive completed days ending at the current day
    pub current_streak: u32,

    /// Longest run of consecutive completed days
    pub longest_streak: u32,
}

/// Current and longest streak over a goal's tasks.
///
/// The current streak ends at `current_day`, or at the day before it when the
/// current day's task is still open, so an unfinished today does not break it.
pub fn streaks(tasks: &[DailyTask], current_day: u32) -> (u32, u32) {
    let last_day = tasks.iter().map(|t| t.day).max().unwrap_or(0) as usize;
    // done[d] is true when the task for day d is completed; index 0 is unused.
    let mut done = vec![false; last_day + 1];
    for task in tasks.iter().filter(|t| t.completed) {
        done[task.day as usize] = true;
    }
    let done_on = |day: u32| done.get(day as usize).copied().unwrap_or(false);

    let end = if done_on(current_day) {
        current_day
    } else {
        current_day.saturating_sub(1)
    };
    let current = (1..=end).rev().take_while(|&day| done_on(day)).count() as u32;

    let mut longest = 0;
    let mut run = 0;
    for &completed in done.iter().skip(1) {
        if completed {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }

    (current, longest)
}

/// Basic progress tracker implementation.
pub struct BasicProgressTracker {
    storage: Arc<dyn Storage>,
    offset: FixedOffset,
}

impl BasicProgressTracker {
    /// Create a new progress tracker.
    pub fn new(storage: Arc<dyn Storage>, offset: FixedOffset) -> Self {
        Self { storage, offset }
    }

    fn current_day(&self, goal: &Goal, now: Time) -> u32 {
        match goal.kind {
            GoalKind::Ai => {
                let last = goal.daily_tasks.len().max(1) as u32;
                let today = calendar_date(now, self.offset);
                days_since_start(goal.start_date, today, self.offset)
                    .saturating_add(1)
                    .min(last)
            }
            GoalKind::Manual => 1,
        }
    }
}

#[async_trait]
impl ProgressTracker for BasicProgressTracker {
    fn goal_progress(&self, goal: &Goal, now: Time) -> GoalProgress {
        let completed_days = goal.daily_tasks.iter().filter(|t| t.completed).count() as u32;
        let target_days = goal.target_days();
        let percentage = if target_days > 0 {
            (completed_days as f32 / target_days as f32 * 100.0).min(100.0)
        } else {
            0.0
        };
        let current_day = self.current_day(goal, now);
        let (current_streak, longest_streak) = streaks(&goal.daily_tasks, current_day);

        GoalProgress {
            goal_id: goal.id,
            kind: goal.kind,
            category: goal.category,
            status: goal.status,
            completed_days,
            target_days,
            percentage,
            current_day,
            current_streak,
            longest_streak,
        }
    }

    async fn snapshot(&self, user_id: &str, now: Time) -> Result<ProgressSnapshot> {
        let goals = self.storage.find_by_user(user_id, None).await?;
        Ok(ProgressSnapshot {
            timestamp: now,
            goals: goals.iter().map(|g| self.goal_progress(g, now)).collect(),
        })
    }
}
