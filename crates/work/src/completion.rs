//! Task completion tracking.

use std::sync::Arc;

use habitual_core::{Goal, GoalId, GoalStatus, Time};
use habitual_storage::Storage;
use tracing::{debug, info};

use crate::error::{GoalError, Result};
use crate::locks::GoalLocks;

/// Toggles task completion and re-derives goal progress and status.
pub struct CompletionTracker {
    storage: Arc<dyn Storage>,
    locks: Arc<GoalLocks>,
}

impl CompletionTracker {
    /// Create a tracker sharing `locks` with the goal manager.
    pub fn new(storage: Arc<dyn Storage>, locks: Arc<GoalLocks>) -> Self {
        Self { storage, locks }
    }

    /// Mark the task for `day` of a goal as completed or not.
    ///
    /// Repeating a call with the same arguments leaves the goal unchanged.
    /// A goal whose every task is done becomes `completed`; undoing any task
    /// of a completed goal makes it `active` again.
    pub async fn set_completion(
        &self,
        goal_id: GoalId,
        day: u32,
        completed: bool,
        now: Time,
    ) -> Result<Goal> {
        let _guard = self.locks.lock(goal_id).await;

        let mut goal = self
            .storage
            .load_goal(goal_id)
            .await?
            .ok_or_else(|| GoalError::NotFound(format!("goal {goal_id}")))?;

        if goal.status == GoalStatus::Abandoned {
            return Err(GoalError::Validation(format!(
                "goal {goal_id} is abandoned"
            )));
        }

        let before = goal.clone();
        goal.task_mut(day)
            .ok_or_else(|| GoalError::NotFound(format!("task for day {day} of goal {goal_id}")))?
            .set_completed(completed, now);
        goal.sync_derived_state();

        if goal == before {
            debug!(goal_id = %goal_id, day, completed, "Completion unchanged");
            return Ok(goal);
        }

        goal.updated_at = now;
        let goal = self.storage.save_goal(goal).await?;
        info!(
            goal_id = %goal_id,
            day,
            completed,
            completed_days = goal.completed_days,
            status = %goal.status,
            "Updated task completion"
        );
        Ok(goal)
    }
}
