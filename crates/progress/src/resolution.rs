//! Daily task resolution.
//!
//! Decides which task of each active goal is due on a given day. AI goals are
//! addressed by whole calendar days elapsed since their start date; manual
//! goals by exact `YYYY-MM-DD` string match against their pinned date. The
//! two rules never mix: a goal's `kind` selects exactly one of them.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use habitual_core::{
    calendar_date, format_calendar_date, Category, DailyTask, Goal, GoalId, GoalKind,
    GoalStatus, Time,
};
use habitual_storage::{Result, Storage};
use serde::Serialize;
use tracing::debug;

/// A task due today, with the goal it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayTask {
    /// Owning goal
    pub goal_id: GoalId,

    /// Owning goal's category
    pub category: Category,

    /// The due task
    pub task: DailyTask,
}

/// Whole calendar days from the start date to `today`, never negative.
pub fn days_since_start(start_date: Time, today: NaiveDate, offset: FixedOffset) -> u32 {
    let start = calendar_date(start_date, offset);
    let days = (today - start).num_days().max(0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// The task of an AI goal due on `today`, if the plan reaches that far.
pub fn ai_task_for(goal: &Goal, today: NaiveDate, offset: FixedOffset) -> Option<&DailyTask> {
    let day = days_since_start(goal.start_date, today, offset).checked_add(1)?;
    goal.task(day)
}

/// The task of a manual goal if it is pinned to `today` (`YYYY-MM-DD`).
pub fn manual_task_for<'a>(goal: &'a Goal, today: &str) -> Option<&'a DailyTask> {
    let task = goal.daily_tasks.first()?;
    let pinned = task.date.as_deref().or(goal.date.as_deref())?;
    (pinned == today).then_some(task)
}

/// Resolve today's tasks from an already fetched list of active goals.
///
/// AI goals come first, then manual goals; each group keeps input order.
pub fn resolve(goals: &[Goal], now: Time, offset: FixedOffset) -> Vec<TodayTask> {
    let today = calendar_date(now, offset);
    let today_str = format_calendar_date(today);

    let (ai_goals, manual_goals): (Vec<&Goal>, Vec<&Goal>) =
        goals.iter().partition(|g| g.kind == GoalKind::Ai);

    let ai = ai_goals
        .into_iter()
        .filter_map(|goal| ai_task_for(goal, today, offset).map(|task| (goal, task)));
    let manual = manual_goals
        .into_iter()
        .filter_map(|goal| manual_task_for(goal, &today_str).map(|task| (goal, task)));

    ai.chain(manual)
        .map(|(goal, task)| TodayTask {
            goal_id: goal.id,
            category: goal.category,
            task: task.clone(),
        })
        .collect()
}

/// Reads a user's active goals and resolves today's tasks.
pub struct ResolutionEngine {
    storage: Arc<dyn Storage>,
    offset: FixedOffset,
}

impl ResolutionEngine {
    /// Create an engine. `offset` is the reference timezone for calendar dates.
    pub fn new(storage: Arc<dyn Storage>, offset: FixedOffset) -> Self {
        Self { storage, offset }
    }

    /// Tasks due on the calendar day containing `now`.
    pub async fn today_tasks(&self, user_id: &str, now: Time) -> Result<Vec<TodayTask>> {
        let goals = self
            .storage
            .find_by_user(user_id, Some(GoalStatus::Active))
            .await?;
        let tasks = resolve(&goals, now, self.offset);
        debug!(
            user_id,
            active_goals = goals.len(),
            due = tasks.len(),
            today = %calendar_date(now, self.offset),
            "Resolved today's tasks"
        );
        Ok(tasks)
    }
}
