//! Goal lifecycle management.
//!
//! Creates AI and manual goals, normalizing both into a day-indexed task
//! timeline, and performs explicit status transitions.

use std::sync::Arc;

use chrono::FixedOffset;
use habitual_ai::PlanGenerator;
use habitual_core::{
    format_calendar_date, parse_calendar_date, start_of_day, Category, DailyTask, Difficulty,
    Goal, GoalId, GoalKind, GoalStatus, Time,
};
use habitual_storage::Storage;
use tracing::{info, warn};

use crate::error::{required, GoalError, Result};
use crate::locks::GoalLocks;

/// Input for an AI-planned goal.
#[derive(Debug, Clone)]
pub struct AiGoalSpec {
    /// Owner
    pub user_id: String,
    /// Where the user starts from
    pub current_condition: String,
    /// What the user wants to reach
    pub desired_achievement: String,
    /// Requested plan length in days; must be positive
    pub timeframe_days: i64,
    /// Category name
    pub category: String,
    /// Difficulty name
    pub difficulty: String,
}

/// Input for a manual single-day goal.
#[derive(Debug, Clone)]
pub struct ManualGoalSpec {
    /// Owner
    pub user_id: String,
    /// Task title
    pub title: String,
    /// Task description
    pub description: String,
    /// Target date as `YYYY-MM-DD`
    pub date: String,
    /// Category name
    pub category: String,
    /// Difficulty name
    pub difficulty: String,
}

/// Creates goals and moves them between lifecycle states.
pub struct GoalManager {
    storage: Arc<dyn Storage>,
    generator: Arc<dyn PlanGenerator>,
    locks: Arc<GoalLocks>,
    offset: FixedOffset,
}

impl GoalManager {
    /// Create a manager. `offset` is the reference timezone for calendar dates.
    pub fn new(
        storage: Arc<dyn Storage>,
        generator: Arc<dyn PlanGenerator>,
        locks: Arc<GoalLocks>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            storage,
            generator,
            locks,
            offset,
        }
    }

    /// Generate a plan and store it as a new active AI goal.
    ///
    /// Nothing is stored if validation or generation fails.
    pub async fn create_ai_goal(&self, spec: AiGoalSpec, now: Time) -> Result<Goal> {
        let user_id = required("userId", &spec.user_id)?;
        let current_condition = required("currentCondition", &spec.current_condition)?;
        let desired_achievement = required("goal", &spec.desired_achievement)?;
        let category = parse_category(&spec.category)?;
        let difficulty = parse_difficulty(&spec.difficulty)?;
        let timeframe_days = u32::try_from(spec.timeframe_days)
            .ok()
            .filter(|days| *days > 0)
            .ok_or_else(|| GoalError::invalid("timeframe", "must be a positive number of days"))?;

        let daily_tasks = self
            .generator
            .generate(&current_condition, &desired_achievement, timeframe_days)
            .await
            .map_err(|e| {
                warn!(user_id = %user_id, error = %e, "Plan generation failed");
                GoalError::from(e)
            })?;

        let goal = Goal {
            id: GoalId::new(),
            user_id,
            kind: GoalKind::Ai,
            category,
            difficulty,
            current_condition: Some(current_condition),
            desired_achievement: Some(desired_achievement),
            title: None,
            description: None,
            date: None,
            start_date: now,
            timeframe_days: Some(timeframe_days),
            daily_tasks,
            completed_days: 0,
            status: GoalStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let goal = self.storage.save_goal(goal).await?;
        info!(goal_id = %goal.id, days = timeframe_days, "Created AI goal");
        Ok(goal)
    }

    /// Store a new active manual goal pinned to one calendar date.
    pub async fn create_manual_goal(&self, spec: ManualGoalSpec, now: Time) -> Result<Goal> {
        let user_id = required("userId", &spec.user_id)?;
        let title = required("title", &spec.title)?;
        let description = required("description", &spec.description)?;
        let date = required("date", &spec.date)?;
        let category = parse_category(&spec.category)?;
        let difficulty = parse_difficulty(&spec.difficulty)?;
        let target = parse_calendar_date(&date)
            .map_err(|_| GoalError::invalid("date", "must be a calendar date in YYYY-MM-DD form"))?;
        let date = format_calendar_date(target);

        let mut task = DailyTask::new(1, title.clone(), description.clone(), difficulty);
        task.date = Some(date.clone());

        let goal = Goal {
            id: GoalId::new(),
            user_id,
            kind: GoalKind::Manual,
            category,
            difficulty,
            current_condition: None,
            desired_achievement: None,
            title: Some(title),
            description: Some(description),
            date: Some(date),
            start_date: start_of_day(target, self.offset),
            timeframe_days: None,
            daily_tasks: vec![task],
            completed_days: 0,
            status: GoalStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let goal = self.storage.save_goal(goal).await?;
        info!(goal_id = %goal.id, date = ?goal.date, "Created manual goal");
        Ok(goal)
    }

    /// Mark an active goal as abandoned.
    ///
    /// Abandoning an abandoned goal is a no-op; completed goals cannot be
    /// abandoned.
    pub async fn abandon_goal(&self, id: GoalId, now: Time) -> Result<Goal> {
        let _guard = self.locks.lock(id).await;
        let mut goal = self.load(id).await?;

        match goal.status {
            GoalStatus::Abandoned => return Ok(goal),
            GoalStatus::Completed => {
                return Err(GoalError::Validation(format!(
                    "goal {id} is already completed"
                )))
            }
            GoalStatus::Active => {}
        }

        goal.status = GoalStatus::Abandoned;
        goal.updated_at = now;
        let goal = self.storage.save_goal(goal).await?;
        info!(goal_id = %id, "Abandoned goal");
        Ok(goal)
    }

    /// Load one goal.
    pub async fn get_goal(&self, id: GoalId) -> Result<Goal> {
        self.load(id).await
    }

    /// A user's goals, optionally restricted to one status.
    pub async fn list_goals(&self, user_id: &str, status: Option<GoalStatus>) -> Result<Vec<Goal>> {
        let user_id = required("userId", user_id)?;
        Ok(self.storage.find_by_user(&user_id, status).await?)
    }

    async fn load(&self, id: GoalId) -> Result<Goal> {
        self.storage
            .load_goal(id)
            .await?
            .ok_or_else(|| GoalError::NotFound(format!("goal {id}")))
    }
}

fn parse_category(value: &str) -> Result<Category> {
    required("category", value)?
        .parse()
        .map_err(|_| GoalError::invalid("category", "must be one of fitness, health, learning, mindfulness"))
}

fn parse_difficulty(value: &str) -> Result<Difficulty> {
    required("difficulty", value)?
        .parse()
        .map_err(|_| GoalError::invalid("difficulty", "must be one of easy, medium, hard"))
}
