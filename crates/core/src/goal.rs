//! Goal model - a habit-building commitment and its day-by-day tasks.

use serde::{Deserialize, Serialize};
use crate::id::GoalId;
use crate::{ParseError, Time};

/// A goal is either an AI-generated multi-day plan or a single manual entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Unique identifier
    pub id: GoalId,

    /// Owner reference
    pub user_id: String,

    /// Which resolution rule applies; never changes after creation
    #[serde(rename = "type", alias = "kind")]
    pub kind: GoalKind,

    /// Classification tag
    pub category: Category,

    /// Overall difficulty
    pub difficulty: Difficulty,

    /// Where the user starts from (AI goals)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_condition: Option<String>,

    /// What the user wants to reach (AI goals)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_achievement: Option<String>,

    /// Title (manual goals)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description (manual goals)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Pinned calendar date as `YYYY-MM-DD` (manual goals)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Day offsets are computed from this instant's calendar date
    pub start_date: Time,

    /// Plan length in days (AI goals)
    #[serde(default, rename = "timeframe", skip_serializing_if = "Option::is_none")]
    pub timeframe_days: Option<u32>,

    /// Tasks in day order
    pub daily_tasks: Vec<DailyTask>,

    /// Cached count of completed tasks, see [`Goal::recompute_completed_days`]
    #[serde(default)]
    pub completed_days: u32,

    /// Goal status
    pub status: GoalStatus,

    /// When created
    pub created_at: Time,

    /// Last updated
    pub updated_at: Time,
}

impl Goal {
    /// Find a task by its day number.
    pub fn task(&self, day: u32) -> Option<&DailyTask> {
        self.daily_tasks.iter().find(|t| t.day == day)
    }

    /// Find a task by its day number, mutably.
    pub fn task_mut(&mut self, day: u32) -> Option<&mut DailyTask> {
        self.daily_tasks.iter_mut().find(|t| t.day == day)
    }

    /// Number of completed tasks needed for the goal to count as completed.
    ///
    /// AI goals use their timeframe; manual goals have a single task.
    pub fn target_days(&self) -> u32 {
        match self.kind {
            GoalKind::Ai => self
                .timeframe_days
                .unwrap_or(self.daily_tasks.len() as u32),
            GoalKind::Manual => self.daily_tasks.len() as u32,
        }
    }

    /// Recount completed tasks from the task list and store the result.
    pub fn recompute_completed_days(&mut self) -> u32 {
        self.completed_days = self.daily_tasks.iter().filter(|t| t.completed).count() as u32;
        self.completed_days
    }

    /// Re-derive `completed_days` and `status` after a task mutation.
    ///
    /// Abandoned goals keep their status.
    pub fn sync_derived_state(&mut self) {
        let completed = self.recompute_completed_days();
        if self.status == GoalStatus::Abandoned {
            return;
        }
        self.status = if completed == self.target_days() {
            GoalStatus::Completed
        } else {
            GoalStatus::Active
        };
    }
}

/// One day's concrete action within a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTask {
    /// 1-based sequence number
    pub day: u32,

    /// Task title
    pub goal: String,

    /// Why this task, or how to do it
    pub explanation: String,

    /// Task difficulty
    pub difficulty: Difficulty,

    /// Whether the user finished it
    #[serde(default)]
    pub completed: bool,

    /// When it was marked completed
    #[serde(default)]
    pub completed_at: Option<Time>,

    /// Pinned calendar date (manual goals only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl DailyTask {
    /// Create an open task.
    pub fn new(
        day: u32,
        goal: impl Into<String>,
        explanation: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            day,
            goal: goal.into(),
            explanation: explanation.into(),
            difficulty,
            completed: false,
            completed_at: None,
            date: None,
        }
    }

    /// Set completion state.
    ///
    /// Marking an already completed task keeps its original timestamp.
    pub fn set_completed(&mut self, completed: bool, now: Time) {
        if completed {
            if !self.completed || self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }
        self.completed = completed;
    }
}

/// How a goal's timeline was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    /// Generated multi-day plan, resolved by day offset
    Ai,
    /// Single task pinned to a calendar date
    Manual,
}

/// Goal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    /// Goal is active
    Active,
    /// Every task is done
    Completed,
    /// Given up by the user
    Abandoned,
}

impl GoalStatus {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Abandoned => "abandoned",
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(GoalStatus::Active),
            "completed" => Ok(GoalStatus::Completed),
            "abandoned" => Ok(GoalStatus::Abandoned),
            _ => Err(ParseError::invalid("status", s)),
        }
    }
}

/// Difficulty of a goal or task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Simple daily actions
    Easy,
    /// Moderate effort required
    Medium,
    /// Challenging commitment
    Hard,
}

impl Difficulty {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseError::invalid("difficulty", s)),
        }
    }
}

/// Goal category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Exercise and training
    Fitness,
    /// Diet, sleep, general wellbeing
    Health,
    /// Study and skills
    Learning,
    /// Meditation and reflection
    Mindfulness,
}

impl Category {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fitness => "fitness",
            Category::Health => "health",
            Category::Learning => "learning",
            Category::Mindfulness => "mindfulness",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fitness" => Ok(Category::Fitness),
            "health" => Ok(Category::Health),
            "learning" => Ok(Category::Learning),
            "mindfulness" => Ok(Category::Mindfulness),
            _ => Err(ParseError::invalid("category", s)),
        }
    }
}
