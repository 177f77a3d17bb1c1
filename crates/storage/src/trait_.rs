//! Storage trait abstraction.

use async_trait::async_trait;
use habitual_core::{Goal, GoalId, GoalStatus};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Query over stored goals. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct GoalFilter {
    /// Owner to match
    pub user_id: Option<String>,

    /// Status to match
    pub status: Option<GoalStatus>,
}

impl GoalFilter {
    /// Match every goal owned by `user_id`.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            status: None,
        }
    }

    /// Restrict to one status.
    pub fn with_status(mut self, status: Option<GoalStatus>) -> Self {
        self.status = status;
        self
    }

    /// Whether `goal` passes this filter.
    pub fn matches(&self, goal: &Goal) -> bool {
        self.user_id.as_deref().map_or(true, |u| goal.user_id == u)
            && self.status.map_or(true, |s| goal.status == s)
    }
}

/// Storage abstraction for goal documents.
///
/// Every write replaces the whole goal document. Results of
/// [`Storage::list_goals`] are ordered by goal id, i.e. by creation time.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Save a goal (create or replace) and return what was stored.
    async fn save_goal(&self, goal: Goal) -> Result<Goal>;

    /// Load a goal by ID.
    async fn load_goal(&self, id: GoalId) -> Result<Option<Goal>>;

    /// List goals matching the filter.
    async fn list_goals(&self, filter: &GoalFilter) -> Result<Vec<Goal>>;

    /// List a user's goals, optionally with one status.
    async fn find_by_user(&self, user_id: &str, status: Option<GoalStatus>) -> Result<Vec<Goal>> {
        self.list_goals(&GoalFilter::for_user(user_id).with_status(status))
            .await
    }
}
