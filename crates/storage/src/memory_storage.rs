//! In-memory storage, for tests and throwaway runs.

use std::collections::HashMap;
use habitual_core::{Goal, GoalId};
use tokio::sync::RwLock;
use super::{GoalFilter, Storage, Result};

/// Storage backend that keeps goals in a map.
#[derive(Default)]
pub struct MemoryStorage {
    goals: RwLock<HashMap<GoalId, Goal>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn save_goal(&self, goal: Goal) -> Result<Goal> {
        self.goals.write().await.insert(goal.id, goal.clone());
        Ok(goal)
    }

    async fn load_goal(&self, id: GoalId) -> Result<Option<Goal>> {
        Ok(self.goals.read().await.get(&id).cloned())
    }

    async fn list_goals(&self, filter: &GoalFilter) -> Result<Vec<Goal>> {
        let mut goals: Vec<Goal> = self
            .goals
            .read()
            .await
            .values()
            .filter(|g| filter.matches(g))
            .cloned()
            .collect();
        goals.sort_by_key(|g| g.id);
        Ok(goals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use habitual_core::{Category, DailyTask, Difficulty, GoalKind, GoalStatus};

    fn plan(user_id: &str) -> Goal {
        let now = Utc::now();
        Goal {
            id: GoalId::new(),
            user_id: user_id.to_string(),
            kind: GoalKind::Ai,
            category: Category::Learning,
            difficulty: Difficulty::Hard,
            current_condition: Some("No Spanish".to_string()),
            desired_achievement: Some("Order dinner in Spanish".to_string()),
            title: None,
            description: None,
            date: None,
            start_date: now,
            timeframe_days: Some(1),
            daily_tasks: vec![DailyTask::new(1, "Learn greetings", "Basics first", Difficulty::Easy)],
            completed_days: 0,
            status: GoalStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_memory_roundtrip_and_filter() {
        let storage = MemoryStorage::new();
        let mine = storage.save_goal(plan("user123")).await.unwrap();
        storage.save_goal(plan("other")).await.unwrap();

        assert_eq!(storage.load_goal(mine.id).await.unwrap(), Some(mine.clone()));

        let found = storage.find_by_user("user123", Some(GoalStatus::Active)).await.unwrap();
        assert_eq!(found, vec![mine]);
        assert!(storage
            .find_by_user("user123", Some(GoalStatus::Completed))
            .await
            .unwrap()
            .is_empty());
    }
}
