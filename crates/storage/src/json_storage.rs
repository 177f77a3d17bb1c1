//! JSON file storage implementation.
//!
//! Stores one JSON document per goal in a data directory and keeps a small
//! per-goal meta marker (version + updated_at) next to it.

use std::path::{Path, PathBuf};
use habitual_core::{Goal, GoalId};
use super::{GoalFilter, Storage, Result};
use tokio::fs;
use tracing::debug;

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage. This will create the `goals/` and `meta/goals/`
    /// subdirectories under `root`.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("goals")).await?;
        fs::create_dir_all(root.join("meta").join("goals")).await?;

        Ok(Self { root })
    }

    fn goal_path(&self, id: GoalId) -> PathBuf {
        self.root.join("goals").join(format!("{}.json", id))
    }

    fn meta_path(&self, id: GoalId) -> PathBuf {
        self.root.join("meta").join("goals").join(format!("{}.meta.json", id))
    }

    /// Read and increment the per-goal version, return the new version.
    async fn bump_version(&self, id: GoalId) -> Result<u64> {
        let path = self.meta_path(id);
        let mut version = 0u64;
        if let Ok(s) = fs::read_to_string(&path).await {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&s) {
                if let Some(v) = json.get("version").and_then(|v| v.as_u64()) {
                    version = v;
                }
            }
        }
        version += 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        write_atomic(&path, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_goal(&self, goal: Goal) -> Result<Goal> {
        let json = serde_json::to_string_pretty(&goal)?;

        // The document rename is the commit point; nothing may fail after it.
        let version = self.bump_version(goal.id).await?;
        write_atomic(&self.goal_path(goal.id), json.as_bytes()).await?;
        debug!(goal_id = %goal.id, version, "Saved goal document");
        Ok(goal)
    }

    async fn load_goal(&self, id: GoalId) -> Result<Option<Goal>> {
        read_json(&self.goal_path(id)).await
    }

    async fn list_goals(&self, filter: &GoalFilter) -> Result<Vec<Goal>> {
        let mut goals: Vec<Goal> = list_dir(&self.root.join("goals")).await?;
        goals.retain(|g| filter.matches(g));
        goals.sort_by_key(|g| g.id);
        Ok(goals)
    }
}

/// Write to a sibling temp file, then rename over the target so readers never
/// observe a partially written document.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        // A file removed between read_dir and read is skipped.
        if let Some(item) = read_json(&entry.path()).await? {
            items.push(item);
        }
    }
    Ok(items)
}
