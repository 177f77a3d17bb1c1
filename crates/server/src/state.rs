//! Shared services behind the HTTP handlers.

use std::sync::Arc;

use chrono::FixedOffset;
use habitual_ai::{GeminiClient, ModelPlanGenerator, PlanGenerator};
use habitual_progress::{BasicProgressTracker, ProgressTracker, ResolutionEngine};
use habitual_storage::{JsonStorage, MemoryStorage, Storage};
use habitual_work::{CompletionTracker, GoalLocks, GoalManager};
use tracing::{info, warn};

use crate::config::{ServerConfig, StorageBackend};

/// Services shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// Goal creation and status changes
    pub goals: Arc<GoalManager>,

    /// Task completion toggles
    pub completion: Arc<CompletionTracker>,

    /// Today's task lookup
    pub resolver: Arc<ResolutionEngine>,

    /// Completion and streak reporting
    pub progress: Arc<dyn ProgressTracker>,
}

impl AppState {
    /// Wire the services around one store and one generator.
    pub fn new(
        storage: Arc<dyn Storage>,
        generator: Arc<dyn PlanGenerator>,
        offset: FixedOffset,
    ) -> Self {
        let locks = Arc::new(GoalLocks::new());
        Self {
            goals: Arc::new(GoalManager::new(
                storage.clone(),
                generator,
                locks.clone(),
                offset,
            )),
            completion: Arc::new(CompletionTracker::new(storage.clone(), locks)),
            resolver: Arc::new(ResolutionEngine::new(storage.clone(), offset)),
            progress: Arc::new(BasicProgressTracker::new(storage, offset)),
        }
    }

    /// Open the configured store and generator backend.
    pub async fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let storage: Arc<dyn Storage> = match &config.storage {
            StorageBackend::Json(root) => {
                info!(root = %root.display(), "Using JSON goal store");
                Arc::new(JsonStorage::new(root).await?)
            }
            StorageBackend::Memory => {
                warn!("Using in-memory goal store; goals are lost on exit");
                Arc::new(MemoryStorage::new())
            }
        };

        let client = GeminiClient::new(config.gemini.clone());
        if !client.is_configured() {
            warn!("GEMINI_API_KEY is not set; plan generation requests will fail");
        }
        let generator =
            Arc::new(ModelPlanGenerator::new(client).with_policy(config.generation.clone()));

        Ok(Self::new(storage, generator, config.utc_offset))
    }
}
