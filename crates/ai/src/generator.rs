//! Plan generation service.
//!
//! A [`PlanGenerator`] turns a user's starting point and target into an
//! ordered day-by-day plan. [`ModelPlanGenerator`] does this by prompting a
//! [`TextGenerator`], bounding every attempt with a timeout, retrying
//! transient failures with exponential backoff and validating the result
//! before handing it back.

use std::time::Duration;

use async_trait::async_trait;
use habitual_core::DailyTask;
use tracing::{debug, info, warn};

use crate::parser::parse_plan;
use crate::prompt::build_plan_prompt;

/// Errors from plan generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The request itself is unusable and was not sent
    #[error("invalid generation request: {0}")]
    InvalidRequest(String),

    /// No generator backend is configured
    #[error("plan generator is not configured: {0}")]
    NotConfigured(String),

    /// Network or client failure talking to the backend
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("generator returned status {status}: {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Attempt did not finish in time
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    /// Backend returned no text at all
    #[error("generator returned an empty response")]
    EmptyResponse,

    /// Response text is not a JSON plan of the expected shape
    #[error("malformed plan: {0}")]
    Malformed(String),

    /// Plan parsed but its days do not cover the requested timeframe
    #[error("plan does not match timeframe: {0}")]
    DaySequence(String),
}

impl GenerationError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::Transport(_)
                | GenerationError::Upstream { .. }
                | GenerationError::Timeout(_)
        )
    }
}

/// Produces a validated day-by-day plan.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Generate exactly `timeframe_days` tasks numbered `1..=timeframe_days`.
    async fn generate(
        &self,
        current_condition: &str,
        goal: &str,
        timeframe_days: u32,
    ) -> Result<Vec<DailyTask>, GenerationError>;
}

/// Raw prompt-in, text-out backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one prompt and return the model's text.
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Timeout and retry settings for plan generation.
#[derive(Debug, Clone)]
pub struct GenerationPolicy {
    /// Upper bound for a single attempt
    pub timeout: Duration,

    /// Total attempts, at least 1
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles after each retry
    pub retry_backoff: Duration,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_attempts: 1,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Plan generator backed by a text model.
pub struct ModelPlanGenerator<T: TextGenerator> {
    backend: T,
    policy: GenerationPolicy,
}

impl<T: TextGenerator> ModelPlanGenerator<T> {
    /// Create a generator with the default policy.
    pub fn new(backend: T) -> Self {
        Self {
            backend,
            policy: GenerationPolicy::default(),
        }
    }

    /// Set timeout and retry policy.
    pub fn with_policy(mut self, policy: GenerationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Access the backend.
    pub fn backend(&self) -> &T {
        &self.backend
    }

    async fn attempt(&self, prompt: &str) -> Result<String, GenerationError> {
        match tokio::time::timeout(self.policy.timeout, self.backend.generate_text(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.policy.timeout)),
        }
    }
}

#[async_trait]
impl<T: TextGenerator> PlanGenerator for ModelPlanGenerator<T> {
    async fn generate(
        &self,
        current_condition: &str,
        goal: &str,
        timeframe_days: u32,
    ) -> Result<Vec<DailyTask>, GenerationError> {
        if timeframe_days == 0 {
            return Err(GenerationError::InvalidRequest(
                "timeframe must be a positive number of days".to_string(),
            ));
        }

        let prompt = build_plan_prompt(current_condition, goal, timeframe_days);
        let max_attempts = self.policy.max_attempts.max(1);
        let mut backoff = self.policy.retry_backoff;
        let mut attempt = 1;

        let text = loop {
            debug!(attempt, timeframe_days, "Requesting plan");
            match self.attempt(&prompt).await {
                Ok(text) => break text,
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(attempt, error = %e, "Plan generation failed, retrying in {:?}", backoff);
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let tasks = parse_plan(&text, timeframe_days)?;
        info!(days = tasks.len(), attempt, "Generated plan");
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{StaticTextGenerator, StubReply};

    fn plan_json(days: u32) -> String {
        let items: Vec<_> = (1..=days)
            .map(|d| {
                serde_json::json!({
                    "day": d,
                    "goal": format!("Walk {} minutes", d * 5),
                    "explanation": "Build up slowly",
                    "difficulty": "easy",
                })
            })
            .collect();
        serde_json::to_string(&items).unwrap()
    }

    fn quick_policy(max_attempts: u32) -> GenerationPolicy {
        GenerationPolicy {
            timeout: Duration::from_secs(5),
            max_attempts,
            retry_backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_generate_valid_plan() {
        let generator = ModelPlanGenerator::new(StaticTextGenerator::new(plan_json(3)));
        let tasks = generator.generate("sedentary", "walk daily", 3).await.unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[2].day, 3);
        assert!(tasks.iter().all(|t| !t.completed));
    }

    #[tokio::test]
    async fn test_zero_timeframe_never_reaches_backend() {
        let generator = ModelPlanGenerator::new(StaticTextGenerator::new(plan_json(1)));
        let err = generator.generate("a", "b", 0).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRequest(_)));
        assert_eq!(generator.backend().calls(), 0);
    }

    #[tokio::test]
    async fn test_short_plan_is_rejected() {
        let generator = ModelPlanGenerator::new(StaticTextGenerator::new(plan_json(4)));
        let err = generator.generate("a", "b", 5).await.unwrap_err();
        assert!(matches!(err, GenerationError::DaySequence(_)));
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let backend = StaticTextGenerator::sequence(vec![
            StubReply::Fail(GenerationError::Upstream {
                status: 503,
                body: "overloaded".to_string(),
            }),
            StubReply::Text(plan_json(2)),
        ]);
        let generator = ModelPlanGenerator::new(backend).with_policy(quick_policy(3));

        let tasks = generator.generate("a", "b", 2).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(generator.backend().calls(), 2);
    }

    #[tokio::test]
    async fn test_single_attempt_by_default() {
        let backend = StaticTextGenerator::sequence(vec![
            StubReply::Fail(GenerationError::Transport("connection reset".to_string())),
            StubReply::Text(plan_json(2)),
        ]);
        let generator = ModelPlanGenerator::new(backend);

        let err = generator.generate("a", "b", 2).await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
        assert_eq!(generator.backend().calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_plan_is_not_retried() {
        let backend = StaticTextGenerator::sequence(vec![
            StubReply::Text("Sure! Here is your plan.".to_string()),
            StubReply::Text(plan_json(2)),
        ]);
        let generator = ModelPlanGenerator::new(backend).with_policy(quick_policy(3));

        let err = generator.generate("a", "b", 2).await.unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
        assert_eq!(generator.backend().calls(), 1);
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let backend = StaticTextGenerator::new(plan_json(1)).with_delay(Duration::from_millis(500));
        let generator = ModelPlanGenerator::new(backend).with_policy(GenerationPolicy {
            timeout: Duration::from_millis(20),
            max_attempts: 1,
            retry_backoff: Duration::from_millis(1),
        });

        let err = generator.generate("a", "b", 1).await.unwrap_err();
        assert_eq!(err, GenerationError::Timeout(Duration::from_millis(20)));
    }
}
