//! Deterministic text backend for tests and offline runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{GenerationError, TextGenerator};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum StubReply {
    /// Return this text
    Text(String),
    /// Fail with this error
    Fail(GenerationError),
}

/// Text backend that replays scripted replies.
///
/// Replies are consumed in order; the last one repeats once the script runs out.
pub struct StaticTextGenerator {
    replies: Mutex<VecDeque<StubReply>>,
    last: StubReply,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticTextGenerator {
    /// Always answer with `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self::sequence(vec![StubReply::Text(text.into())])
    }

    /// Always fail with `error`.
    pub fn failing(error: GenerationError) -> Self {
        Self::sequence(vec![StubReply::Fail(error)])
    }

    /// Replay `replies` in order.
    pub fn sequence(replies: Vec<StubReply>) -> Self {
        let last = replies
            .last()
            .cloned()
            .unwrap_or(StubReply::Fail(GenerationError::EmptyResponse));
        Self {
            replies: Mutex::new(replies.into()),
            last,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of prompts received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> StubReply {
        let mut replies = match self.replies.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        replies.pop_front().unwrap_or_else(|| self.last.clone())
    }
}

#[async_trait]
impl TextGenerator for StaticTextGenerator {
    async fn generate_text(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.next_reply() {
            StubReply::Text(text) => Ok(text),
            StubReply::Fail(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_then_repeats_last() {
        let stub = StaticTextGenerator::sequence(vec![
            StubReply::Fail(GenerationError::EmptyResponse),
            StubReply::Text("ok".to_string()),
        ]);
        assert!(stub.generate_text("p").await.is_err());
        assert_eq!(stub.generate_text("p").await.unwrap(), "ok");
        assert_eq!(stub.generate_text("p").await.unwrap(), "ok");
        assert_eq!(stub.calls(), 3);
    }
}
