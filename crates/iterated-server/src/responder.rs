//! Reply generation for the chat endpoint.
//!
//! [`Responder`] is where a real tutoring backend plugs in. The only
//! implementation today is [`CannedResponder`], which waits a fixed delay and
//! picks one of a static list of replies through an injected
//! [`ReplyStrategy`].

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use iterated_config::{ReplyStrategyKind, DEFAULT_REPLIES};
use iterated_core::ChatRequest;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ServerError;

#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, request: &ChatRequest) -> Result<String, ServerError>;
}

/// Chooses which of `len` candidate replies to send
pub trait ReplyStrategy: Send + Sync + fmt::Debug {
    /// Index in `0..len`, or `None` when `len` is zero
    fn pick(&self, len: usize) -> Option<usize>;
}

/// Uniform choice from an owned generator
#[derive(Debug)]
pub struct UniformRandom {
    rng: Mutex<StdRng>,
}

impl UniformRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ReplyStrategy for UniformRandom {
    fn pick(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.rng.lock().gen_range(0..len))
    }
}

/// Round-robin through the replies
#[derive(Debug, Default)]
pub struct Sequential {
    next: AtomicUsize,
}

impl Sequential {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplyStrategy for Sequential {
    fn pick(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.next.fetch_add(1, Ordering::Relaxed) % len)
    }
}

/// Build the strategy named in the config
pub fn strategy_for(kind: ReplyStrategyKind, seed: Option<u64>) -> Box<dyn ReplyStrategy> {
    match (kind, seed) {
        (ReplyStrategyKind::Random, Some(seed)) => Box::new(UniformRandom::seeded(seed)),
        (ReplyStrategyKind::Random, None) => Box::new(UniformRandom::from_entropy()),
        (ReplyStrategyKind::Sequential, _) => Box::new(Sequential::new()),
    }
}

/// Placeholder tutor: ignores the question and answer and returns a canned
/// reply after a simulated processing delay.
#[derive(Debug)]
pub struct CannedResponder {
    replies: Vec<String>,
    delay: Duration,
    strategy: Box<dyn ReplyStrategy>,
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new(DEFAULT_REPLIES.iter().map(|s| s.to_string()).collect())
    }
}

impl CannedResponder {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies,
            delay: Duration::from_secs(1),
            strategy: Box::new(UniformRandom::from_entropy()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_strategy(mut self, strategy: Box<dyn ReplyStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn replies(&self) -> &[String] {
        &self.replies
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Responder for CannedResponder {
    async fn respond(&self, request: &ChatRequest) -> Result<String, ServerError> {
        tracing::debug!(
            message_len = request.message.len(),
            delay_ms = self.delay.as_millis() as u64,
            "simulating tutor processing"
        );
        tokio::time::sleep(self.delay).await;

        self.strategy
            .pick(self.replies.len())
            .and_then(|idx| self.replies.get(idx))
            .cloned()
            .ok_or(ServerError::NoReplies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picks(strategy: &dyn ReplyStrategy, len: usize, n: usize) -> Vec<usize> {
        (0..n).filter_map(|_| strategy.pick(len)).collect()
    }

    #[test]
    fn test_seeded_random_is_deterministic() {
        let a = UniformRandom::seeded(42);
        let b = UniformRandom::seeded(42);

        let first = picks(&a, 5, 32);
        assert_eq!(first, picks(&b, 5, 32));
        assert!(first.iter().all(|&i| i < 5));
    }

    #[test]
    fn test_random_covers_every_reply() {
        let strategy = UniformRandom::seeded(7);
        let mut seen = [false; 5];
        for idx in picks(&strategy, 5, 500) {
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_sequential_wraps() {
        let strategy = Sequential::new();
        assert_eq!(picks(&strategy, 3, 7), vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_empty_list_picks_nothing() {
        assert_eq!(UniformRandom::seeded(1).pick(0), None);
        assert_eq!(Sequential::new().pick(0), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_canned_responder_waits_then_replies() {
        let responder = CannedResponder::default().with_strategy(Box::new(Sequential::new()));
        let started = tokio::time::Instant::now();

        let reply = responder.respond(&ChatRequest::new("2+2?")).await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(reply, DEFAULT_REPLIES[0]);
    }

    #[tokio::test]
    async fn test_canned_responder_ignores_question() {
        let responder = CannedResponder::default()
            .with_delay(Duration::ZERO)
            .with_strategy(Box::new(Sequential::new()));

        let plain = responder.respond(&ChatRequest::new("hi")).await.unwrap();
        let with_problem = responder
            .respond(&ChatRequest::new("hi").with_problem("Prove it", "QED"))
            .await
            .unwrap();

        assert_eq!(plain, DEFAULT_REPLIES[0]);
        assert_eq!(with_problem, DEFAULT_REPLIES[1]);
    }

    #[tokio::test]
    async fn test_no_replies_is_an_error() {
        let responder = CannedResponder::new(Vec::new()).with_delay(Duration::ZERO);
        let result = responder.respond(&ChatRequest::new("hi")).await;
        assert!(matches!(result, Err(ServerError::NoReplies)));
    }
}
