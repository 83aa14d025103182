//! Keyword-driven reply generation
//!
//! A static, ordered rule table with a random acknowledgement fallback. Generation is
//! synchronous and cannot fail.

pub mod rules;

use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

pub use rules::{Reply, Rule, FALLBACK_TEMPLATES, RULES};

/// chrono format matching the en-US `toLocaleTimeString` rendering
pub const DEFAULT_TIME_FORMAT: &str = "%-I:%M:%S %p";

type Clock = Box<dyn Fn() -> DateTime<Local> + Send>;

/// Reply generator with injectable randomness and clock
pub struct ResponseGenerator<R = StdRng> {
    rng: R,
    clock: Clock,
    time_format: String,
}

impl ResponseGenerator<StdRng> {
    /// Generator seeded from OS entropy, reading the local clock
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for ResponseGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ResponseGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            clock: Box::new(Local::now),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }

    /// Replace the wall clock used by the time rule
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Local> + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Set the chrono format string used by the time rule
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// Produce the reply for `utterance`
    pub fn generate(&mut self, utterance: &str) -> String {
        let normalized = utterance.to_lowercase();

        if let Some(rule) = rules::first_match(&normalized) {
            debug!("Reply rule matched: {}", rule.name);
            return match rule.reply {
                Reply::Fixed(text) => text.to_string(),
                Reply::CurrentTime => {
                    let now = (self.clock)();
                    rules::time_reply(&now.format(&self.time_format).to_string())
                }
            };
        }

        let template = FALLBACK_TEMPLATES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(FALLBACK_TEMPLATES[0]);
        debug!("No reply rule matched, using fallback");
        rules::fallback_reply(template, utterance)
    }
}

/// One-shot generation with fresh randomness and the local clock
pub fn generate(utterance: &str) -> String {
    ResponseGenerator::with_rng(rand::thread_rng()).generate(utterance)
}
