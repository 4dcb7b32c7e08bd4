//! Bot classification
//!
//! Wraps the external user-agent signature heuristic behind a small trait so
//! handlers and tests can substitute their own classifier. Classification
//! never fails; an absent user-agent header is treated as an empty string
//! (and classified as human).

/// Capability interface for classifying a request as bot or human.
pub trait BotDetector: Send + Sync {
    fn is_bot(&self, user_agent: &str) -> bool;
}

/// Production classifier delegating to the `isbot` signature database.
pub struct SignatureBotDetector {
    bots: isbot::Bots,
}

impl SignatureBotDetector {
    pub fn new() -> Self {
        Self {
            bots: isbot::Bots::default(),
        }
    }
}

impl Default for SignatureBotDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl BotDetector for SignatureBotDetector {
    fn is_bot(&self, user_agent: &str) -> bool {
        self.bots.is_bot(user_agent)
    }
}
