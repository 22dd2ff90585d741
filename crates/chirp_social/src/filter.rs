//! Deciding which mentions get a reply.

use crate::InboundMessage;
use chirp_error::ConfigError;
use regex::Regex;
use tracing::{debug, info};

/// Outcome of inspecting one mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MentionVerdict {
    /// Written by the agent itself.
    OwnMessage,
    /// A retweet of one of the agent's posts.
    Retweet,
    /// No signal found in the text.
    NoSignal,
    /// Deserves a reply.
    Reply,
}

/// Matches mentions against the agent's handle and reply signals.
#[derive(Debug, Clone)]
pub struct MentionFilter {
    handle: String,
    signals: Vec<String>,
    pattern: Option<Regex>,
}

impl MentionFilter {
    /// Create a filter for `handle` (with or without a leading `@`).
    pub fn new(handle: impl AsRef<str>, signals: Vec<String>) -> Self {
        Self {
            handle: handle.as_ref().trim_start_matches('@').to_string(),
            signals,
            pattern: None,
        }
    }

    /// Also reply when the text matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the pattern does not compile.
    #[track_caller]
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern)
            .map_err(|e| {
            ConfigError::invalid("signal_pattern", format!("not a usable signal pattern: {}", e))
        })?;
        self.pattern = Some(regex);
        Ok(self)
    }

    /// The agent's handle, without `@`.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Classify a mention.
    pub fn verdict(&self, message: &InboundMessage) -> MentionVerdict {
        let author = message.author().trim_start_matches('@');
        if author.eq_ignore_ascii_case(&self.handle) {
            return MentionVerdict::OwnMessage;
        }

        let retweet_prefix = format!("rt @{}: ", self.handle.to_lowercase());
        if message.text().to_lowercase().starts_with(&retweet_prefix) {
            return MentionVerdict::Retweet;
        }

        let text = message.text();
        let signalled = self.signals.iter().any(|s| text.contains(s.as_str()))
            || self.pattern.as_ref().is_some_and(|p| p.is_match(text));
        if signalled {
            MentionVerdict::Reply
        } else {
            MentionVerdict::NoSignal
        }
    }

    /// Whether to reply, logging the decision.
    pub fn should_reply(&self, message: &InboundMessage) -> bool {
        let verdict = self.verdict(message);
        match verdict {
            MentionVerdict::Reply => {
                info!(author = %message.author(), text = %message.text(), "Heard a mention, replying");
                true
            }
            other => {
                debug!(author = %message.author(), verdict = %other, "Heard a mention, ignoring");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(author: &str, text: &str) -> InboundMessage {
        InboundMessage::new("1", author, text)
    }

    #[test]
    fn test_handle_normalized() {
        let filter = MentionFilter::new("@CatBot", vec![]);
        assert_eq!(filter.handle(), "CatBot");
    }

    #[test]
    fn test_bad_pattern_rejected() {
        assert!(MentionFilter::new("catbot", vec![]).with_pattern("(").is_err());
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(MentionVerdict::NoSignal.to_string(), "no_signal");
        let filter = MentionFilter::new("catbot", vec!["meow".into()]);
        assert_eq!(
            filter.verdict(&mention("someone", "meow @catbot")),
            MentionVerdict::Reply
        );
    }
}
