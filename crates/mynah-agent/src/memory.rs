// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded per-conversation memory feeding prompt context.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mynah_core::SenderId;
use tracing::debug;

/// One recorded (input, output) exchange. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub input: String,
    pub output: String,
    pub created_at: DateTime<Utc>,
}

/// Bounded FIFO log of conversation turns per conversation key.
///
/// Group conversations share one log keyed by the group identity; speakers
/// within a group are not distinguished. Insertion order is recency order,
/// and the oldest turns are evicted once a log exceeds the cap.
pub struct ConversationMemory {
    logs: HashMap<SenderId, Vec<ConversationTurn>>,
    max_turns: usize,
    context_turns: usize,
}

impl ConversationMemory {
    pub fn new(max_turns: usize, context_turns: usize) -> Self {
        Self {
            logs: HashMap::new(),
            max_turns,
            context_turns,
        }
    }

    /// Turns recorded for a key, oldest first. Empty for unknown keys.
    pub fn get(&self, key: &SenderId) -> &[ConversationTurn] {
        self.logs.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self, key: &SenderId) -> usize {
        self.logs.get(key).map_or(0, Vec::len)
    }

    /// Appends a turn with the current timestamp, then evicts the oldest
    /// entries beyond the cap.
    pub fn append(&mut self, key: &SenderId, input: &str, output: &str) {
        let log = self.logs.entry(key.clone()).or_default();
        log.push(ConversationTurn {
            input: input.to_string(),
            output: output.to_string(),
            created_at: Utc::now(),
        });
        if log.len() > self.max_turns {
            let excess = log.len() - self.max_turns;
            log.drain(..excess);
        }
    }

    /// Drops the whole log for a key. Subsequent `get` returns empty.
    pub fn clear(&mut self, key: &SenderId) {
        if self.logs.remove(key).is_some() {
            debug!(key = %key, "cleared conversation memory");
        }
    }

    /// Renders the most recent turns into a prompt context block, or an
    /// empty string when there is no history.
    pub fn render_context(&self, key: &SenderId) -> String {
        let log = self.get(key);
        if log.is_empty() {
            return String::new();
        }
        let mut context = String::from("\n\nPrevious conversation context:\n");
        let start = log.len().saturating_sub(self.context_turns);
        for turn in &log[start..] {
            context.push_str(&format!("User: {}\nAI: {}\n", turn.input, turn.output));
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> ConversationMemory {
        ConversationMemory::new(10, 5)
    }

    #[test]
    fn get_on_unknown_key_is_empty() {
        let memory = memory();
        assert!(memory.get(&SenderId::from("94771234567@c.us")).is_empty());
    }

    #[test]
    fn cap_keeps_the_ten_most_recent_turns_in_order() {
        let mut memory = memory();
        let key = SenderId::from("94771234567@c.us");

        for i in 0..15 {
            memory.append(&key, &format!("in-{i}"), &format!("out-{i}"));
        }

        let log = memory.get(&key);
        assert_eq!(log.len(), 10);
        assert_eq!(log[0].input, "in-5");
        assert_eq!(log[9].input, "in-14");
        for (offset, turn) in log.iter().enumerate() {
            assert_eq!(turn.input, format!("in-{}", offset + 5));
            assert_eq!(turn.output, format!("out-{}", offset + 5));
        }
    }

    #[test]
    fn clear_removes_the_log() {
        let mut memory = memory();
        let key = SenderId::from("94771234567@c.us");

        memory.append(&key, "hello", "hi there");
        assert_eq!(memory.len(&key), 1);

        memory.clear(&key);
        assert!(memory.get(&key).is_empty());
        assert_eq!(memory.render_context(&key), "");
    }

    #[test]
    fn render_context_is_empty_without_history() {
        let memory = memory();
        assert_eq!(memory.render_context(&SenderId::from("94771234567@c.us")), "");
    }

    #[test]
    fn render_context_formats_the_last_five_turns() {
        let mut memory = memory();
        let key = SenderId::from("94771234567@c.us");

        for i in 0..7 {
            memory.append(&key, &format!("q{i}"), &format!("a{i}"));
        }

        let context = memory.render_context(&key);
        assert!(context.starts_with("\n\nPrevious conversation context:\n"));
        assert!(!context.contains("User: q1\n"));
        assert!(context.contains("User: q2\nAI: a2\n"));
        assert!(context.ends_with("User: q6\nAI: a6\n"));
    }

    #[test]
    fn logs_are_independent_per_key() {
        let mut memory = memory();
        let a = SenderId::from("94771111111@c.us");
        let b = SenderId::from("120363040000000001@g.us");

        memory.append(&a, "hello", "hi");
        memory.append(&b, "ping", "pong");

        memory.clear(&a);
        assert_eq!(memory.len(&a), 0);
        assert_eq!(memory.len(&b), 1);
    }
}
