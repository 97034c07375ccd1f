//! Conversation turns and the rolling chat history.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Maximum turns kept in history (5 user/assistant exchanges).
pub const MAX_HISTORY_TURNS: usize = 10;

/// Transcript used when no turns have been recorded yet.
pub const NO_HISTORY_PLACEHOLDER: &str = "No previous conversation history.";

/// Speaker of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Bounded, insertion-ordered conversation history.
///
/// Turns are only ever appended as a user/assistant pair. Once the cap is
/// exceeded the oldest turns are evicted first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistory {
    turns: VecDeque<ConversationTurn>,
    cap: usize,
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatHistory {
    /// History with the default cap.
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_TURNS)
    }

    /// History with a custom cap (at least one exchange).
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.max(2);
        Self {
            turns: VecDeque::with_capacity(cap + 2),
            cap,
        }
    }

    /// Record one exchange, evicting the oldest turns beyond the cap.
    pub fn push_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.turns.push_back(ConversationTurn::user(user));
        self.turns.push_back(ConversationTurn::assistant(assistant));
        while self.turns.len() > self.cap {
            self.turns.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    /// Oldest turn still retained.
    pub fn oldest(&self) -> Option<&ConversationTurn> {
        self.turns.front()
    }

    /// Flatten the history into a prompt transcript.
    pub fn render_transcript(&self) -> String {
        if self.turns.is_empty() {
            return NO_HISTORY_PLACEHOLDER.to_string();
        }

        let mut transcript = String::new();
        for turn in &self.turns {
            match turn.role {
                Role::User => {
                    transcript.push_str("User: ");
                    transcript.push_str(&turn.content);
                    transcript.push('\n');
                }
                Role::Assistant => {
                    transcript.push_str("Assistant: ");
                    transcript.push_str(&turn.content);
                    transcript.push_str("\n\n");
                }
            }
        }
        transcript.trim().to_string()
    }
}
