//! Multimodal request and fused query types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One multimodal submission: raw video plus optional text.
#[derive(Debug, Clone, Default)]
pub struct MediaRequest {
    /// Opaque video container bytes as uploaded.
    pub video_bytes: Vec<u8>,
    /// Free text from the user; may be empty.
    pub user_text: String,
}

impl MediaRequest {
    pub fn new(video_bytes: impl Into<Vec<u8>>, user_text: impl Into<String>) -> Self {
        Self {
            video_bytes: video_bytes.into(),
            user_text: user_text.into(),
        }
    }

    pub fn has_text(&self) -> bool {
        !self.user_text.is_empty()
    }
}

/// Query text combining both emotion signals and the user text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FusedQuery {
    text: String,
}

impl FusedQuery {
    /// Wrap composed query text. Callers guarantee non-empty input.
    pub fn new(text: String) -> Self {
        debug_assert!(!text.is_empty(), "fused query must not be empty");
        Self { text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for FusedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for FusedQuery {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
