//! Shared data models for the Astro backend.
//!
//! This crate provides Serde-serializable types for:
//! - Closed emotion label sets for the facial and speech classifiers
//! - Emotion signals produced by the extraction branches
//! - Multimodal requests and fused queries
//! - Decoded frames and audio buffers
//! - Conversation turns and the bounded chat history
//! - Knowledge chunks used by the retrieval index

pub mod conversation;
pub mod emotion;
pub mod knowledge;
pub mod media;
pub mod request;
pub mod signal;

// Re-export common types
pub use conversation::{ChatHistory, ConversationTurn, Role, MAX_HISTORY_TURNS, NO_HISTORY_PLACEHOLDER};
pub use emotion::{EmotionLabel, FacialEmotion, Sentinel, SpeechEmotion};
pub use knowledge::KnowledgeChunk;
pub use media::{AudioBuffer, EncodedFrame};
pub use request::{FusedQuery, MediaRequest};
pub use signal::{EmotionSignal, SignalSource, SignalStatus};
