//! Query fusion: both emotion labels plus the user's text in one prompt.

use astro_models::{EmotionSignal, FusedQuery};

/// Substituted when the user sent no text.
pub const NO_TEXT_PLACEHOLDER: &str = "No text message provided.";

/// Build the query handed to the conversation engine. Pure and total.
pub fn fuse(speech: &EmotionSignal, facial: &EmotionSignal, user_text: &str) -> FusedQuery {
    let message = if user_text.is_empty() {
        NO_TEXT_PLACEHOLDER
    } else {
        user_text
    };

    FusedQuery::new(format!(
        "Please act as a supportive assistant. Based on the user's input and emotional context, \
         provide a helpful and empathetic response.\n\n\
         --- Emotional Context ---\n\
         Detected Speech Tone: {}\n\
         Detected Facial Expression: {}\n\n\
         --- User's Message ---\n\
         '{}'",
        speech.label(),
        facial.label(),
        message
    ))
}
