//! Prompt assembly for the retrieval engine.

const PROMPT_TEMPLATE: &str = "
[SYSTEM PROTOCOL: MULTIMODAL RAG ASSISTANT]
[TASK: Generate a helpful, professional response based on provided CONTEXT and CHAT HISTORY.
If input contains emotions, acknowledge them appropriately.]

[CONVERSATION HISTORY]
{chat_history}

[CURRENT INPUT DATA]
Retrieved Context: {context}
User Input: {question}

[BEGIN RESPONSE]
";

/// Render the full prompt. Placeholders are filled in one pass so text in
/// one slot is never re-interpreted as another placeholder.
pub fn render_prompt(chat_history: &str, context: &str, question: &str) -> String {
    let mut out = String::with_capacity(
        PROMPT_TEMPLATE.len() + chat_history.len() + context.len() + question.len(),
    );
    let mut rest = PROMPT_TEMPLATE;

    for (placeholder, value) in [
        ("{chat_history}", chat_history),
        ("{context}", context),
        ("{question}", question),
    ] {
        if let Some(pos) = rest.find(placeholder) {
            out.push_str(&rest[..pos]);
            out.push_str(value);
            rest = &rest[pos + placeholder.len()..];
        }
    }
    out.push_str(rest);
    out
}

/// Join retrieved chunk texts in rank order.
pub fn format_context<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    texts.into_iter().collect::<Vec<_>>().join("\n\n")
}
