//! Prompt templates sent to the generator.

use crate::synthesizer::{Role, Turn};
use serde_json::Value;
use std::fmt::Write;

/// Annual-report question prompt with the three-section answer layout
#[must_use]
pub fn report_prompt(context: &str, question: &str) -> String {
    format!(
        "Based on the following context from an annual report, please answer the question.
Structure your response in the following format:

1. Key Findings:
- Main point 1
- Main point 2
- Main point 3

2. Detailed Analysis:
[Provide a detailed analysis broken down into clear paragraphs]

3. Summary:
[A brief conclusion of the findings]

Context:
{context}

Question:
{question}

Remember to:
- Use clear, concise language
- Break down complex information into digestible points
- Provide specific examples or data when available
- Maintain a professional tone
"
    )
}

/// Conversational prompt over flattened context and the prior transcript
#[must_use]
pub fn chat_prompt(context: &str, transcript: &[Turn], question: &str) -> String {
    let mut history = String::new();
    for turn in transcript {
        let speaker = match turn.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        let _ = writeln!(history, "{speaker}: {}", turn.text);
    }
    if history.is_empty() {
        history.push_str("(none)\n");
    }

    format!(
        "Based on the following context, please answer the question.
Provide a clear, concise, and informative response.
When mentioning dollar amounts, use USD or dollars instead of $ symbol.

Context:
{context}

Conversation so far:
{history}
Question:
{question}

Remember to:
- Use specific data and examples from the context when relevant
- Maintain a professional tone
- Focus on accuracy and clarity
- Format currency as 'USD' or 'dollars' instead of '$'
"
    )
}

/// Metrics-review prompt
#[must_use]
pub fn metrics_prompt(metrics: &str, metric_type: &str) -> String {
    format!(
        "Analyze these {metric_type} financial metrics:
{metrics}

Provide:
1. Key trends
2. Notable patterns
3. Potential risks/opportunities
4. Recommendations
"
    )
}

/// Renders structured context as prompt text.
///
/// Objects become one `"\n{key}:\n{value}\n"` block per entry; string values
/// are written bare, everything else as compact JSON. Non-objects render as
/// their string form.
#[must_use]
pub fn flatten_context(context: &Value) -> String {
    match context {
        Value::Object(map) => {
            let mut out = String::new();
            for (key, value) in map {
                let _ = write!(out, "\n{key}:\n{}\n", scalar_text(value));
            }
            out
        }
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
