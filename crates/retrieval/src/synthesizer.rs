use crate::error::Result;
use crate::generator::Generator;
use crate::prompt::{chat_prompt, flatten_context, metrics_prompt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Conversational question answering over structured context.
///
/// The transcript grows by one user and one assistant turn per successful
/// `ask` and is never truncated.
pub struct AnswerSynthesizer {
    generator: Arc<dyn Generator>,
    transcript: Vec<Turn>,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            transcript: Vec::new(),
        }
    }

    pub async fn ask<C: Serialize + ?Sized>(
        &mut self,
        context: &C,
        question: &str,
    ) -> Result<String> {
        let context = flatten_context(&serde_json::to_value(context)?);
        let prompt = chat_prompt(&context, &self.transcript, question);
        let reply = self.generator.complete(&prompt).await?;

        self.transcript.push(Turn::new(Role::User, question));
        self.transcript.push(Turn::new(Role::Assistant, reply.clone()));
        log::debug!("Transcript now holds {} turns", self.transcript.len());
        Ok(reply)
    }

    #[must_use]
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
    }
}

/// Ask the generator for a trends/risks review of `metrics`
pub async fn analyze_metrics<M: Serialize + ?Sized>(
    generator: &dyn Generator,
    metrics: &M,
    metric_type: &str,
) -> Result<String> {
    let rendered = serde_json::to_string_pretty(metrics)?;
    generator
        .complete(&metrics_prompt(&rendered, metric_type))
        .await
}
