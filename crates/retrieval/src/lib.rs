//! # Report Retrieval
//!
//! Question answering over a single ingested document.
//!
//! ## Pipeline
//!
//! ```text
//! document text
//!     │
//!     ├──> Chunker (500-word windows, 50-word overlap)
//!     │
//!     ├──> VectorIndex (embed + append, all-or-nothing)
//!     │
//! question
//!     │
//!     ├──> VectorIndex::search (top-k by squared L2)
//!     │
//!     ├──> report prompt (question + ranked context)
//!     │
//!     └──> Generator ──> StructuredAnswer
//!                        ├─ key findings
//!                        ├─ detailed analysis
//!                        └─ summary
//! ```
//!
//! [`AnswerSynthesizer`] covers the conversational side: it keeps a transcript and
//! asks follow-up questions over arbitrary structured context.
//!
//! ## Example
//!
//! ```no_run
//! use report_retrieval::{ChatCompletionsGenerator, RetrievalConfig, RetrievalEngine};
//! use report_vector_store::HashEmbedder;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut engine = RetrievalEngine::new(
//!         RetrievalConfig::default(),
//!         Arc::new(HashEmbedder::new(384)),
//!         Arc::new(ChatCompletionsGenerator::from_env()?),
//!     )?;
//!
//!     engine.ingest(&std::fs::read_to_string("annual_report.txt")?).await?;
//!     let answer = engine.answer("How did operating margin develop?").await?;
//!     println!("{}", answer.summary);
//!     Ok(())
//! }
//! ```

mod answer;
mod config;
mod engine;
mod error;
mod generator;
mod prompt;
mod sections;
mod synthesizer;

pub use answer::{
    StructuredAnswer, DETAILED_ANALYSIS_MARKER, KEY_FINDINGS_MARKER, SUMMARY_MARKER,
};
pub use config::{RetrievalConfig, DEFAULT_TOP_K};
pub use engine::RetrievalEngine;
pub use error::{Result, RetrievalError};
pub use generator::{ChatCompletionsConfig, ChatCompletionsGenerator, Generator};
pub use prompt::{chat_prompt, flatten_context, metrics_prompt, report_prompt};
pub use sections::{field_title, section_question, FieldAnswer, SectionAnalysis};
pub use synthesizer::{analyze_metrics, AnswerSynthesizer, Role, Turn};
