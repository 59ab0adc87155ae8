use crate::answer::StructuredAnswer;
use crate::config::{RetrievalConfig, DEFAULT_TOP_K};
use crate::error::{Result, RetrievalError};
use crate::generator::Generator;
use crate::prompt::report_prompt;
use crate::sections::{field_title, section_question, FieldAnswer, SectionAnalysis};
use report_text_chunker::Chunker;
use report_vector_store::{CancellationToken, Embedder, VectorIndex};
use std::path::Path;
use std::sync::Arc;

/// Question answering over one ingested document.
///
/// Starts empty; every successful ingest replaces the previous document.
pub struct RetrievalEngine {
    config: RetrievalConfig,
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    index: Option<VectorIndex>,
}

impl RetrievalEngine {
    pub fn new(
        config: RetrievalConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let chunker = Chunker::new(config.chunker.clone())?;
        config.validate().map_err(RetrievalError::InvalidConfig)?;
        Ok(Self {
            config,
            chunker,
            embedder,
            generator,
            index: None,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    #[must_use]
    pub const fn is_ingested(&self) -> bool {
        self.index.is_some()
    }

    pub async fn chunk_count(&self) -> usize {
        match &self.index {
            Some(index) => index.len().await,
            None => 0,
        }
    }

    pub async fn ingest(&mut self, text: &str) -> Result<()> {
        self.ingest_with_cancel(text, &CancellationToken::new()).await
    }

    /// Chunk, embed and index `text`, replacing any prior document.
    ///
    /// The new index is built off to the side; on failure or cancellation the
    /// previous state stays in place.
    pub async fn ingest_with_cancel(
        &mut self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let chunks = self.chunker.chunk(text);
        log::info!(
            "Ingesting document: {} words into {} chunks",
            text.split_whitespace().count(),
            chunks.len()
        );

        let index = VectorIndex::new(self.embedder.clone());
        let texts = chunks.into_iter().map(|chunk| chunk.text).collect();
        index.add_with_cancel(texts, cancel).await?;

        self.index = Some(index);
        Ok(())
    }

    /// Texts of the `k` chunks nearest to `question`, best first
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<String>> {
        let index = self.index.as_ref().ok_or(RetrievalError::NotIngested)?;
        let results = index.search(question, k).await?;
        log::debug!("Retrieved {} chunks for question", results.len());
        Ok(results.into_iter().map(|r| r.chunk.text).collect())
    }

    pub async fn retrieve_default(&self, question: &str) -> Result<Vec<String>> {
        self.retrieve(question, DEFAULT_TOP_K).await
    }

    /// Retrieve context for `question`, ask the generator once and parse the
    /// three-section reply
    pub async fn answer(&self, question: &str) -> Result<StructuredAnswer> {
        let context = self.retrieve(question, self.config.top_k).await?.join("\n");
        let prompt = report_prompt(&context, question);
        let raw = self.generator.complete(&prompt).await?;
        StructuredAnswer::parse(&raw)
    }

    /// Answer every field of every section, preserving request order.
    ///
    /// Each field key is asked as "What are the {Title} in the {section} section?".
    /// The first failing answer aborts the batch.
    pub async fn analyze_sections(
        &self,
        sections: &[(&str, &[&str])],
    ) -> Result<Vec<SectionAnalysis>> {
        let mut results = Vec::with_capacity(sections.len());
        for (section, fields) in sections {
            let mut answers = Vec::with_capacity(fields.len());
            for field in fields.iter() {
                let title = field_title(field);
                log::debug!("Analyzing {title} in {section}");
                let answer = self.answer(&section_question(&title, section)).await?;
                answers.push(FieldAnswer {
                    field: title,
                    answer,
                });
            }
            results.push(SectionAnalysis {
                section: (*section).to_string(),
                fields: answers,
            });
        }
        Ok(results)
    }

    pub async fn save_index(&self, dir: impl AsRef<Path>) -> Result<()> {
        let index = self.index.as_ref().ok_or(RetrievalError::NotIngested)?;
        index.save(dir).await?;
        Ok(())
    }

    /// Replace the current document with a persisted index
    pub async fn load_index(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let index = VectorIndex::load(dir, self.embedder.clone()).await?;
        self.index = Some(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use report_text_chunker::ChunkerConfig;
    use report_vector_store::HashEmbedder;

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }
    }

    fn engine(config: RetrievalConfig) -> Result<RetrievalEngine> {
        RetrievalEngine::new(
            config,
            Arc::new(HashEmbedder::new(32)),
            Arc::new(EchoGenerator),
        )
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RetrievalConfig {
            chunker: ChunkerConfig {
                chunk_size: 10,
                overlap: 10,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            engine(config),
            Err(RetrievalError::ChunkerError(_))
        ));
    }

    #[test]
    fn test_zero_top_k_is_a_retrieval_error() {
        let config = RetrievalConfig {
            top_k: 0,
            ..Default::default()
        };
        match engine(config) {
            Err(RetrievalError::InvalidConfig(reason)) => assert!(reason.contains("top_k")),
            Err(other) => panic!("expected InvalidConfig, got {other:?}"),
            Ok(_) => panic!("expected InvalidConfig"),
        }
    }

    #[tokio::test]
    async fn test_retrieve_before_ingest() {
        let engine = engine(RetrievalConfig::default()).unwrap();
        assert!(!engine.is_ingested());
        assert_eq!(engine.chunk_count().await, 0);
        assert!(matches!(
            engine.retrieve_default("anything").await,
            Err(RetrievalError::NotIngested)
        ));
    }

    #[tokio::test]
    async fn test_empty_document_ingests_to_empty_index() {
        let mut engine = engine(RetrievalConfig::default()).unwrap();
        engine.ingest("   ").await.unwrap();
        assert!(engine.is_ingested());
        assert_eq!(engine.chunk_count().await, 0);
        assert!(matches!(
            engine.retrieve_default("anything").await,
            Err(RetrievalError::VectorStoreError(
                report_vector_store::VectorStoreError::EmptyIndex
            ))
        ));
    }
}
