use crate::config::{ChunkerConfig, ChunkingStrategy};
use crate::error::{ChunkerError, Result};
use crate::strategy::StrategyExecutor;
use crate::types::Chunk;

/// Main chunker interface for processing document text
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker, rejecting invalid configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk text with the configured strategy. Empty text yields no chunks.
    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let chunks = StrategyExecutor::new(&self.config).execute(text);
        log::debug!(
            "Chunked {} bytes into {} chunks ({:?}, size={}, overlap={})",
            text.len(),
            chunks.len(),
            self.config.strategy,
            self.config.chunk_size,
            self.config.overlap
        );
        chunks
    }
}

/// Split `text` into overlapping word windows of `chunk_size` words.
///
/// Each emitted window seeds the next one with its last `overlap` words, and a
/// non-empty final window shorter than `chunk_size` becomes the last chunk.
/// Fails with [`ChunkerError::InvalidConfig`] when `chunk_size <= overlap`.
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    let chunker = Chunker::new(ChunkerConfig {
        strategy: ChunkingStrategy::Words,
        chunk_size,
        overlap,
    })?;
    Ok(chunker.chunk(text))
}
