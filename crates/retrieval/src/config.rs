use report_text_chunker::ChunkerConfig;
use serde::{Deserialize, Serialize};

/// Chunks retrieved per question when no explicit `k` is given
pub const DEFAULT_TOP_K: usize = 3;

/// Configuration for a retrieval session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// How ingested documents are chunked (default: 500-word windows, 50 overlap)
    pub chunker: ChunkerConfig,

    /// Chunks fed to the generator as context by `answer`
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::for_annual_reports(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl RetrievalConfig {
    /// Validate retrieval settings; chunker settings are checked by `Chunker::new`
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be > 0".to_string());
        }
        Ok(())
    }
}
