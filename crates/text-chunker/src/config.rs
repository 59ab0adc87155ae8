use serde::{Deserialize, Serialize};

/// Default window size in words
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default number of words shared by consecutive windows
pub const DEFAULT_OVERLAP: usize = 50;

/// Configuration for text chunking behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Chunking strategy to use
    pub strategy: ChunkingStrategy,

    /// Chunk size: words for `Words`, characters for `Separator`
    pub chunk_size: usize,

    /// Overlap between consecutive chunks, in the same unit as `chunk_size`
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkingStrategy::Words,
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkerConfig {
    /// Word windows sized for long annual-report prose
    pub fn for_annual_reports() -> Self {
        Self::default()
    }

    /// Newline-separated character chunks (2000 chars, 300 overlap)
    pub fn for_characters() -> Self {
        Self {
            strategy: ChunkingStrategy::Separator {
                separator: "\n".to_string(),
            },
            chunk_size: 2000,
            overlap: 300,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".to_string());
        }

        if self.chunk_size <= self.overlap {
            return Err(format!(
                "chunk_size ({}) must exceed overlap ({})",
                self.chunk_size, self.overlap
            ));
        }

        if let ChunkingStrategy::Separator { separator } = &self.strategy {
            if separator.is_empty() {
                return Err("separator must not be empty".to_string());
            }
        }

        Ok(())
    }
}

/// Strategy for splitting text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ChunkingStrategy {
    /// Fixed word windows with word overlap
    Words,

    /// Split on a separator and merge pieces up to a character budget
    Separator { separator: String },
}

impl Default for ChunkingStrategy {
    fn default() -> Self {
        Self::Words
    }
}
