use serde::{Deserialize, Serialize};

/// A contiguous slice of a source document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the chunk sequence (0-indexed)
    pub index: usize,

    /// Chunk text; words joined by single spaces for word windows
    pub text: String,
}

impl Chunk {
    /// Create a new chunk
    #[must_use]
    pub const fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }

    /// Number of whitespace-separated words in this chunk
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    #[must_use]
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }
}
