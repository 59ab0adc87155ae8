use crate::error::{Result, VectorStoreError};
use report_text_chunker::Chunk;
use std::cmp::Ordering;

/// Committed index contents: chunks and a row-major vector matrix, linked by position.
///
/// `chunks.len() * dimension == data.len()` holds between mutations.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    dimension: Option<usize>,
    chunks: Vec<Chunk>,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts; caller guarantees the shapes agree
    pub(crate) fn from_parts(dimension: Option<usize>, chunks: Vec<Chunk>, data: Vec<f32>) -> Self {
        debug_assert_eq!(chunks.len() * dimension.unwrap_or(0), data.len());
        Self {
            dimension,
            chunks,
            data,
        }
    }

    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Check a batch against the established dimension, or against its own first
    /// vector on a fresh index. Returns the dimension the batch would commit with.
    pub fn check_batch(&self, vectors: &[Vec<f32>]) -> Result<usize> {
        let Some(first) = vectors.first() else {
            return self.dimension.ok_or_else(|| {
                VectorStoreError::embedding("cannot establish dimension from an empty batch")
            });
        };

        let expected = self.dimension.unwrap_or(first.len());
        if expected == 0 {
            return Err(VectorStoreError::embedding("embedder returned an empty vector"));
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(VectorStoreError::DimensionMismatch {
                expected,
                actual: bad.len(),
            });
        }

        Ok(expected)
    }

    /// Append (text, vector) pairs in order. Validates the whole batch first, so
    /// either every pair lands or none does.
    pub fn append(&mut self, texts: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<()> {
        if texts.len() != vectors.len() {
            return Err(VectorStoreError::embedding(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        if texts.is_empty() {
            return Ok(());
        }

        let dimension = self.check_batch(&vectors)?;

        self.data.reserve(vectors.len() * dimension);
        self.chunks.reserve(texts.len());
        for (text, vector) in texts.into_iter().zip(vectors) {
            self.chunks.push(Chunk::new(self.chunks.len(), text));
            self.data.extend_from_slice(&vector);
        }
        self.dimension = Some(dimension);

        Ok(())
    }

    /// k nearest stored vectors by squared L2, ascending; ties keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        let Some(dimension) = self.dimension.filter(|_| !self.is_empty()) else {
            return Err(VectorStoreError::EmptyIndex);
        };

        if query.len() != dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: dimension,
                actual: query.len(),
            });
        }

        // Brute-force scan (O(n * d))
        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(dimension)
            .enumerate()
            .map(|(position, vector)| (position, squared_l2(query, vector)))
            .collect();

        scored.sort_by(|a, b| compare_scored(*a, *b));
        scored.truncate(k);

        Ok(scored)
    }
}

fn compare_scored(a: (usize, f32), b: (usize, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0))
}

/// Squared Euclidean distance between equal-length vectors
#[must_use]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
