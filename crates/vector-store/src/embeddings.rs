use crate::error::{Result, VectorStoreError};
use crate::http_embedder::{HttpEmbedder, HttpEmbedderConfig};
use async_trait::async_trait;
use std::env;
use std::sync::Arc;

/// Environment variable selecting the embedding backend (`hash` or `http`)
pub const EMBEDDING_MODE_ENV: &str = "REPORT_EMBEDDING_MODE";

const DEFAULT_HASH_BATCH: usize = 256;

/// Maps text to fixed-length vectors.
///
/// Implementations return exactly one vector per input text, in input order, and
/// keep the same dimension across calls.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Maximum number of texts per `embed` call
    fn max_batch_size(&self) -> usize {
        DEFAULT_HASH_BATCH
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embedding backend selection
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EmbedderKind {
    Hash,
    Http,
}

impl EmbedderKind {
    pub fn from_env() -> Result<Self> {
        let raw = env::var(EMBEDDING_MODE_ENV).unwrap_or_else(|_| "hash".to_string());
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(Self::Hash),
            "http" => Ok(Self::Http),
            other => Err(VectorStoreError::embedding(format!(
                "Unsupported {EMBEDDING_MODE_ENV} '{other}' (expected 'hash' or 'http')"
            ))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::Http => "http",
        }
    }

    /// Build the backend; `dimension` only applies to the hash backend
    pub fn build(self, dimension: usize) -> Result<Arc<dyn Embedder>> {
        match self {
            Self::Hash => {
                if dimension == 0 {
                    return Err(VectorStoreError::embedding(
                        "hash embedder dimension must be > 0",
                    ));
                }
                Ok(Arc::new(HashEmbedder::new(dimension)))
            }
            Self::Http => Ok(Arc::new(HttpEmbedder::new(HttpEmbedderConfig::default())?)),
        }
    }
}

/// Deterministic offline embedder.
///
/// Seeds SplitMix64 with the FNV-1a hash of the text and emits an L2-normalized
/// vector, so identical texts always land on the same point.
#[derive(Clone, Debug)]
pub struct HashEmbedder {
    dimension: usize,
    max_batch: usize,
}

impl HashEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self {
            dimension,
            max_batch: DEFAULT_HASH_BATCH,
        }
    }

    #[must_use]
    pub const fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        hash_embed(text, self.dimension)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

/// Scale `vec` to unit L2 norm in place; zero vectors are left untouched
pub fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vec {
        *value /= norm;
    }
}

fn hash_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut state =
        fnv1a_64(text.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut vec = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let bits = splitmix64(&mut state);
        let high = (bits >> 32) as u32;
        let mantissa = high >> 9;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        vec.push(unit.mul_add(2.0, -1.0));
    }
    normalize(&mut vec);
    vec
}

pub(crate) fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
