//! # Report Vector Store
//!
//! Exact nearest-neighbour storage for document chunk embeddings.
//!
//! ## Features
//!
//! - **Brute-force L2 search** with deterministic tie-breaking by insertion order
//! - **Pluggable embedders** behind the [`Embedder`] trait (offline hash, HTTP)
//! - **All-or-nothing batches**: a failed or cancelled `add` commits nothing
//! - **Persistent snapshots** as a binary vector blob plus a JSON manifest
//!
//! ## Architecture
//!
//! ```text
//! chunk texts
//!     │
//!     ├──> Embedder (batched, order preserved)
//!     │      └─> Vec<f32>[D]
//!     │
//!     ├──> FlatIndex (squared L2, linear scan)
//!     │      └─> top-k ascending by distance
//!     │
//!     └──> Snapshot
//!            ├─> vectors.bin
//!            └─> chunks.json
//! ```
//!
//! Distances are computed over the raw embedding space; callers that want
//! cosine ranking must normalize vectors before they reach the index.
//!
//! ## Example
//!
//! ```no_run
//! use report_vector_store::{HashEmbedder, VectorIndex};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> report_vector_store::Result<()> {
//!     let index = VectorIndex::new(Arc::new(HashEmbedder::new(384)));
//!
//!     index
//!         .add(vec!["Revenue grew 12%".to_string(), "Debt was refinanced".to_string()])
//!         .await?;
//!
//!     for result in index.search("how did revenue change", 2).await? {
//!         println!("{:.3} {}", result.distance, result.chunk.text);
//!     }
//!
//!     index.save("index").await?;
//!     Ok(())
//! }
//! ```

mod embeddings;
mod error;
mod flat_index;
mod http_embedder;
mod persist;
mod store;
mod types;

pub use embeddings::{normalize, Embedder, EmbedderKind, HashEmbedder, EMBEDDING_MODE_ENV};
pub use error::{Result, VectorStoreError};
pub use http_embedder::{HttpEmbedder, HttpEmbedderConfig};
pub use persist::{INDEX_SCHEMA_VERSION, MANIFEST_FILE, VECTORS_FILE};
pub use store::VectorIndex;
pub use types::QueryResult;

// Re-export chunk type for convenience
pub use report_text_chunker::Chunk;
pub use tokio_util::sync::CancellationToken;
