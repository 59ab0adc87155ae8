//! # Report Text Chunker
//!
//! Splits long document text into overlapping chunks for embedding and retrieval.
//!
//! ## Strategies
//!
//! ```text
//! Document text
//!     │
//!     ├──> Words (default)
//!     │      └─> fixed word windows, last `overlap` words reseed the next window
//!     │
//!     └──> Separator
//!            └─> pieces merged up to `chunk_size` characters, tail carried over
//! ```
//!
//! ## Example
//!
//! ```rust
//! use report_text_chunker::{split, Chunker, ChunkerConfig};
//!
//! let text = "revenue grew twelve percent while operating costs fell";
//! let chunks = split(text, 4, 1).unwrap();
//! assert_eq!(chunks.len(), 3);
//! assert_eq!(chunks[0].text, "revenue grew twelve percent");
//! assert_eq!(chunks[1].text, "percent while operating costs");
//! assert_eq!(chunks[2].text, "costs fell");
//!
//! let chunker = Chunker::new(ChunkerConfig::for_annual_reports()).unwrap();
//! assert!(chunker.chunk("").is_empty());
//! ```

mod chunker;
mod config;
mod error;
mod strategy;
mod types;

pub use chunker::{split, Chunker};
pub use config::{ChunkerConfig, ChunkingStrategy, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
pub use error::{ChunkerError, Result};
pub use types::Chunk;
