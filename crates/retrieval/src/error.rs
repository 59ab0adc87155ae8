use thiserror::Error;

pub type Result<T> = std::result::Result<T, RetrievalError>;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Chunker error: {0}")]
    ChunkerError(#[from] report_text_chunker::ChunkerError),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] report_vector_store::VectorStoreError),

    #[error("Invalid retrieval configuration: {0}")]
    InvalidConfig(String),

    #[error("No document has been ingested")]
    NotIngested,

    /// The generated text lacks the expected section markers; `raw` holds it untouched
    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    #[error("Generation error: {0}")]
    GenerationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl RetrievalError {
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::GenerationError(msg.into())
    }
}
