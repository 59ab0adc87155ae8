use report_text_chunker::Chunk;
use serde::{Deserialize, Serialize};

/// A stored chunk together with its squared L2 distance to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub chunk: Chunk,
    pub distance: f32,
}
