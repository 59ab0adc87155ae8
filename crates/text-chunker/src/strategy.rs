use crate::config::{ChunkerConfig, ChunkingStrategy};
use crate::types::Chunk;
use std::collections::VecDeque;

/// Execute chunking strategy on document text
pub struct StrategyExecutor<'a> {
    config: &'a ChunkerConfig,
}

impl<'a> StrategyExecutor<'a> {
    pub const fn new(config: &'a ChunkerConfig) -> Self {
        Self { config }
    }

    /// Execute the configured strategy
    pub fn execute(&self, text: &str) -> Vec<Chunk> {
        match &self.config.strategy {
            ChunkingStrategy::Words => {
                chunk_by_words(text, self.config.chunk_size, self.config.overlap)
            }
            ChunkingStrategy::Separator { separator } => chunk_by_separator(
                text,
                separator,
                self.config.chunk_size,
                self.config.overlap,
            ),
        }
    }
}

/// Fixed word windows; each emitted window seeds the next with its last `overlap` words.
pub(crate) fn chunk_by_words(text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut window: Vec<&str> = Vec::with_capacity(chunk_size);

    for word in text.split_whitespace() {
        window.push(word);

        if window.len() >= chunk_size {
            chunks.push(Chunk::new(chunks.len(), window.join(" ")));
            let keep_from = window.len().saturating_sub(overlap);
            window.drain(..keep_from);
        }
    }

    // Handle remaining words
    if !window.is_empty() {
        chunks.push(Chunk::new(chunks.len(), window.join(" ")));
    }

    chunks
}

/// Separator pieces merged greedily up to `chunk_size` characters.
pub(crate) fn chunk_by_separator(
    text: &str,
    separator: &str,
    chunk_size: usize,
    overlap: usize,
) -> Vec<Chunk> {
    let separator_len = separator.chars().count();
    let mut chunks = Vec::new();
    let mut current: VecDeque<(&str, usize)> = VecDeque::new();
    let mut total = 0usize;

    let pieces = text
        .split(separator)
        .filter(|piece| !piece.trim().is_empty())
        .map(|piece| (piece, piece.chars().count()));

    for (piece, len) in pieces {
        let joiner = if current.is_empty() { 0 } else { separator_len };

        if total + len + joiner > chunk_size && !current.is_empty() {
            if total > chunk_size {
                log::warn!("Created a chunk of {total} characters, longer than {chunk_size}");
            }
            emit_joined(&mut chunks, &current, separator);

            // Drop from the front until the carried tail fits the overlap and the next piece fits
            while total > overlap
                || (total > 0 && total + len + joined_len(&current, separator_len) > chunk_size)
            {
                let Some((_, front_len)) = current.pop_front() else {
                    break;
                };
                let removed_joiner = if current.is_empty() { 0 } else { separator_len };
                total = total.saturating_sub(front_len + removed_joiner);
            }
        }

        let joiner = if current.is_empty() { 0 } else { separator_len };
        current.push_back((piece, len));
        total += len + joiner;
    }

    if total > chunk_size {
        log::warn!("Created a chunk of {total} characters, longer than {chunk_size}");
    }
    emit_joined(&mut chunks, &current, separator);

    chunks
}

fn joined_len(current: &VecDeque<(&str, usize)>, separator_len: usize) -> usize {
    if current.is_empty() {
        0
    } else {
        separator_len
    }
}

fn emit_joined(chunks: &mut Vec<Chunk>, current: &VecDeque<(&str, usize)>, separator: &str) {
    let joined = current
        .iter()
        .map(|(piece, _)| *piece)
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(Chunk::new(chunks.len(), trimmed.to_string()));
    }
}
