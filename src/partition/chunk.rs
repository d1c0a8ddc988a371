use crate::error::Result;
use crate::storage::DictionaryStorage;

use std::time::Instant;

/// A contiguous, inclusive range of corpus lines assigned as one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub start_line: u64,
    pub end_line: u64,
    /// Stamped at creation; the coordinator measures round time from here.
    pub created_at: Instant,
}

impl Chunk {
    pub fn len(&self) -> u64 {
        self.end_line + 1 - self.start_line
    }

    pub fn is_empty(&self) -> bool {
        self.end_line < self.start_line
    }
}

/// Builds the chunk starting at `current_line`.
///
/// `end_line = min(current_line + granularity - 1, total_lines)`.
pub fn create_chunk(current_line: u64, total_lines: u64, granularity: u64) -> Chunk {
    let span = granularity.max(1) - 1;
    Chunk {
        start_line: current_line,
        end_line: current_line.saturating_add(span).min(total_lines),
        created_at: Instant::now(),
    }
}

/// Cuts the current dictionary corpus into line-range chunks.
#[derive(Debug, Clone)]
pub struct ChunkManager {
    storage: DictionaryStorage,
    granularity: u64,
}

impl ChunkManager {
    pub fn new(storage: DictionaryStorage, granularity: u64) -> Self {
        Self {
            storage,
            granularity: granularity.max(1),
        }
    }

    pub fn granularity(&self) -> u64 {
        self.granularity
    }

    pub fn create_chunk(&self, current_line: u64, total_lines: u64) -> Chunk {
        create_chunk(current_line, total_lines, self.granularity)
    }

    /// Line count of the most recently created corpus file.
    ///
    /// Fails with `CorpusMissing` when the storage holds no corpus.
    pub fn total_lines(&self) -> Result<u64> {
        self.storage.count_lines().inspect_err(|e| {
            tracing::error!("Error counting dictionary lines: {}", e);
        })
    }
}
