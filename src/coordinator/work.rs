//! Units of work and the sources the coordinator draws them from.

use crate::error::Result;
use crate::partition::chunk::{Chunk, ChunkManager, create_chunk};
use crate::rpc::protocol::{BruteForceRequest, DictionaryRequest};

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkKind {
    BruteForce(BruteForceRequest),
    Dictionary(DictionaryRequest),
}

impl WorkKind {
    pub fn username(&self) -> &str {
        match self {
            WorkKind::BruteForce(request) => &request.username,
            WorkKind::Dictionary(request) => &request.username,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub kind: WorkKind,
    pub created_at: Instant,
}

impl WorkUnit {
    pub fn brute_force(request: BruteForceRequest) -> Self {
        Self {
            kind: WorkKind::BruteForce(request),
            created_at: Instant::now(),
        }
    }

    pub fn dictionary(username: &str, chunk: &Chunk) -> Self {
        Self {
            kind: WorkKind::Dictionary(DictionaryRequest {
                username: username.to_string(),
                start_line: chunk.start_line,
                end_line: chunk.end_line,
            }),
            created_at: chunk.created_at,
        }
    }
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WorkKind::BruteForce(request) => write!(f, "portion '{}'", request.portion),
            WorkKind::Dictionary(request) => {
                write!(f, "chunk {}-{}", request.start_line, request.end_line)
            }
        }
    }
}

/// Supplies the units of one job.
pub trait WorkSource: Send {
    fn next_unit(&mut self) -> Option<WorkUnit>;

    /// Returns a unit whose dispatch failed; it is handed out again before
    /// any fresh unit.
    fn requeue(&mut self, unit: WorkUnit);

    fn has_remaining(&self) -> bool;
}

/// Brute-force units: one per alphabet portion.
#[derive(Debug, Default)]
pub struct PortionQueue {
    pending: VecDeque<WorkUnit>,
}

impl PortionQueue {
    /// `alphabet` switches workers to leading-character keyspaces.
    pub fn new(
        username: &str,
        password_length: usize,
        portions: Vec<String>,
        alphabet: Option<&str>,
    ) -> Self {
        let pending = portions
            .into_iter()
            .map(|portion| {
                WorkUnit::brute_force(BruteForceRequest {
                    username: username.to_string(),
                    password_length,
                    portion,
                    alphabet: alphabet.map(str::to_string),
                })
            })
            .collect();
        Self { pending }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl WorkSource for PortionQueue {
    fn next_unit(&mut self) -> Option<WorkUnit> {
        self.pending.pop_front()
    }

    fn requeue(&mut self, unit: WorkUnit) {
        self.pending.push_front(unit);
    }

    fn has_remaining(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Dictionary units: consecutive chunks of the corpus, cut on demand.
#[derive(Debug)]
pub struct ChunkCursor {
    username: String,
    current_line: u64,
    total_lines: u64,
    granularity: u64,
    retry: VecDeque<WorkUnit>,
}

impl ChunkCursor {
    pub fn new(username: &str, total_lines: u64, granularity: u64) -> Self {
        Self {
            username: username.to_string(),
            current_line: 1,
            total_lines,
            granularity: granularity.max(1),
            retry: VecDeque::new(),
        }
    }

    /// Cursor over the current corpus of `manager`.
    pub fn from_manager(username: &str, manager: &ChunkManager) -> Result<Self> {
        let total_lines = manager.total_lines()?;
        Ok(Self::new(username, total_lines, manager.granularity()))
    }

    pub fn total_lines(&self) -> u64 {
        self.total_lines
    }
}

impl WorkSource for ChunkCursor {
    fn next_unit(&mut self) -> Option<WorkUnit> {
        if let Some(unit) = self.retry.pop_front() {
            return Some(unit);
        }
        if self.current_line > self.total_lines {
            return None;
        }

        let chunk = create_chunk(self.current_line, self.total_lines, self.granularity);
        // Advance past the clamped end so the tail chunk is never re-cut
        self.current_line = chunk.end_line + 1;
        Some(WorkUnit::dictionary(&self.username, &chunk))
    }

    fn requeue(&mut self, unit: WorkUnit) {
        self.retry.push_back(unit);
    }

    fn has_remaining(&self) -> bool {
        !self.retry.is_empty() || self.current_line <= self.total_lines
    }
}
