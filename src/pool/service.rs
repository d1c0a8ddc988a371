use super::types::{WorkerId, WorkerState};
use crate::error::{CrackError, Result};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide registry of worker nodes.
///
/// Shared behind an `Arc` by the HTTP layer (registration) and the task
/// coordinator (snapshots and eviction). Nothing else mutates membership.
#[derive(Debug, Default)]
pub struct WorkerPool {
    /// Worker -> registration sequence number.
    members: DashMap<WorkerId, u64>,
    next_seq: AtomicU64,
}

impl WorkerPool {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds a worker. Returns `false` if it was already registered.
    pub fn register(&self, worker: WorkerId) -> bool {
        match self.members.entry(worker.clone()) {
            Entry::Occupied(_) => {
                tracing::warn!("Calculating server {} is already connected", worker);
                return false;
            }
            Entry::Vacant(slot) => {
                slot.insert(self.next_seq.fetch_add(1, Ordering::SeqCst));
            }
        }

        tracing::info!(
            "Registered calculating server {}. Pool size: {}",
            worker,
            self.members.len()
        );
        true
    }

    pub fn contains(&self, worker: &WorkerId) -> bool {
        self.members.contains_key(worker)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Registered workers in registration order.
    pub fn members(&self) -> Vec<WorkerId> {
        let mut entries: Vec<(u64, WorkerId)> = self
            .members
            .iter()
            .map(|entry| (*entry.value(), entry.key().clone()))
            .collect();
        entries.sort();
        entries.into_iter().map(|(_, id)| id).collect()
    }

    /// Fails fast when no worker is registered.
    pub fn validate_availability(&self) -> Result<()> {
        if self.is_empty() {
            return Err(CrackError::NoWorkersAvailable);
        }
        Ok(())
    }

    /// Snapshots the pool into idle worker states for one job.
    pub fn initialize_states(&self) -> Vec<WorkerState> {
        self.members().into_iter().map(WorkerState::new).collect()
    }

    /// Workers from `states` that are not currently busy.
    pub fn get_available(&self, states: &[WorkerState]) -> Vec<WorkerState> {
        states.iter().filter(|state| !state.busy).cloned().collect()
    }

    /// Permanently removes a worker from the pool.
    ///
    /// Returns `true` if the worker was still registered.
    pub fn mark_failed(&self, worker: &WorkerId) -> bool {
        if self.members.remove(worker).is_some() {
            tracing::info!(
                "Removed failed server {}. Remaining: {}",
                worker,
                self.members.len()
            );
            true
        } else {
            false
        }
    }
}
