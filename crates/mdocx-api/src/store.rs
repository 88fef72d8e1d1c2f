//! Per-conversion state records.
//!
//! # Design
//! - Every upload owns an entry keyed by a generated UUID; uploads never share state.
//! - The mutex is never held across an `.await`; workspaces are dropped (and their
//!   files deleted) only after the guard is released.
//! - Entries still `Processing` are never evicted.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use mdocx_convert::ConversionWorkspace;
use uuid::Uuid;

use crate::models::{ConversionState, ConversionStatus};

struct ConversionEntry {
    state: ConversionState,
    workspace: Option<ConversionWorkspace>,
    touched_at: Instant,
}

/// Identifier and artifact paths of a conversion registered by [`ConversionStore::begin`].
pub(crate) struct StartedConversion {
    pub(crate) id: Uuid,
    pub(crate) input: PathBuf,
    pub(crate) output: PathBuf,
}

/// Mutex-guarded map of conversion records with TTL eviction.
pub(crate) struct ConversionStore {
    entries: Mutex<HashMap<Uuid, ConversionEntry>>,
    ttl: Duration,
}

impl ConversionStore {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Register a conversion whose input is on disk; the entry starts `Processing`.
    pub(crate) fn begin(&self, workspace: ConversionWorkspace) -> StartedConversion {
        let input = workspace.input_path().to_path_buf();
        let output = workspace.output_path().to_path_buf();
        let state = ConversionState::processing(input.clone(), output.clone());
        let id = self.insert(state, Some(workspace));
        StartedConversion { id, input, output }
    }

    /// Register a conversion that failed before the converter could run.
    pub(crate) fn insert_failed(&self, state: ConversionState) -> Uuid {
        self.insert(state, None)
    }

    fn insert(&self, state: ConversionState, workspace: Option<ConversionWorkspace>) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(
            id,
            ConversionEntry {
                state,
                workspace,
                touched_at: Instant::now(),
            },
        );
        id
    }

    pub(crate) fn complete(&self, id: &Uuid) -> Option<ConversionState> {
        let mut guard = self.lock();
        let entry = guard.get_mut(id)?;
        entry.state.mark_completed();
        entry.touched_at = Instant::now();
        Some(entry.state.clone())
    }

    /// Mark a conversion failed and release its temporary files.
    pub(crate) fn fail(&self, id: &Uuid, message: impl Into<String>) -> Option<ConversionState> {
        let mut guard = self.lock();
        let entry = guard.get_mut(id)?;
        entry.state.mark_failed(message);
        entry.touched_at = Instant::now();
        let state = entry.state.clone();
        let workspace = entry.workspace.take();
        drop(guard);
        drop(workspace);
        Some(state)
    }

    pub(crate) fn get(&self, id: &Uuid) -> Option<ConversionState> {
        self.lock().get(id).map(|entry| entry.state.clone())
    }

    /// Output path of a completed conversion; refreshes the entry's retention timer.
    pub(crate) fn completed_output(&self, id: &Uuid) -> Option<PathBuf> {
        let mut guard = self.lock();
        let entry = guard.get_mut(id)?;
        if entry.state.status != ConversionStatus::Completed {
            return None;
        }
        entry.touched_at = Instant::now();
        entry.state.output_path.clone()
    }

    /// Drop terminal entries untouched for longer than the TTL; returns how many were removed.
    pub(crate) fn evict_expired(&self, now: Instant) -> usize {
        let mut guard = self.lock();
        let expired: Vec<Uuid> = guard
            .iter()
            .filter(|(_, entry)| {
                entry.state.is_terminal()
                    && now.saturating_duration_since(entry.touched_at) >= self.ttl
            })
            .map(|(id, _)| *id)
            .collect();
        let evicted: Vec<ConversionEntry> = expired
            .iter()
            .filter_map(|id| guard.remove(id))
            .collect();
        drop(guard);
        let count = evicted.len();
        drop(evicted);
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, ConversionEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
