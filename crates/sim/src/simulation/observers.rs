//! Collaborators that watch a run without steering it.
//!
//! A [`CellSink`] receives every shard's cell list once per cycle, before the
//! list is changed for the next cycle. [`BenchmarkHooks`] are told when each
//! shard starts and finishes its cycle step. Both are called from worker
//! threads and must be `Send + Sync`.

use crate::base::{CellId, CloneId};
use crate::genome::GenomeId;
use crate::simulation::{Cell, CellState};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Receives snapshots of shard cell lists.
pub trait CellSink: Send + Sync {
    /// `cells` is the state of `shard` at the end of `cycle`; `-1` labels the
    /// seeded population. Dead cells of that cycle are included.
    fn flush(&self, shard: usize, cycle: i64, cells: &[Cell]);
}

/// Discards every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl CellSink for NullSink {
    fn flush(&self, _shard: usize, _cycle: i64, _cells: &[Cell]) {}
}

/// One flushed cell, flattened for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub shard: usize,
    pub cycle: i64,
    pub cell: CellId,
    pub parent: Option<CellId>,
    pub clone_group: CloneId,
    pub age: u32,
    pub alive: bool,
    pub genome: GenomeId,
    pub division_probability: f64,
    pub death_probability: f64,
}

impl CellRecord {
    pub fn new(shard: usize, cycle: i64, cell: &Cell) -> Self {
        Self {
            shard,
            cycle,
            cell: cell.id(),
            parent: cell.parent(),
            clone_group: cell.clone_group(),
            age: cell.age(),
            alive: cell.state() == CellState::Alive,
            genome: cell.genome(),
            division_probability: cell.division_probability(),
            death_probability: cell.death_probability(),
        }
    }
}

/// Keeps every flushed cell in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<CellRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything flushed so far.
    pub fn records(&self) -> Vec<CellRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the collected records.
    pub fn take(&self) -> Vec<CellRecord> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CellSink for MemorySink {
    fn flush(&self, shard: usize, cycle: i64, cells: &[Cell]) {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.extend(cells.iter().map(|c| CellRecord::new(shard, cycle, c)));
    }
}

/// Start/stop notifications for each shard's cycle step.
pub trait BenchmarkHooks: Send + Sync {
    fn shard_started(&self, _shard: usize, _cycle: i64) {}
    fn shard_finished(&self, _shard: usize, _cycle: i64, _elapsed: Duration) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl BenchmarkHooks for NoHooks {}

/// Accumulated timings of one shard.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShardTiming {
    pub steps: u64,
    pub total: Duration,
    pub slowest: Duration,
}

impl ShardTiming {
    pub fn mean(&self) -> Duration {
        if self.steps == 0 {
            return Duration::ZERO;
        }
        match u32::try_from(self.steps) {
            Ok(steps) => self.total / steps,
            Err(_) => self.total.div_f64(self.steps as f64),
        }
    }
}

/// Accumulates per-shard step timings and logs each at `trace` level.
#[derive(Debug, Default)]
pub struct TimingLog {
    shards: Mutex<Vec<ShardTiming>>,
}

impl TimingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timings(&self) -> Vec<ShardTiming> {
        self.shards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl BenchmarkHooks for TimingLog {
    fn shard_finished(&self, shard: usize, cycle: i64, elapsed: Duration) {
        tracing::trace!(shard, cycle, elapsed_us = elapsed.as_micros() as u64, "shard step finished");
        let mut shards = self.shards.lock().unwrap_or_else(PoisonError::into_inner);
        if shards.len() <= shard {
            shards.resize(shard + 1, ShardTiming::default());
        }
        let timing = &mut shards[shard];
        timing.steps += 1;
        timing.total += elapsed;
        timing.slowest = timing.slowest.max(elapsed);
    }
}

/// The sink and hooks attached to a simulation.
#[derive(Clone)]
pub struct Observers {
    pub sink: Arc<dyn CellSink>,
    pub hooks: Arc<dyn BenchmarkHooks>,
}

impl Observers {
    pub fn with_sink(mut self, sink: Arc<dyn CellSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn BenchmarkHooks>) -> Self {
        self.hooks = hooks;
        self
    }
}

impl Default for Observers {
    fn default() -> Self {
        Self {
            sink: Arc::new(NullSink),
            hooks: Arc::new(NoHooks),
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").finish_non_exhaustive()
    }
}
