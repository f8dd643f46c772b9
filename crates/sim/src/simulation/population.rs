//! Shards of the cell population.
//!
//! A [`CellPopulation`] is owned by exactly one worker while a cycle runs and
//! is only touched by the load balancer in the serial gap between cycles.

use crate::base::IdGenerator;
use crate::errors::SimulationError;
use crate::evolution::{DivisionKind, MutationModel};
use crate::genome::{GeneTable, GenomeArena};
use crate::simulation::{Cell, CellSink, TickContext, TickOutcome};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-cycle changes in one shard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleDelta {
    /// Births minus deaths.
    pub cells: i64,
    /// Driver mutations introduced this cycle.
    pub drivers: u64,
    /// Passenger mutations introduced this cycle.
    pub passengers: u64,
}

impl CycleDelta {
    fn record_division(&mut self, kind: DivisionKind) {
        self.cells += 1;
        match kind {
            DivisionKind::Clean => {}
            DivisionKind::Driver => self.drivers += 1,
            DivisionKind::Passenger => self.passengers += 1,
        }
    }
}

impl std::ops::AddAssign for CycleDelta {
    fn add_assign(&mut self, rhs: Self) {
        self.cells += rhs.cells;
        self.drivers += rhs.drivers;
        self.passengers += rhs.passengers;
    }
}

/// What a shard reports after its cycle step.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardReport {
    pub shard: usize,
    pub cycle: i64,
    /// Living cells once the step is done.
    pub population: usize,
    pub delta: CycleDelta,
    /// Wall-clock time of the step, filled in by the coordinator.
    pub duration: Duration,
    /// True for the terminal cycle, which only flushes.
    pub finished: bool,
}

/// Shared inputs of one shard's cycle step.
#[derive(Clone, Copy)]
pub struct CycleContext<'a> {
    pub cycle: i64,
    /// The run stops after this cycle: flush and report only.
    pub is_final: bool,
    /// Carrying capacity K of the death probability.
    pub capacity: f64,
    pub arena: &'a GenomeArena,
    pub genes: &'a GeneTable,
    pub mutation: &'a MutationModel,
    pub ids: &'a IdGenerator,
    pub sink: &'a dyn CellSink,
}

impl<'a> CycleContext<'a> {
    fn tick_context(&self, cells_at_start: usize) -> TickContext<'a> {
        TickContext {
            arena: self.arena,
            genes: self.genes,
            mutation: self.mutation,
            ids: self.ids,
            cycle: self.cycle,
            cells_at_start,
            capacity: self.capacity,
        }
    }
}

/// One shard: an ordered list of cells and its counters.
#[derive(Debug, Clone, Default)]
pub struct CellPopulation {
    index: usize,
    cells: Vec<Cell>,
    delta: CycleDelta,
    last_cycle_duration: Duration,
}

impl CellPopulation {
    pub fn new(index: usize, cells: Vec<Cell>) -> Self {
        Self {
            index,
            cells,
            delta: CycleDelta::default(),
            last_cycle_duration: Duration::ZERO,
        }
    }

    /// A shard of `count` founder cells.
    pub fn seeded(index: usize, count: usize, ids: &IdGenerator) -> Self {
        let cells = (0..count).map(|_| Cell::founder(ids.next_cell_id())).collect();
        Self::new(index, cells)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Length of the cell list, including dead cells awaiting cleanup.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn delta(&self) -> CycleDelta {
        self.delta
    }

    #[inline]
    pub fn last_cycle_duration(&self) -> Duration {
        self.last_cycle_duration
    }

    pub fn set_cycle_duration(&mut self, duration: Duration) {
        self.last_cycle_duration = duration;
    }

    /// Remove up to `count` cells from the end of the list.
    pub fn take_tail(&mut self, count: usize) -> Vec<Cell> {
        let keep = self.cells.len().saturating_sub(count);
        self.cells.split_off(keep)
    }

    /// Append cells handed over by the load balancer.
    pub fn absorb(&mut self, cells: Vec<Cell>) {
        self.cells.extend(cells);
    }

    /// Advance this shard by one cycle.
    ///
    /// The previous cycle's list is flushed to the sink before anything in it
    /// changes; dead cells are dropped only after that flush. Only the cells
    /// present once the dead are gone are ticked: daughters appended during
    /// the loop wait for the next cycle.
    ///
    /// On the final cycle the list is flushed unchanged and the report is
    /// marked `finished`.
    pub fn run_cycle<R: Rng + ?Sized>(
        &mut self,
        ctx: &CycleContext<'_>,
        rng: &mut R,
    ) -> Result<ShardReport, SimulationError> {
        self.delta = CycleDelta::default();

        if ctx.is_final {
            ctx.sink.flush(self.index, ctx.cycle - 1, &self.cells);
            return Ok(self.report(ctx.cycle, true));
        }

        if ctx.cycle > 0 {
            ctx.sink.flush(self.index, ctx.cycle - 1, &self.cells);
        }
        self.cells.retain(Cell::is_alive);

        let cells_at_start = self.cells.len();
        let tick = ctx.tick_context(cells_at_start);
        for i in 0..cells_at_start {
            match self.cells[i].tick(&tick, rng)? {
                TickOutcome::Divided { daughter, kind } => {
                    self.delta.record_division(kind);
                    self.cells.push(daughter);
                }
                TickOutcome::Died => self.delta.cells -= 1,
            }
        }

        tracing::trace!(
            shard = self.index,
            cycle = ctx.cycle,
            cells_at_start,
            delta = self.delta.cells,
            "shard cycle done"
        );
        Ok(self.report(ctx.cycle, false))
    }

    fn report(&self, cycle: i64, finished: bool) -> ShardReport {
        ShardReport {
            shard: self.index,
            cycle,
            population: self.alive_count(),
            delta: self.delta,
            duration: Duration::ZERO,
            finished,
        }
    }
}
