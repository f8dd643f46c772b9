//! Simulation engine and shard management.
//!
//! This module provides the cell model, the shards that own cells, the
//! barrier and load balancers that tie shards together, and the coordinator
//! that drives the cycle loop.
//!
//! Re-exports
//!
//! - `Simulation`: the coordinator that runs cycles over a worker pool.
//! - `SimulationBuilder`: fluent builder for constructing `Simulation` instances
//!   with sensible defaults and validation.
//! - `CellPopulation`: one shard of cells.
//! - `LoadBalancer` and `BalancingStrategy`: cell migration between cycles.

pub mod balancing;
pub mod barrier;
pub mod builder;
pub mod cell;
pub mod configs;
pub mod engine;
pub mod observers;
pub mod population;
pub mod stats;

pub use balancing::{
    equalize, measure, BalancingStrategy, EqualizeCellCount, EqualizeDutyCycle, GreedyFillEmpty,
    LoadBalancer, NoBalancing, TaskMeasure, GREEDY_MIN_DONOR,
};
pub use barrier::CycleBarrier;
pub use builder::SimulationBuilder;
pub use cell::{Cell, CellState, TickContext, TickOutcome};
pub use configs::{Configuration, ExecutionConfig, GeneSource, MutationConfig, PopulationConfig};
pub use engine::{CycleOutcome, Simulation};
pub use observers::{
    BenchmarkHooks, CellRecord, CellSink, MemorySink, NoHooks, NullSink, Observers, ShardTiming,
    TimingLog,
};
pub use population::{CellPopulation, CycleContext, CycleDelta, ShardReport};
pub use stats::{CycleSummary, LiveStatistics, RunSummary, StopReason};
