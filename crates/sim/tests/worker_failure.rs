//! A failing shard must abort the whole run instead of hanging the others
//! at the cycle barrier.

use clonevo_sim::errors::SimulationError;
use clonevo_sim::simulation::{
    BenchmarkHooks, Cell, CellSink, CycleOutcome, MemorySink, Simulation, SimulationBuilder,
};
use std::sync::Arc;
use std::time::Duration;

/// Panics when `shard` flushes the cells of `cycle`.
struct FailingSink {
    shard: usize,
    cycle: i64,
}

impl CellSink for FailingSink {
    fn flush(&self, shard: usize, cycle: i64, _cells: &[Cell]) {
        if shard == self.shard && cycle == self.cycle {
            panic!("sink refused shard {shard}");
        }
    }
}

/// Panics when `shard` finishes any step.
struct FailingHooks {
    shard: usize,
}

impl BenchmarkHooks for FailingHooks {
    fn shard_finished(&self, shard: usize, _cycle: i64, _elapsed: Duration) {
        if shard == self.shard {
            panic!("hook exploded");
        }
    }
}

fn builder() -> SimulationBuilder {
    SimulationBuilder::new()
        .initial_size(400)
        .max_cycles(10)
        .shards(4)
        .seed(77)
}

#[test]
fn test_panicking_sink_aborts_run() {
    let mut sim = builder()
        .sink(Arc::new(FailingSink { shard: 2, cycle: 1 }))
        .build()
        .unwrap();

    // cycles 0 and 1 complete; cycle 2 flushes the cells of cycle 1
    assert!(matches!(sim.step().unwrap(), CycleOutcome::Continue(_)));
    assert!(matches!(sim.step().unwrap(), CycleOutcome::Continue(_)));

    match sim.step() {
        Err(SimulationError::WorkerFailed {
            shard,
            cycle,
            reason,
        }) => {
            assert_eq!(shard, 2);
            assert_eq!(cycle, 2);
            assert!(reason.contains("sink refused shard 2"));
        }
        other => panic!("expected a worker failure, got {other:?}"),
    }

    assert!(sim.is_finished());
    assert!(matches!(sim.step(), Err(SimulationError::Aborted)));
    assert!(sim.summary().is_none());
    // the failed cycle was never aggregated
    assert_eq!(sim.statistics().history().len(), 2);
}

#[test]
fn test_panicking_hook_aborts_run() {
    let mut sim = builder()
        .hooks(Arc::new(FailingHooks { shard: 0 }))
        .build()
        .unwrap();

    let err = sim.run().unwrap_err();
    assert!(matches!(
        err,
        SimulationError::WorkerFailed { shard: 0, cycle: 0, .. }
    ));
    assert!(matches!(sim.run(), Err(SimulationError::Aborted)));
}

#[test]
fn test_healthy_shards_keep_flushing_until_failure() {
    let memory = Arc::new(MemorySink::new());
    let mut sim = builder().sink(memory.clone()).build().unwrap();
    sim.step().unwrap();
    sim.step().unwrap();
    // cycle 1 flushed cycle 0 from every shard
    let records = memory.records();
    let shards: std::collections::BTreeSet<_> = records.iter().map(|r| r.shard).collect();
    assert_eq!(shards.len(), 4);
    assert!(records.iter().all(|r| r.cycle == 0));
}
