//! Simulation coordinator.
//!
//! Runs the shards in lockstep supersteps: every cycle, one task per shard
//! is spawned on a dedicated worker pool, the tasks meet at a
//! [`CycleBarrier`] whose release action folds their reports into the live
//! statistics, and once the pool is idle again the load balancer runs
//! serially before the next cycle is submitted.

use crate::base::IdGenerator;
use crate::errors::SimulationError;
use crate::evolution::MutationModel;
use crate::genome::{GeneTable, GenomeArena};
use crate::simulation::{
    CellPopulation, Configuration, CycleBarrier, CycleContext, CycleSummary, LiveStatistics,
    LoadBalancer, Observers, RunSummary, ShardReport, StopReason,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Result of [`Simulation::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// A cycle advanced the population; more may follow.
    Continue(CycleSummary),
    /// The terminal cycle ran; no further cycles.
    Finished(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Running,
    Finished(StopReason),
    Aborted,
}

/// Main simulation engine.
pub struct Simulation {
    config: Configuration,
    genes: GeneTable,
    mutation: MutationModel,
    arena: GenomeArena,
    ids: IdGenerator,
    shards: Vec<CellPopulation>,
    balancer: Box<dyn LoadBalancer>,
    observers: Observers,
    pool: rayon::ThreadPool,
    barrier: CycleBarrier,
    stats: Mutex<LiveStatistics>,
    rng: Xoshiro256PlusPlus,
    seed: u64,
    iteration: usize,
    cycle: i64,
    state: RunState,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

impl Simulation {
    /// Create a simulation from a configuration, without observers.
    pub fn new(config: Configuration) -> Result<Self, SimulationError> {
        Self::with_observers(config, Observers::default())
    }

    /// Create a simulation that reports to `observers`.
    ///
    /// The seed is the configured one, or drawn from OS entropy.
    pub fn with_observers(
        config: Configuration,
        observers: Observers,
    ) -> Result<Self, SimulationError> {
        let seed = config.execution.seed_or_random();
        Self::seeded(config, seed, 0, observers)
    }

    /// Create iteration `iteration` of a run whose base seed is `seed`.
    ///
    /// The iteration's generator is seeded with `seed + iteration`.
    pub fn seeded(
        config: Configuration,
        seed: u64,
        iteration: usize,
        observers: Observers,
    ) -> Result<Self, SimulationError> {
        let balancer = config.execution.balancing.balancer();
        Self::assemble(config, seed, iteration, observers, balancer)
    }

    pub(crate) fn assemble(
        config: Configuration,
        seed: u64,
        iteration: usize,
        observers: Observers,
        balancer: Box<dyn LoadBalancer>,
    ) -> Result<Self, SimulationError> {
        let (genes, mutation) = config.resolve_model()?;
        let shard_count = config.execution.shards;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(shard_count)
            .thread_name(|i| format!("clonevo-shard-{i}"))
            .build()
            .map_err(|e| SimulationError::ThreadPool(e.to_string()))?;

        let ids = IdGenerator::new();
        let shards: Vec<CellPopulation> = config
            .founders_per_shard()
            .into_iter()
            .enumerate()
            .map(|(i, n)| CellPopulation::seeded(i, n, &ids))
            .collect();

        let run_seed = seed.wrapping_add(iteration as u64);
        tracing::info!(
            iteration,
            seed = run_seed,
            shards = shard_count,
            initial = config.population.initial_size,
            balancer = balancer.name(),
            "simulation created"
        );

        Ok(Self {
            stats: Mutex::new(LiveStatistics::new(config.population.initial_size)),
            barrier: CycleBarrier::new(shard_count),
            rng: Xoshiro256PlusPlus::seed_from_u64(run_seed),
            arena: GenomeArena::new(),
            config,
            genes,
            mutation,
            ids,
            shards,
            balancer,
            observers,
            pool,
            seed: run_seed,
            iteration,
            cycle: 0,
            state: RunState::Running,
        })
    }

    /// Run every configured iteration to completion.
    ///
    /// Iterations are independent: each gets a fresh arena, id generator and
    /// set of shards. With no configured seed one base seed is drawn for all.
    pub fn run_iterations(
        config: &Configuration,
        observers: Observers,
    ) -> Result<Vec<RunSummary>, SimulationError> {
        let base = config.execution.seed_or_random();
        (0..config.execution.iterations)
            .map(|i| Self::seeded(config.clone(), base, i, observers.clone())?.run())
            .collect()
    }

    #[inline]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Index of the next cycle to run.
    #[inline]
    pub fn cycle(&self) -> i64 {
        self.cycle
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    #[inline]
    pub fn arena(&self) -> &GenomeArena {
        &self.arena
    }

    #[inline]
    pub fn genes(&self) -> &GeneTable {
        &self.genes
    }

    #[inline]
    pub fn shards(&self) -> &[CellPopulation] {
        &self.shards
    }

    pub fn statistics(&self) -> LiveStatistics {
        lock(&self.stats).clone()
    }

    /// Living cells across all shards after the last cycle.
    pub fn population(&self) -> usize {
        lock(&self.stats).population()
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.state, RunState::Running)
    }

    fn stop_reason(&self) -> Option<StopReason> {
        let population = self.population();
        if self.cycle as u64 >= self.config.execution.max_cycles {
            Some(StopReason::MaxCycles)
        } else if population >= self.config.execution.max_cells {
            Some(StopReason::CellCeiling)
        } else if population == 0 {
            Some(StopReason::Extinct)
        } else {
            None
        }
    }

    /// Run one superstep.
    ///
    /// If a stop condition holds, this is the terminal cycle: every shard
    /// flushes its cells and [`CycleOutcome::Finished`] is returned. Any
    /// further call returns the same outcome.
    ///
    /// # Errors
    /// A failing or panicking shard aborts the whole run with
    /// [`SimulationError::WorkerFailed`]; later calls return
    /// [`SimulationError::Aborted`].
    pub fn step(&mut self) -> Result<CycleOutcome, SimulationError> {
        match self.state {
            RunState::Running => {}
            RunState::Finished(reason) => return Ok(CycleOutcome::Finished(reason)),
            RunState::Aborted => return Err(SimulationError::Aborted),
        }

        let stop = self.stop_reason();
        let cycle = self.cycle;
        let seeds: Vec<u64> = (0..self.shards.len()).map(|_| self.rng.random()).collect();

        let ctx = CycleContext {
            cycle,
            is_final: stop.is_some(),
            capacity: self.config.capacity(),
            arena: &self.arena,
            genes: &self.genes,
            mutation: &self.mutation,
            ids: &self.ids,
            sink: self.observers.sink.as_ref(),
        };
        let hooks = self.observers.hooks.as_ref();
        let barrier = &self.barrier;
        let stats = &self.stats;
        let pending: Mutex<Vec<Option<ShardReport>>> =
            Mutex::new((0..self.shards.len()).map(|_| None).collect());
        let failure: Mutex<Option<SimulationError>> = Mutex::new(None);

        let fail = |err: SimulationError| {
            lock(&failure).get_or_insert(err);
            barrier.poison();
        };

        let shards = &mut self.shards;
        self.pool.scope(|scope| {
            for (shard, seed) in shards.iter_mut().zip(seeds) {
                let ctx = &ctx;
                let pending = &pending;
                let fail = &fail;
                scope.spawn(move |_| {
                    // another shard already failed this cycle
                    if barrier.is_poisoned() {
                        return;
                    }
                    let index = shard.index();
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        hooks.shard_started(index, cycle);
                        let started = Instant::now();
                        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                        let outcome = shard.run_cycle(ctx, &mut rng);
                        let elapsed = started.elapsed();
                        shard.set_cycle_duration(elapsed);
                        hooks.shard_finished(index, cycle, elapsed);
                        outcome.map(|report| ShardReport {
                            duration: elapsed,
                            ..report
                        })
                    }));

                    let report = match result {
                        Ok(Ok(report)) => report,
                        Ok(Err(err)) => {
                            return fail(SimulationError::WorkerFailed {
                                shard: index,
                                cycle,
                                reason: err.to_string(),
                            });
                        }
                        Err(payload) => {
                            return fail(SimulationError::WorkerFailed {
                                shard: index,
                                cycle,
                                reason: panic_message(&*payload),
                            });
                        }
                    };
                    lock(pending)[index] = Some(report);

                    let arrival = panic::catch_unwind(AssertUnwindSafe(|| {
                        barrier.wait_then(|| {
                            let reports: Vec<ShardReport> =
                                lock(pending).iter_mut().filter_map(Option::take).collect();
                            if reports.iter().any(|r| !r.finished) {
                                lock(stats).record(cycle, &reports);
                            }
                        })
                    }));
                    if let Err(payload) = arrival {
                        fail(SimulationError::WorkerFailed {
                            shard: index,
                            cycle,
                            reason: panic_message(&*payload),
                        });
                    }
                });
            }
        });

        if let Some(err) = failure.into_inner().unwrap_or_else(PoisonError::into_inner) {
            self.state = RunState::Aborted;
            tracing::warn!(cycle, error = %err, "cycle aborted");
            return Err(err);
        }
        if self.barrier.is_poisoned() {
            self.state = RunState::Aborted;
            tracing::warn!(cycle, "cycle skipped on a poisoned barrier");
            return Err(SimulationError::Aborted);
        }

        if let Some(reason) = stop {
            self.state = RunState::Finished(reason);
            let stats = lock(&self.stats);
            if reason == StopReason::CellCeiling {
                tracing::warn!(cycle, population = stats.population(), "cell ceiling reached");
            }
            tracing::info!(
                iteration = self.iteration,
                cycles = cycle,
                population = stats.population(),
                %reason,
                "simulation finished"
            );
            return Ok(CycleOutcome::Finished(reason));
        }

        let summary = lock(&self.stats)
            .last()
            .cloned()
            .ok_or(SimulationError::Aborted)?;
        tracing::debug!(
            cycle,
            population = summary.population,
            delta = summary.delta.cells,
            drivers = summary.delta.drivers,
            passengers = summary.delta.passengers,
            "cycle complete"
        );

        self.balancer.rebalance(&mut self.shards);
        self.cycle += 1;
        Ok(CycleOutcome::Continue(summary))
    }

    /// Step until the run finishes and summarise it.
    pub fn run(&mut self) -> Result<RunSummary, SimulationError> {
        loop {
            if let CycleOutcome::Finished(_) = self.step()? {
                break;
            }
        }
        self.summary().ok_or(SimulationError::Aborted)
    }

    /// Summary of a finished run; `None` while cycles remain.
    pub fn summary(&self) -> Option<RunSummary> {
        let RunState::Finished(stop_reason) = self.state else {
            return None;
        };
        let stats = lock(&self.stats);
        Some(RunSummary {
            iteration: self.iteration,
            seed: self.seed,
            cycles: self.cycle as u64,
            stop_reason,
            final_population: stats.population(),
            driver_mutations: stats.driver_mutations(),
            passenger_mutations: stats.passenger_mutations(),
            genomes: self.arena.genome_count(),
            history: stats.history().to_vec(),
        })
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("seed", &self.seed)
            .field("iteration", &self.iteration)
            .field("cycle", &self.cycle)
            .field("shards", &self.shards.len())
            .field("balancer", &self.balancer.name())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{
        BalancingStrategy, ExecutionConfig, GeneSource, MemorySink, MutationConfig,
        PopulationConfig,
    };
    use crate::simulation::BenchmarkHooks;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingHooks {
        started: AtomicUsize,
    }

    impl BenchmarkHooks for CountingHooks {
        fn shard_started(&self, _shard: usize, _cycle: i64) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn config(shards: usize, initial: usize, cycles: u64, rate: f64) -> Configuration {
        Configuration::new(
            ExecutionConfig::new(shards, cycles, 1_000_000, Some(42)),
            PopulationConfig::new(initial),
            MutationConfig::new(
                rate,
                GeneSource::Uniform {
                    driver_genes: 5,
                    driver_gene_size: 20,
                    driver_advantage: 0.05,
                    passenger_genes: 10,
                    passenger_gene_size: 20,
                    passenger_advantage: 0.001,
                },
            ),
        )
    }

    #[test]
    fn test_new_seeds_shards() {
        let sim = Simulation::new(config(4, 10, 5, 0.0)).unwrap();
        let sizes: Vec<_> = sim.shards().iter().map(CellPopulation::len).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
        assert_eq!(sim.population(), 10);
        assert_eq!(sim.seed(), 42);
        assert_eq!(sim.cycle(), 0);
    }

    #[test]
    fn test_invalid_config_never_starts() {
        let mut c = config(2, 10, 5, 0.0);
        c.execution.shards = 0;
        assert!(matches!(
            Simulation::new(c),
            Err(SimulationError::Config(_))
        ));
    }

    #[test]
    fn test_step_aggregates_once() {
        let mut sim = Simulation::new(config(4, 400, 10, 0.0)).unwrap();
        let CycleOutcome::Continue(summary) = sim.step().unwrap() else {
            panic!("expected a running cycle");
        };
        assert_eq!(summary.cycle, 0);
        assert_eq!(summary.population as i64, 400 + summary.delta.cells);
        assert_eq!(summary.shard_populations.iter().sum::<usize>(), summary.population);
        assert_eq!(sim.statistics().history().len(), 1);
        assert_eq!(sim.cycle(), 1);
    }

    #[test]
    fn test_run_stops_at_max_cycles() {
        let mut sim = Simulation::new(config(2, 50, 3, 0.05)).unwrap();
        let summary = sim.run().unwrap();
        assert_eq!(summary.stop_reason, StopReason::MaxCycles);
        assert_eq!(summary.cycles, 3);
        assert_eq!(summary.history.len(), 3);
        assert!(sim.is_finished());
        assert_eq!(sim.step().unwrap(), CycleOutcome::Finished(StopReason::MaxCycles));
    }

    #[test]
    fn test_zero_cycles_only_flushes_seeded_state() {
        let sink = Arc::new(MemorySink::new());
        let observers = Observers::default().with_sink(sink.clone());
        let mut sim = Simulation::with_observers(config(2, 8, 0, 0.0), observers).unwrap();
        let summary = sim.run().unwrap();
        assert_eq!(summary.cycles, 0);
        let records = sink.records();
        assert_eq!(records.len(), 8);
        assert!(records.iter().all(|r| r.cycle == -1));
    }

    #[test]
    fn test_ceiling_stops_run() {
        let mut c = config(2, 100, 1000, 0.0);
        c.execution.max_cells = 100;
        let summary = Simulation::new(c).unwrap().run().unwrap();
        assert_eq!(summary.stop_reason, StopReason::CellCeiling);
        assert_eq!(summary.cycles, 0);
    }

    #[test]
    fn test_same_seed_same_history() {
        let run = || {
            let mut c = config(3, 300, 8, 0.2);
            c.execution.balancing = BalancingStrategy::EqualizeCellCount;
            Simulation::new(c).unwrap().run().unwrap()
        };
        let a = run();
        let b = run();
        assert_eq!(a.final_population, b.final_population);
        assert_eq!(a.driver_mutations, b.driver_mutations);
        let pops = |s: &RunSummary| s.history.iter().map(|h| h.population).collect::<Vec<_>>();
        assert_eq!(pops(&a), pops(&b));
    }

    #[test]
    fn test_run_iterations_offsets_seed() {
        let mut c = config(2, 20, 2, 0.0);
        c.execution.iterations = 3;
        let runs = Simulation::run_iterations(&c, Observers::default()).unwrap();
        assert_eq!(runs.len(), 3);
        let seeds: Vec<_> = runs.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![42, 43, 44]);
        assert!(runs.iter().enumerate().all(|(i, r)| r.iteration == i));
    }

    #[test]
    fn test_poisoned_barrier_skips_shard_work() {
        let sink = Arc::new(MemorySink::new());
        let hooks = Arc::new(CountingHooks::default());
        let observers = Observers::default()
            .with_sink(sink.clone())
            .with_hooks(hooks.clone());
        let mut sim = Simulation::with_observers(config(4, 400, 10, 0.5), observers).unwrap();
        sim.step().unwrap();
        assert_eq!(hooks.started.load(Ordering::SeqCst), 4);
        let genomes = sim.arena.genome_count();
        let records = sink.records().len();

        sim.barrier.poison();
        assert!(matches!(sim.step(), Err(SimulationError::Aborted)));
        // no shard started, flushed or mutated after the poisoning
        assert_eq!(hooks.started.load(Ordering::SeqCst), 4);
        assert_eq!(sink.records().len(), records);
        assert_eq!(sim.arena.genome_count(), genomes);
        assert_eq!(sim.statistics().history().len(), 1);
        assert!(matches!(sim.step(), Err(SimulationError::Aborted)));
    }
}
