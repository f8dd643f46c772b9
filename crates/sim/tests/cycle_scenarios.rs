//! Integration tests for whole-run behaviour: reproducibility, conservation
//! under load balancing, structural sharing and repeated iterations.

use clonevo_sim::evolution::{draw_life_event, LifeEvent};
use clonevo_sim::genome::GenomeHalf;
use clonevo_sim::simulation::{
    BalancingStrategy, CellPopulation, Configuration, CycleOutcome, ExecutionConfig, GeneSource,
    MemorySink, MutationConfig, Observers, PopulationConfig, Simulation, SimulationBuilder,
    StopReason,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;

fn uniform_genes() -> GeneSource {
    GeneSource::Uniform {
        driver_genes: 10,
        driver_gene_size: 50,
        driver_advantage: 0.05,
        passenger_genes: 40,
        passenger_gene_size: 50,
        passenger_advantage: 0.001,
    }
}

fn config(shards: usize, initial: usize, cycles: u64, rate: f64, seed: u64) -> Configuration {
    Configuration::new(
        ExecutionConfig::new(shards, cycles, 1_000_000, Some(seed)),
        PopulationConfig::new(initial),
        MutationConfig::new(rate, uniform_genes()),
    )
}

/// Replay one neutral cycle of a shard of founders from its seed.
fn replay_neutral_shard(seed: u64, cells: usize, capacity: f64) -> i64 {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let death = cells as f64 / capacity;
    let mut delta = 0;
    for _ in 0..cells {
        match draw_life_event(1.0, death, &mut rng) {
            LifeEvent::Division => {
                // mutation-kind draw, always clean at rate 0
                let _: f64 = rng.random();
                delta += 1;
            }
            LifeEvent::Death => delta -= 1,
        }
    }
    delta
}

#[test]
fn test_four_shards_one_neutral_cycle() {
    let seed = 20240601;
    let mut sim = Simulation::new(config(4, 1000, 1, 0.0, seed)).unwrap();

    let CycleOutcome::Continue(summary) = sim.step().unwrap() else {
        panic!("first cycle should advance the population");
    };

    // Shard generators are seeded from the master generator, one draw per shard.
    let mut master = Xoshiro256PlusPlus::seed_from_u64(seed);
    let expected: i64 = (0..4)
        .map(|_| replay_neutral_shard(master.random(), 250, 1000.0))
        .sum();

    assert_eq!(summary.delta.cells, expected);
    assert_eq!(summary.population as i64, 1000 + expected);
    assert_eq!(summary.delta.drivers + summary.delta.passengers, 0);

    // A neutral run never touches the arena.
    assert_eq!(sim.arena().genome_count(), 1);

    assert_eq!(
        sim.step().unwrap(),
        CycleOutcome::Finished(StopReason::MaxCycles)
    );
}

#[test]
fn test_death_pressure_uses_whole_capacity() {
    let sink = Arc::new(MemorySink::new());
    let observers = Observers::default().with_sink(sink.clone());
    // K defaults to the 1000 founders; each shard starts with 250
    let mut sim = Simulation::with_observers(config(4, 1000, 1, 0.0, 8), observers).unwrap();
    sim.run().unwrap();

    let records = sink.records();
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.cycle == 0));
    for record in &records {
        assert_eq!(record.death_probability, 0.25);
    }
}

#[test]
fn test_same_seed_reproduces_run() {
    let run = |seed| {
        Simulation::new(config(4, 400, 12, 0.05, seed))
            .unwrap()
            .run()
            .unwrap()
    };
    let a = run(7);
    let b = run(7);
    assert_eq!(a.history.len(), b.history.len());
    for (x, y) in a.history.iter().zip(&b.history) {
        assert_eq!(x.population, y.population);
        assert_eq!(x.delta, y.delta);
    }
    assert_eq!(a.genomes, b.genomes);
}

#[test]
fn test_population_conserved_for_every_balancer() {
    for strategy in BalancingStrategy::ALL {
        let mut sim = SimulationBuilder::new()
            .initial_size(600)
            .max_cycles(10)
            .shards(4)
            .seed(11)
            .mutation_rate(0.1)
            .uniform_genes(5, 20, 0.2, 20, 20, 0.01)
            .balancing(strategy)
            .build()
            .unwrap();

        while let CycleOutcome::Continue(summary) = sim.step().unwrap() {
            let alive: usize = sim.shards().iter().map(CellPopulation::alive_count).sum();
            assert_eq!(alive, summary.population, "{strategy}");
        }
    }
}

#[test]
fn test_mutation_accounting_matches_arena() {
    let mut sim = Simulation::new(config(3, 300, 6, 0.5, 99)).unwrap();
    let summary = sim.run().unwrap();

    let mutations = summary.driver_mutations + summary.passenger_mutations;
    assert!(mutations > 0);
    // one genome per mutation event, plus the root
    assert_eq!(summary.genomes as u64, mutations + 1);
    assert_eq!(
        sim.arena().part_count(GenomeHalf::Driver) as u64,
        summary.driver_mutations + 1
    );
    assert_eq!(
        sim.arena().part_count(GenomeHalf::Passenger) as u64,
        summary.passenger_mutations + 1
    );
}

#[test]
fn test_sink_sees_every_cycle() {
    let sink = Arc::new(MemorySink::new());
    let observers = Observers::default().with_sink(sink.clone());
    let mut sim = Simulation::with_observers(config(2, 100, 4, 0.0, 5), observers).unwrap();
    let summary = sim.run().unwrap();
    assert_eq!(summary.cycles, 4);

    let records = sink.records();
    for cycle in 0..4 {
        // dead cells of the cycle are flushed too, before cleanup
        let alive = records
            .iter()
            .filter(|r| r.cycle == cycle && r.alive)
            .count();
        assert_eq!(alive, summary.history[cycle as usize].population);
    }
    assert!(records.iter().all(|r| r.cycle >= 0 && r.cycle < 4));
}

#[test]
fn test_extinction_stops_run() {
    // Capacity far below the founders: death dominates until nothing is left.
    let mut c = config(2, 200, 10_000, 0.0, 1);
    c.population.carrying_capacity = Some(1);
    let summary = Simulation::new(c).unwrap().run().unwrap();
    assert_eq!(summary.stop_reason, StopReason::Extinct);
    assert_eq!(summary.final_population, 0);
    assert!(summary.cycles < 10_000);
}

#[test]
fn test_ceiling_stops_growing_run() {
    let mut c = config(2, 100, 10_000, 0.0, 3);
    c.population.carrying_capacity = Some(100_000);
    c.execution.max_cells = 1_000;
    let summary = Simulation::new(c).unwrap().run().unwrap();
    assert_eq!(summary.stop_reason, StopReason::CellCeiling);
    assert!(summary.final_population >= 1_000);
}

#[test]
fn test_iterations_are_independent() {
    let mut c = config(2, 100, 5, 0.1, 500);
    c.execution.iterations = 3;
    let runs = Simulation::run_iterations(&c, Observers::default()).unwrap();
    assert_eq!(runs.len(), 3);

    // Iteration 1 of base seed 500 is the same run as iteration 0 of seed 501.
    let single = Simulation::seeded(c.clone(), 501, 0, Observers::default())
        .unwrap()
        .run()
        .unwrap();
    let trajectory = |s: &clonevo_sim::simulation::RunSummary| {
        s.history
            .iter()
            .map(|h| (h.population, h.delta))
            .collect::<Vec<_>>()
    };
    assert_eq!(trajectory(&runs[1]), trajectory(&single));
    assert_eq!(runs[1].seed, 501);
}
