//! Builder pattern for creating simulations.
//!
//! Provides a fluent API for configuring and creating simulations with
//! sensible defaults and validation.

use crate::errors::{ConfigError, SimulationError};
use crate::simulation::{
    BalancingStrategy, BenchmarkHooks, CellSink, Configuration, ExecutionConfig, GeneSource,
    LoadBalancer, MutationConfig, Observers, PopulationConfig, Simulation,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for constructing [`Simulation`] instances with a fluent API.
///
/// # Examples
///
/// ```
/// use clonevo_sim::simulation::{BalancingStrategy, SimulationBuilder};
///
/// let mut sim = SimulationBuilder::new()
///     .initial_size(200)
///     .max_cycles(20)
///     .shards(2)
///     .mutation_rate(0.01)
///     .uniform_genes(10, 100, 0.1, 50, 100, 0.001)
///     .balancing(BalancingStrategy::EqualizeCellCount)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let summary = sim.run().unwrap();
/// assert!(summary.cycles <= 20);
/// ```
pub struct SimulationBuilder {
    // Required parameters
    initial_size: Option<usize>,
    max_cycles: Option<u64>,

    // Execution (with defaults)
    shards: usize,                 // Default: 1
    max_cells: usize,              // Default: no ceiling
    iterations: usize,             // Default: 1
    seed: Option<u64>,             // Default: None (random)
    balancing: BalancingStrategy,  // Default: greedy fill-empty

    carrying_capacity: Option<usize>, // Default: initial size
    mutation_rate: f64,               // Default: 0.0 (no mutation)
    genes: Option<GeneSource>,        // Required when mutation_rate > 0

    balancer: Option<Box<dyn LoadBalancer>>,
    observers: Observers,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    /// Create a new simulation builder with default values.
    pub fn new() -> Self {
        Self {
            initial_size: None,
            max_cycles: None,
            shards: 1,
            max_cells: usize::MAX,
            iterations: 1,
            seed: None,
            balancing: BalancingStrategy::default(),
            carrying_capacity: None,
            mutation_rate: 0.0,
            genes: None,
            balancer: None,
            observers: Observers::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: Configuration) -> Self {
        Self {
            initial_size: Some(config.population.initial_size),
            max_cycles: Some(config.execution.max_cycles),
            shards: config.execution.shards,
            max_cells: config.execution.max_cells,
            iterations: config.execution.iterations,
            seed: config.execution.seed,
            balancing: config.execution.balancing,
            carrying_capacity: config.population.carrying_capacity,
            mutation_rate: config.mutation.mutation_rate,
            genes: Some(config.mutation.genes),
            balancer: None,
            observers: Observers::default(),
        }
    }

    /// Number of founder cells (required).
    pub fn initial_size(mut self, size: usize) -> Self {
        self.initial_size = Some(size);
        self
    }

    /// Number of cycles to run (required).
    pub fn max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Stop once the population reaches `cells`.
    pub fn max_cells(mut self, cells: usize) -> Self {
        self.max_cells = cells;
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn carrying_capacity(mut self, capacity: usize) -> Self {
        self.carrying_capacity = Some(capacity);
        self
    }

    pub fn mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Identical genes on each genome half.
    pub fn uniform_genes(
        mut self,
        driver_genes: u32,
        driver_gene_size: u32,
        driver_advantage: f64,
        passenger_genes: u32,
        passenger_gene_size: u32,
        passenger_advantage: f64,
    ) -> Self {
        self.genes = Some(GeneSource::Uniform {
            driver_genes,
            driver_gene_size,
            driver_advantage,
            passenger_genes,
            passenger_gene_size,
            passenger_advantage,
        });
        self
    }

    /// Genes from a mutation-advantage table on disk.
    pub fn gene_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.genes = Some(GeneSource::Table { path: path.into() });
        self
    }

    /// One of the built-in balancing strategies.
    pub fn balancing(mut self, strategy: BalancingStrategy) -> Self {
        self.balancing = strategy;
        self.balancer = None;
        self
    }

    /// A custom load balancer; not recorded in the configuration.
    pub fn balancer(mut self, balancer: Box<dyn LoadBalancer>) -> Self {
        self.balancer = Some(balancer);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn CellSink>) -> Self {
        self.observers = self.observers.with_sink(sink);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn BenchmarkHooks>) -> Self {
        self.observers = self.observers.with_hooks(hooks);
        self
    }

    /// Assemble and validate the configuration.
    pub fn build_config(&self) -> Result<Configuration, ConfigError> {
        let initial_size = self
            .initial_size
            .ok_or(ConfigError::MissingRequired("initial_size"))?;
        let max_cycles = self
            .max_cycles
            .ok_or(ConfigError::MissingRequired("max_cycles"))?;

        let genes = match &self.genes {
            Some(genes) => genes.clone(),
            None if self.mutation_rate > 0.0 => return Err(ConfigError::MissingRequired("genes")),
            // Never mutated; one neutral locus per half keeps the layout valid.
            None => GeneSource::Uniform {
                driver_genes: 1,
                driver_gene_size: 1,
                driver_advantage: 0.0,
                passenger_genes: 1,
                passenger_gene_size: 1,
                passenger_advantage: 0.0,
            },
        };

        let mut population = PopulationConfig::new(initial_size);
        population.carrying_capacity = self.carrying_capacity;

        let config = Configuration::new(
            ExecutionConfig::new(self.shards, max_cycles, self.max_cells, self.seed)
                .with_iterations(self.iterations)
                .with_balancing(self.balancing),
            population,
            MutationConfig::new(self.mutation_rate, genes),
        );
        config.validate()?;
        Ok(config)
    }

    /// Build the simulation.
    pub fn build(self) -> Result<Simulation, SimulationError> {
        let config = self.build_config()?;
        match self.balancer {
            Some(balancer) => {
                let seed = config.execution.seed_or_random();
                Simulation::assemble(config, seed, 0, self.observers, balancer)
            }
            None => Simulation::with_observers(config, self.observers),
        }
    }
}
