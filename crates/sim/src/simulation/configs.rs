//! Run configuration.
//!
//! A [`Configuration`] fully describes a run and round-trips through JSON,
//! so a saved file reproduces the same setup (and, with a fixed seed, the
//! same trajectory).

use crate::errors::ConfigError;
use crate::evolution::MutationModel;
use crate::genome::GeneTable;
use crate::simulation::BalancingStrategy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The master configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub execution: ExecutionConfig,
    pub population: PopulationConfig,
    pub mutation: MutationConfig,
}

/// How the run is executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Number of shards, and of worker threads.
    pub shards: usize,
    /// Cycles to run before stopping.
    pub max_cycles: u64,
    /// Stop once the global population reaches this many cells.
    pub max_cells: usize,
    /// Independent repetitions of the run.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Optional RNG seed for reproducibility.
    pub seed: Option<u64>,
    #[serde(default)]
    pub balancing: BalancingStrategy,
}

fn default_iterations() -> usize {
    1
}

impl ExecutionConfig {
    pub fn new(shards: usize, max_cycles: u64, max_cells: usize, seed: Option<u64>) -> Self {
        Self {
            shards,
            max_cycles,
            max_cells,
            iterations: default_iterations(),
            seed,
            balancing: BalancingStrategy::default(),
        }
    }

    pub fn with_balancing(mut self, balancing: BalancingStrategy) -> Self {
        self.balancing = balancing;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// The configured seed, or a fresh one from OS entropy.
    pub fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(|| rand::rng().random())
    }
}

/// The seeded population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Founder cells, spread evenly over the shards.
    pub initial_size: usize,
    /// Carrying capacity K of the whole population; the initial size if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrying_capacity: Option<usize>,
}

impl PopulationConfig {
    pub fn new(initial_size: usize) -> Self {
        Self {
            initial_size,
            carrying_capacity: None,
        }
    }

    pub fn with_carrying_capacity(mut self, capacity: usize) -> Self {
        self.carrying_capacity = Some(capacity);
        self
    }

    #[inline]
    pub fn carrying_capacity(&self) -> usize {
        self.carrying_capacity.unwrap_or(self.initial_size)
    }
}

/// Mutation rate and the genes mutations land in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Probability that a division carries one mutation.
    pub mutation_rate: f64,
    pub genes: GeneSource,
}

impl MutationConfig {
    pub fn new(mutation_rate: f64, genes: GeneSource) -> Self {
        Self {
            mutation_rate,
            genes,
        }
    }
}

/// Where the driver and passenger gene layouts come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum GeneSource {
    /// Identical genes on each half.
    Uniform {
        driver_genes: u32,
        driver_gene_size: u32,
        driver_advantage: f64,
        passenger_genes: u32,
        passenger_gene_size: u32,
        passenger_advantage: f64,
    },
    /// An external mutation-advantage table.
    Table { path: PathBuf },
}

impl GeneSource {
    pub fn gene_table(&self) -> Result<GeneTable, ConfigError> {
        match self {
            Self::Uniform {
                driver_genes,
                driver_gene_size,
                driver_advantage,
                passenger_genes,
                passenger_gene_size,
                passenger_advantage,
            } => GeneTable::uniform(
                *driver_genes,
                *driver_gene_size,
                *driver_advantage,
                *passenger_genes,
                *passenger_gene_size,
                *passenger_advantage,
            ),
            Self::Table { path } => GeneTable::from_file(path),
        }
    }
}

impl Configuration {
    pub fn new(
        execution: ExecutionConfig,
        population: PopulationConfig,
        mutation: MutationConfig,
    ) -> Self {
        Self {
            execution,
            population,
            mutation,
        }
    }

    /// Check every parameter and build the mutation model.
    ///
    /// This loads the mutation-advantage table if one is configured, so a
    /// missing or malformed table is reported here, before any cycle runs.
    pub fn resolve_model(&self) -> Result<(GeneTable, MutationModel), ConfigError> {
        let exec = &self.execution;
        if exec.shards == 0 {
            return Err(ConfigError::InvalidParameter(
                "shards must be at least 1".into(),
            ));
        }
        if exec.iterations == 0 {
            return Err(ConfigError::InvalidParameter(
                "iterations must be at least 1".into(),
            ));
        }
        if exec.max_cells == 0 {
            return Err(ConfigError::InvalidParameter(
                "max_cells must be at least 1".into(),
            ));
        }
        if self.population.initial_size == 0 {
            return Err(ConfigError::InvalidParameter(
                "initial_size must be at least 1".into(),
            ));
        }
        if self.population.carrying_capacity == Some(0) {
            return Err(ConfigError::InvalidParameter(
                "carrying_capacity must be at least 1".into(),
            ));
        }

        let genes = self.mutation.genes.gene_table()?;
        let model = MutationModel::from_rate(self.mutation.mutation_rate, &genes)?;
        Ok((genes, model))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve_model().map(|_| ())
    }

    /// Carrying capacity K that every shard's start-of-cycle population is
    /// measured against. It is not split across shards.
    pub fn capacity(&self) -> f64 {
        self.population.carrying_capacity() as f64
    }

    /// Founders per shard; the first `initial_size % shards` shards get one extra.
    pub fn founders_per_shard(&self) -> Vec<usize> {
        let shards = self.execution.shards.max(1);
        let base = self.population.initial_size / shards;
        let extra = self.population.initial_size % shards;
        (0..shards).map(|i| base + usize::from(i < extra)).collect()
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_string()?).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
