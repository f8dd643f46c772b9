use clap::Args;
use std::path::PathBuf;

use crate::defaults;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output configuration path
    #[arg(short, long, default_value = defaults::OUTPUT_CONFIG)]
    pub output: PathBuf,

    /// Number of shards (one worker thread each)
    #[arg(short = 's', long, default_value_t = defaults::SHARDS)]
    pub shards: usize,

    /// Number of founder cells
    #[arg(short = 'n', long, default_value_t = defaults::INITIAL_SIZE)]
    pub initial_size: usize,

    /// Carrying capacity of the whole population
    ///
    /// Defaults to the initial size.
    #[arg(short = 'k', long)]
    pub carrying_capacity: Option<usize>,

    /// Number of cycles to run
    #[arg(short = 'c', long, default_value_t = defaults::MAX_CYCLES)]
    pub max_cycles: u64,

    /// Stop once the population reaches this many cells
    #[arg(long, default_value_t = defaults::MAX_CELLS)]
    pub max_cells: usize,

    /// Independent repetitions of the run
    #[arg(short = 'i', long, default_value_t = defaults::ITERATIONS)]
    pub iterations: usize,

    /// Probability that a division carries one mutation
    #[arg(short = 'm', long, default_value_t = defaults::MUTATION_RATE)]
    pub mutation_rate: f64,

    /// Mutation-advantage table (gene,kind,size,advantage)
    ///
    /// Replaces the uniform gene layout below.
    #[arg(
        long,
        conflicts_with_all = [
            "driver_genes", "driver_gene_size", "driver_advantage",
            "passenger_genes", "passenger_gene_size", "passenger_advantage",
        ]
    )]
    pub gene_table: Option<PathBuf>,

    /// Number of driver genes
    #[arg(long, default_value_t = defaults::DRIVER_GENES)]
    pub driver_genes: u32,

    /// Loci per driver gene
    #[arg(long, default_value_t = defaults::DRIVER_GENE_SIZE)]
    pub driver_gene_size: u32,

    /// Advantage of a driver mutation
    #[arg(long, default_value_t = defaults::DRIVER_ADVANTAGE)]
    pub driver_advantage: f64,

    /// Number of passenger genes
    #[arg(long, default_value_t = defaults::PASSENGER_GENES)]
    pub passenger_genes: u32,

    /// Loci per passenger gene
    #[arg(long, default_value_t = defaults::PASSENGER_GENE_SIZE)]
    pub passenger_gene_size: u32,

    /// Advantage of a passenger mutation
    #[arg(long, default_value_t = defaults::PASSENGER_ADVANTAGE)]
    pub passenger_advantage: f64,

    /// Load balancing strategy (none, greedy, cell-count, duty-cycle)
    #[arg(short, long, default_value = defaults::BALANCER)]
    pub balancer: String,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file written by `clonevo init`
    #[arg(short, long, default_value = defaults::OUTPUT_CONFIG)]
    pub config: PathBuf,

    /// Override random seed (default: use configured seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override load balancing strategy
    #[arg(short, long)]
    pub balancer: Option<String>,

    /// Override number of iterations
    #[arg(short, long)]
    pub iterations: Option<usize>,

    /// Write the run summaries as JSON
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Print per-shard step timings after each iteration
    #[arg(long)]
    pub timings: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,
}
