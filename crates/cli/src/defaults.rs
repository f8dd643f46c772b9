//! Shared default values for simulation configuration.
//! These values back the `init` command's clap defaults.

pub const OUTPUT_CONFIG: &str = "clonevo.json";

pub const SHARDS: usize = 4;
pub const MAX_CYCLES: u64 = 500;
pub const MAX_CELLS: usize = 1_000_000;
pub const ITERATIONS: usize = 1;

pub const INITIAL_SIZE: usize = 1000;

pub const MUTATION_RATE: f64 = 0.01;

// Uniform gene layout; passenger loci outnumber driver loci.
pub const DRIVER_GENES: u32 = 100;
pub const DRIVER_GENE_SIZE: u32 = 1000;
pub const DRIVER_ADVANTAGE: f64 = 0.1;
pub const PASSENGER_GENES: u32 = 900;
pub const PASSENGER_GENE_SIZE: u32 = 1000;
pub const PASSENGER_ADVANTAGE: f64 = 0.001;

pub const BALANCER: &str = "greedy";
