//! Commonly used imports for convenience.
//!
//! This prelude module provides a convenient way to import the most commonly
//! used types and traits in the clonevo library.
//!
//! # Example
//!
//! ```
//! use clonevo_sim::prelude::*;
//!
//! let mut sim = SimulationBuilder::new()
//!     .initial_size(100)
//!     .max_cycles(5)
//!     .seed(1)
//!     .build()
//!     .unwrap();
//! let summary = sim.run().unwrap();
//! assert_eq!(summary.stop_reason, StopReason::MaxCycles);
//! ```

pub use crate::base::{Advantage, CellId, CloneId, IdGenerator};
pub use crate::errors::{ConfigError, SimulationError};
pub use crate::evolution::{DivisionKind, MutationModel};
pub use crate::genome::{GeneTable, Genome, GenomeArena, GenomeHalf, GenomeId};
pub use crate::simulation::{
    BalancingStrategy, Cell, CellPopulation, CellSink, Configuration, CycleOutcome, LoadBalancer,
    Observers, RunSummary, Simulation, SimulationBuilder, StopReason,
};
