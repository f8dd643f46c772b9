//! # Simulation Crate
//!
//! The `sim` crate provides the core of a clonal evolution simulator for
//! tumour cell populations. It includes modules for the structurally shared
//! genome store, the per-cell division and mutation decisions, the sharded
//! cell populations with their load balancers, and the coordinator that runs
//! them in parallel, cycle by cycle.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod genome;
pub mod prelude;
pub mod simulation;
