//! Stochastic decisions made for every cell in every cycle.
//!
//! - **Life tick**: divide or die, weighted by division and death probabilities
//! - **Mutation**: whether a division is clean or carries a driver or passenger hit

pub mod lifecycle;
pub mod mutation;

pub use lifecycle::{death_probability, draw_life_event, life_tick, LifeEvent};
pub use mutation::{DivisionKind, MutationModel};
