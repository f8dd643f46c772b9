//! Base building blocks shared by the rest of the crate.
//!
//! This module provides the lock-free paged arena that backs genome storage,
//! the multiplicative advantage arithmetic with its defined fallbacks, and
//! the per-simulation id generator.

mod arena;
pub mod fitness;
mod ids;

pub use arena::PagedArena;
pub use fitness::{driver_passenger_ratio, safe_ratio, Advantage, GAIN_FALLBACK};
pub use ids::{CellId, CloneId, IdGenerator};
