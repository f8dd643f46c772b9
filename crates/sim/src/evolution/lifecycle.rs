//! Life-tick decisions: does a cell divide or die this cycle?

use crate::base::safe_ratio;
use rand::Rng;

/// Outcome of a single life tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeEvent {
    Division,
    Death,
}

/// Resolve a life tick from a uniform draw `u` in `[0, 1)`.
///
/// The two outcomes are weighted by `division` and `death` without
/// normalising them first: with `limit = division + death`, the cell divides
/// when `u * limit <= division` and dies otherwise. The comparison is kept in
/// exactly this form so a fixed seed reproduces the same events.
#[inline]
pub fn life_tick(division: f64, death: f64, u: f64) -> LifeEvent {
    let limit = division + death;
    if u * limit <= division {
        LifeEvent::Division
    } else {
        LifeEvent::Death
    }
}

/// Draw `u` from `rng` and resolve a life tick.
#[inline]
pub fn draw_life_event<R: Rng + ?Sized>(division: f64, death: f64, rng: &mut R) -> LifeEvent {
    life_tick(division, death, rng.random::<f64>())
}

/// Density-dependent death probability.
///
/// `population_at_start / capacity`, or the gain fallback when the capacity
/// is zero.
#[inline]
pub fn death_probability(population_at_start: usize, capacity: f64) -> f64 {
    safe_ratio(population_at_start as f64, capacity)
}
