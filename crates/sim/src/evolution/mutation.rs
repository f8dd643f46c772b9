//! Mutation-type decision made at every division.
//!
//! A dividing cell hands its daughter either the same genome (a clean
//! division) or a genome with one new driver or passenger mutation. The
//! per-division mutation rate is split between the two halves in proportion
//! to their widths, so a wide passenger region soaks up most hits.

use crate::errors::ConfigError;
use crate::genome::{GeneTable, GenomeHalf};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What a division does to the daughter's genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivisionKind {
    /// The daughter shares the parent's genome index.
    Clean,
    /// One new passenger part; the driver half is shared.
    Passenger,
    /// One new driver part; the passenger half is shared.
    Driver,
}

impl DivisionKind {
    /// Genome half touched by this kind of division, if any.
    #[inline]
    pub fn half(self) -> Option<GenomeHalf> {
        match self {
            Self::Clean => None,
            Self::Passenger => Some(GenomeHalf::Passenger),
            Self::Driver => Some(GenomeHalf::Driver),
        }
    }
}

/// Probabilities of the three division kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationModel {
    passenger: f64,
    driver: f64,
    none: f64,
}

impl MutationModel {
    /// Create a model from explicit outcome weights.
    ///
    /// # Errors
    /// Returns an error if any weight is negative or not finite, or if all
    /// three are zero.
    pub fn new(passenger: f64, driver: f64, none: f64) -> Result<Self, ConfigError> {
        for (name, p) in [("passenger", passenger), ("driver", driver), ("none", none)] {
            if !p.is_finite() || p < 0.0 {
                return Err(ConfigError::InvalidParameter(format!(
                    "{name} mutation probability {p} must be finite and non-negative"
                )));
            }
        }
        if passenger + driver + none <= 0.0 {
            return Err(ConfigError::InvalidParameter(
                "mutation probabilities sum to zero".into(),
            ));
        }
        Ok(Self {
            passenger,
            driver,
            none,
        })
    }

    /// Split a per-division mutation rate over both halves by width.
    pub fn from_rate(rate: f64, genes: &GeneTable) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidParameter(format!(
                "mutation rate {rate} must be in [0, 1]"
            )));
        }
        let driver_width = genes.region(GenomeHalf::Driver).width() as f64;
        let passenger_width = genes.region(GenomeHalf::Passenger).width() as f64;
        let total = driver_width + passenger_width;
        if total == 0.0 {
            return Ok(Self::none());
        }
        Self::new(
            rate * passenger_width / total,
            rate * driver_width / total,
            1.0 - rate,
        )
    }

    /// Every division is clean.
    pub fn none() -> Self {
        Self {
            passenger: 0.0,
            driver: 0.0,
            none: 1.0,
        }
    }

    #[inline]
    pub fn passenger_probability(&self) -> f64 {
        self.passenger
    }

    #[inline]
    pub fn driver_probability(&self) -> f64 {
        self.driver
    }

    #[inline]
    pub fn no_mutation_probability(&self) -> f64 {
        self.none
    }

    /// Resolve the division kind from a uniform draw `u` in `[0, 1)`.
    ///
    /// Outcomes are tested in the order passenger, driver, clean against the
    /// cumulative weights scaled by `u`. An outcome with zero weight is never
    /// returned, including for `u == 0`.
    pub fn decide(&self, u: f64) -> DivisionKind {
        let limit = self.passenger + self.driver + self.none;
        let x = u * limit;
        if self.passenger > 0.0 && x <= self.passenger {
            DivisionKind::Passenger
        } else if self.driver > 0.0 && x <= self.passenger + self.driver {
            DivisionKind::Driver
        } else if self.none > 0.0 {
            DivisionKind::Clean
        } else if self.driver > 0.0 {
            DivisionKind::Driver
        } else {
            DivisionKind::Passenger
        }
    }

    /// Draw `u` from `rng` and resolve the division kind.
    #[inline]
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> DivisionKind {
        self.decide(rng.random::<f64>())
    }
}

impl Default for MutationModel {
    fn default() -> Self {
        Self::none()
    }
}
