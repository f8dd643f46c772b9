use crate::base::{driver_passenger_ratio, safe_ratio, Advantage};
use crate::genome::{GenomeHalf, PartId};
use serde::{Deserialize, Serialize};

/// Arena index of a [`Genome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenomeId(pub usize);

impl GenomeId {
    /// The unmutated genome every founder cell starts from.
    pub const ROOT: Self = Self(0);
}

/// A genome: one driver lineage, one passenger lineage and the cached
/// cumulative fitness figures that follow from them.
///
/// Genomes are shared by every cell whose division chain produced them and
/// are identified only by their [`GenomeId`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    driver: PartId,
    passenger: PartId,
    driver_advantage: Advantage,
    passenger_advantage: Advantage,
    driver_mutations: u32,
    passenger_mutations: u32,
}

impl Genome {
    pub const ROOT: Self = Self {
        driver: PartId::ROOT,
        passenger: PartId::ROOT,
        driver_advantage: Advantage::NEUTRAL,
        passenger_advantage: Advantage::NEUTRAL,
        driver_mutations: 0,
        passenger_mutations: 0,
    };

    /// Derive the genome produced by one mutation in `half`.
    ///
    /// The untouched half keeps its part index; the mutated half points at
    /// `part`, its counter grows by one and its advantage is multiplied by
    /// `1 + gene_advantage`.
    pub fn with_mutation(&self, half: GenomeHalf, part: PartId, gene_advantage: f64) -> Self {
        let mut next = *self;
        match half {
            GenomeHalf::Driver => {
                next.driver = part;
                next.driver_mutations += 1;
                next.driver_advantage = self.driver_advantage.apply(gene_advantage);
            }
            GenomeHalf::Passenger => {
                next.passenger = part;
                next.passenger_mutations += 1;
                next.passenger_advantage = self.passenger_advantage.apply(gene_advantage);
            }
        }
        next
    }

    #[inline]
    pub fn part(&self, half: GenomeHalf) -> PartId {
        match half {
            GenomeHalf::Driver => self.driver,
            GenomeHalf::Passenger => self.passenger,
        }
    }

    #[inline]
    pub fn advantage(&self, half: GenomeHalf) -> Advantage {
        match half {
            GenomeHalf::Driver => self.driver_advantage,
            GenomeHalf::Passenger => self.passenger_advantage,
        }
    }

    #[inline]
    pub fn mutations(&self, half: GenomeHalf) -> u32 {
        match half {
            GenomeHalf::Driver => self.driver_mutations,
            GenomeHalf::Passenger => self.passenger_mutations,
        }
    }

    #[inline]
    pub fn total_driver_advantage(&self) -> f64 {
        self.driver_advantage.get()
    }

    #[inline]
    pub fn total_passenger_advantage(&self) -> f64 {
        self.passenger_advantage.get()
    }

    /// Ratio model: drivers raise it, passengers lower it.
    #[inline]
    pub fn division_probability(&self) -> f64 {
        safe_ratio(
            self.total_driver_advantage(),
            self.total_passenger_advantage(),
        )
    }

    /// `log10(drivers / passengers + 1)`, 0 when either count is 0.
    pub fn driver_passenger_ratio(&self) -> f64 {
        driver_passenger_ratio(self.driver_mutations, self.passenger_mutations)
    }
}

impl Default for Genome {
    fn default() -> Self {
        Self::ROOT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_genome_is_neutral() {
        let g = Genome::ROOT;
        assert_eq!(g.division_probability(), 1.0);
        assert_eq!(g.mutations(GenomeHalf::Driver), 0);
        assert_eq!(g.mutations(GenomeHalf::Passenger), 0);
        assert_eq!(g.driver_passenger_ratio(), 0.0);
    }

    #[test]
    fn test_driver_mutation_raises_division_probability() {
        let g = Genome::ROOT.with_mutation(GenomeHalf::Driver, PartId(1), 0.5);
        assert_eq!(g.part(GenomeHalf::Driver), PartId(1));
        assert_eq!(g.part(GenomeHalf::Passenger), PartId::ROOT);
        assert_eq!(g.mutations(GenomeHalf::Driver), 1);
        assert_eq!(g.division_probability(), 1.5);
    }

    #[test]
    fn test_passenger_mutation_lowers_division_probability() {
        let g = Genome::ROOT.with_mutation(GenomeHalf::Passenger, PartId(4), 1.0);
        assert_eq!(g.total_passenger_advantage(), 2.0);
        assert_eq!(g.division_probability(), 0.5);
        assert_eq!(g.total_driver_advantage(), 1.0);
    }

    #[test]
    fn test_zero_passenger_advantage_falls_back() {
        let g = Genome::ROOT.with_mutation(GenomeHalf::Passenger, PartId(1), -1.0);
        assert_eq!(g.total_passenger_advantage(), 0.0);
        assert_eq!(g.division_probability(), crate::base::GAIN_FALLBACK);
    }

    #[test]
    fn test_mutations_accumulate() {
        let g = Genome::ROOT
            .with_mutation(GenomeHalf::Driver, PartId(1), 0.1)
            .with_mutation(GenomeHalf::Driver, PartId(2), 0.1)
            .with_mutation(GenomeHalf::Passenger, PartId(1), 0.0);
        assert_eq!(g.mutations(GenomeHalf::Driver), 2);
        assert_eq!(g.mutations(GenomeHalf::Passenger), 1);
        assert!((g.total_driver_advantage() - 1.21).abs() < 1e-12);
        // 2 drivers / 1 passenger + 1 = 3
        assert!((g.driver_passenger_ratio() - 3f64.log10()).abs() < 1e-12);
    }
}
