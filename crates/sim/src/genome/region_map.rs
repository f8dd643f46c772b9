use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// A gene occupying a contiguous region of one genome half.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub name: String,
    /// Width of the gene in loci. Wider genes are hit proportionally more often.
    pub size: u32,
    /// Fitness advantage applied as a factor `1 + advantage` per mutation.
    pub advantage: f64,
}

impl Gene {
    pub fn new(name: impl Into<String>, size: u32, advantage: f64) -> Self {
        Self {
            name: name.into(),
            size,
            advantage,
        }
    }
}

/// Maps every locus of a genome half to the gene that occupies it.
///
/// The map is a flat array with one entry per locus, built once when the
/// model is loaded, so locating the gene under a random draw is a single
/// index operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMap {
    genes: Vec<Gene>,

    /// Gene index for every locus.
    ///
    /// # Example:
    /// For genes of sizes [2, 1, 3] the map is [0, 0, 1, 2, 2, 2]:
    /// - loci 0..2 belong to gene 0
    /// - locus 2 belongs to gene 1
    /// - loci 3..6 belong to gene 2
    loci: Vec<u32>,
}

impl RegionMap {
    /// Build the map from an ordered list of genes.
    ///
    /// # Errors
    /// Returns an error if the list is empty, a gene has zero width, or an
    /// advantage is not finite or would make a factor `1 + advantage`
    /// negative.
    pub fn new(genes: Vec<Gene>) -> Result<Self, ConfigError> {
        if genes.is_empty() {
            return Err(ConfigError::InvalidParameter(
                "a genome half needs at least one gene".into(),
            ));
        }

        let mut loci = Vec::with_capacity(genes.iter().map(|g| g.size as usize).sum());
        for (idx, gene) in genes.iter().enumerate() {
            if gene.size == 0 {
                return Err(ConfigError::InvalidParameter(format!(
                    "gene `{}` has zero size",
                    gene.name
                )));
            }
            if !gene.advantage.is_finite() || gene.advantage <= -1.0 {
                return Err(ConfigError::InvalidParameter(format!(
                    "gene `{}` has advantage {} (must be finite and > -1)",
                    gene.name, gene.advantage
                )));
            }
            loci.extend(std::iter::repeat(idx as u32).take(gene.size as usize));
        }

        Ok(Self { genes, loci })
    }

    /// `count` genes of identical width and advantage, named `{prefix}{i}`.
    pub fn uniform(
        prefix: &str,
        count: u32,
        size: u32,
        advantage: f64,
    ) -> Result<Self, ConfigError> {
        let genes = (0..count)
            .map(|i| Gene::new(format!("{prefix}{i}"), size, advantage))
            .collect();
        Self::new(genes)
    }

    /// Total number of loci (sum of gene widths).
    #[inline]
    pub fn width(&self) -> usize {
        self.loci.len()
    }

    #[inline]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Gene occupying `locus`, or `None` if the locus is outside the half.
    #[inline]
    pub fn gene_at(&self, locus: usize) -> Option<&Gene> {
        let idx = *self.loci.get(locus)?;
        self.genes.get(idx as usize)
    }
}
