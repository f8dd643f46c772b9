//! Genome representation.
//!
//! This module provides the structural-sharing genome model: immutable
//! lineage nodes ([`GenomePart`]), genomes pairing a driver and a passenger
//! lineage ([`Genome`]), the gene layouts that mutations are drawn from
//! ([`RegionMap`], [`GeneTable`]) and the concurrent [`GenomeArena`] that
//! owns them all.

mod gene_table;
mod lineage;
mod part;
mod region_map;
mod store;

pub use gene_table::{GeneTable, TABLE_HEADER};
pub use lineage::{Genome, GenomeId};
pub use part::{GenomeHalf, GenomePart, PartId};
pub use region_map::{Gene, RegionMap};
pub use store::{GenomeArena, Lineage};
