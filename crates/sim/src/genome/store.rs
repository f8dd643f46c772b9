use crate::base::PagedArena;
use crate::errors::ArenaError;
use crate::genome::{GeneTable, Genome, GenomeHalf, GenomeId, GenomePart, PartId};
use rand::Rng;

/// Append-only store of genomes and their lineage nodes.
///
/// Driver parts, passenger parts and genomes each live in their own
/// [`PagedArena`]. Index 0 of every table is the sentinel root. Cells refer
/// to genomes by [`GenomeId`]; a division without mutation reuses the
/// parent's id, so memory grows only with distinct mutation events.
///
/// All methods take `&self`: appends from many shard workers may run
/// concurrently, and reads of any index already returned never block.
#[derive(Debug)]
pub struct GenomeArena {
    drivers: PagedArena<GenomePart>,
    passengers: PagedArena<GenomePart>,
    genomes: PagedArena<Genome>,
}

impl GenomeArena {
    pub fn new() -> Self {
        let arena = Self {
            drivers: PagedArena::new(),
            passengers: PagedArena::new(),
            genomes: PagedArena::new(),
        };
        arena.drivers.push(GenomePart::ROOT);
        arena.passengers.push(GenomePart::ROOT);
        arena.genomes.push(Genome::ROOT);
        arena
    }

    #[inline]
    fn parts(&self, half: GenomeHalf) -> &PagedArena<GenomePart> {
        match half {
            GenomeHalf::Driver => &self.drivers,
            GenomeHalf::Passenger => &self.passengers,
        }
    }

    #[inline]
    pub fn genome(&self, id: GenomeId) -> Result<&Genome, ArenaError> {
        self.genomes.get(id.0).ok_or(ArenaError::UnknownGenome(id.0))
    }

    #[inline]
    pub fn part(&self, half: GenomeHalf, id: PartId) -> Option<&GenomePart> {
        self.parts(half).get(id.0)
    }

    /// Append a lineage node and return its index.
    pub fn append_part(&self, half: GenomeHalf, part: GenomePart) -> PartId {
        PartId(self.parts(half).push(part))
    }

    /// Append a genome and return its index.
    pub fn append_genome(&self, genome: Genome) -> GenomeId {
        GenomeId(self.genomes.push(genome))
    }

    /// Number of nodes in one half, root included.
    pub fn part_count(&self, half: GenomeHalf) -> usize {
        self.parts(half).len()
    }

    /// Number of genomes, root included.
    pub fn genome_count(&self) -> usize {
        self.genomes.len()
    }

    /// Apply one mutation in `half` to the genome `parent` and return the new genome.
    ///
    /// A locus is drawn uniformly over the half's width and mapped to its
    /// gene through the region map. One part and one genome are appended;
    /// the other half's part index is carried over unchanged.
    pub fn mutate<R: Rng + ?Sized>(
        &self,
        parent: GenomeId,
        half: GenomeHalf,
        genes: &GeneTable,
        rng: &mut R,
    ) -> Result<(GenomeId, Genome), ArenaError> {
        let base = *self.genome(parent)?;
        let region = genes.region(half);
        if region.width() == 0 {
            return Ok((parent, base));
        }

        let locus = rng.random_range(0..region.width());
        let advantage = region.gene_at(locus).map_or(0.0, |g| g.advantage);

        let part = self.append_part(half, GenomePart::mutated(locus as u32, base.part(half)));
        let genome = base.with_mutation(half, part, advantage);
        Ok((self.append_genome(genome), genome))
    }

    /// Walk a lineage from `part` towards the root, excluding the root.
    ///
    /// Parents are always appended before their children, so every step
    /// strictly lowers the index and the walk terminates.
    pub fn lineage(&self, half: GenomeHalf, part: PartId) -> Lineage<'_> {
        Lineage {
            parts: self.parts(half),
            next: part,
        }
    }
}

impl Default for GenomeArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a lineage chain, see [`GenomeArena::lineage`].
pub struct Lineage<'a> {
    parts: &'a PagedArena<GenomePart>,
    next: PartId,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = (PartId, &'a GenomePart);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_root() {
            return None;
        }
        let id = self.next;
        let part = self.parts.get(id.0)?;
        // Guard against a malformed chain that would not descend.
        self.next = if part.parent() < id {
            part.parent()
        } else {
            PartId::ROOT
        };
        Some((id, part))
    }
}
