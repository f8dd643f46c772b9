use crate::base::{CellId, CloneId, IdGenerator};
use crate::errors::ArenaError;
use crate::evolution::{death_probability, draw_life_event, DivisionKind, LifeEvent, MutationModel};
use crate::genome::{GeneTable, Genome, GenomeArena, GenomeId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Alive is initial; Dead is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    Alive,
    Dead,
}

/// Shared, read-only inputs of one cell's life tick.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub arena: &'a GenomeArena,
    pub genes: &'a GeneTable,
    pub mutation: &'a MutationModel,
    pub ids: &'a IdGenerator,
    pub cycle: i64,
    /// Shard population before any division of this cycle.
    pub cells_at_start: usize,
    /// Carrying capacity K of the whole population.
    pub capacity: f64,
}

/// What happened to a cell during its tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Divided { daughter: Cell, kind: DivisionKind },
    Died,
}

/// A single tumour cell.
///
/// A cell only holds the index of its genome; the genome itself lives in
/// the [`GenomeArena`] and is shared with every relative that did not
/// mutate since their common ancestor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    id: CellId,
    parent: Option<CellId>,
    clone_group: CloneId,
    age: u32,
    state: CellState,
    genome: GenomeId,
    division_probability: f64,
    death_probability: f64,
    /// Last cycle this cell was created or ticked in; seeded cells carry -1.
    cycle: i64,
}

impl Cell {
    /// A founder cell carrying the unmutated root genome.
    pub fn founder(id: CellId) -> Self {
        Self {
            id,
            parent: None,
            clone_group: CloneId::FOUNDER,
            age: 0,
            state: CellState::Alive,
            genome: GenomeId::ROOT,
            division_probability: Genome::ROOT.division_probability(),
            death_probability: 0.0,
            cycle: -1,
        }
    }

    #[inline]
    pub fn id(&self) -> CellId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<CellId> {
        self.parent
    }

    #[inline]
    pub fn clone_group(&self) -> CloneId {
        self.clone_group
    }

    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    #[inline]
    pub fn state(&self) -> CellState {
        self.state
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state == CellState::Alive
    }

    #[inline]
    pub fn genome(&self) -> GenomeId {
        self.genome
    }

    #[inline]
    pub fn division_probability(&self) -> f64 {
        self.division_probability
    }

    #[inline]
    pub fn death_probability(&self) -> f64 {
        self.death_probability
    }

    #[inline]
    pub fn cycle(&self) -> i64 {
        self.cycle
    }

    /// Advance this cell by one life tick.
    ///
    /// Two uniform draws are taken from `rng` on a division (life tick, then
    /// mutation kind) and one on a death, always in that order.
    ///
    /// # Errors
    /// Fails only if the cell's genome index is unknown to the arena.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        ctx: &TickContext<'_>,
        rng: &mut R,
    ) -> Result<TickOutcome, ArenaError> {
        self.death_probability = death_probability(ctx.cells_at_start, ctx.capacity);
        self.cycle = ctx.cycle;
        self.age += 1;

        match draw_life_event(self.division_probability, self.death_probability, rng) {
            LifeEvent::Death => {
                self.state = CellState::Dead;
                Ok(TickOutcome::Died)
            }
            LifeEvent::Division => {
                let kind = ctx.mutation.draw(rng);
                let daughter = self.divide(kind, ctx, rng)?;
                Ok(TickOutcome::Divided { daughter, kind })
            }
        }
    }

    fn divide<R: Rng + ?Sized>(
        &self,
        kind: DivisionKind,
        ctx: &TickContext<'_>,
        rng: &mut R,
    ) -> Result<Cell, ArenaError> {
        let (genome, division_probability) = match kind.half() {
            None => (self.genome, self.division_probability),
            Some(half) => {
                let (id, genome) = ctx.arena.mutate(self.genome, half, ctx.genes, rng)?;
                (id, genome.division_probability())
            }
        };
        let clone_group = match kind {
            DivisionKind::Driver => ctx.ids.next_clone_id(),
            _ => self.clone_group,
        };

        Ok(Cell {
            id: ctx.ids.next_cell_id(),
            parent: Some(self.id),
            clone_group,
            age: 0,
            state: CellState::Alive,
            genome,
            division_probability,
            death_probability: self.death_probability,
            cycle: ctx.cycle,
        })
    }
}
