use glam::Vec2;

use crate::cell::{Cell, CellKind, OrganismId};
use crate::world::World;

/// A builder for filtering cells in a world.
pub struct CellQuery<'w> {
    world: &'w World,
    kind_filter: Option<CellKind>,
    organism: Option<OrganismId>,
    min_energy: Option<f32>,
    within: Option<(Vec2, f32)>,
    limit: Option<usize>,
}

impl<'w> CellQuery<'w> {
    /// Start a query matching every cell.
    pub fn new(world: &'w World) -> Self {
        Self {
            world,
            kind_filter: None,
            organism: None,
            min_energy: None,
            within: None,
            limit: None,
        }
    }

    /// Filter by cell kind.
    pub fn kind(mut self, kind: CellKind) -> Self {
        self.kind_filter = Some(kind);
        self
    }

    /// Filter to cells carrying an organism label.
    pub fn organism(mut self, organism: OrganismId) -> Self {
        self.organism = Some(organism);
        self
    }

    /// Filter to cells with an energy reserve of at least `amount`.
    pub fn min_energy(mut self, amount: f32) -> Self {
        self.min_energy = Some(amount);
        self
    }

    /// Filter to cells whose center lies within `radius` of `center`.
    pub fn within(mut self, center: Vec2, radius: f32) -> Self {
        self.within = Some((center, radius));
        self
    }

    /// Limit the number of results.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Execute the query and return matching cells in insertion order.
    pub fn execute(self) -> Vec<&'w Cell> {
        let limit = self.limit.unwrap_or(usize::MAX);
        self.candidates()
            .filter(|c| self.matches(c))
            .take(limit)
            .collect()
    }

    /// Count matching cells without collecting them.
    pub fn count(self) -> usize {
        self.candidates().filter(|c| self.matches(c)).count()
    }

    fn candidates(&self) -> Box<dyn Iterator<Item = &'w Cell> + 'w> {
        let world = self.world;
        match self.kind_filter {
            // The kind index is already in insertion order
            Some(kind) => Box::new(
                world
                    .ids_by_kind(kind)
                    .iter()
                    .filter_map(move |id| world.get_cell(*id)),
            ),
            None => Box::new(world.all_cells()),
        }
    }

    fn matches(&self, cell: &Cell) -> bool {
        if let Some(organism) = self.organism {
            if cell.organism != organism {
                return false;
            }
        }

        if let Some(min) = self.min_energy {
            match cell.energy {
                Some(energy) if energy >= min => {}
                _ => return false,
            }
        }

        if let Some((center, radius)) = self.within {
            if cell.position.distance_squared(center) > radius * radius {
                return false;
            }
        }

        true
    }
}
