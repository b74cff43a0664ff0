use std::collections::{HashMap, HashSet};

use glam::Vec2;

use crate::cell::{Cell, CellId, CellKind, Constraint, OrganismId};
use crate::error::{CoreError, CoreResult};
use crate::graph::LinkIndex;
use crate::query::CellQuery;

/// The cell store. Owns every cell and keeps insertion order for iteration.
#[derive(Debug, Clone, Default)]
pub struct World {
    cells: HashMap<CellId, Cell>,

    // Indexes
    order: Vec<CellId>,
    by_kind: HashMap<CellKind, Vec<CellId>>,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Cell CRUD
    // -----------------------------------------------------------------------

    /// Add a cell to the world. Returns the cell's ID.
    pub fn add_cell(&mut self, cell: Cell) -> CoreResult<CellId> {
        if self.cells.contains_key(&cell.id) {
            return Err(CoreError::DuplicateCell(cell.id));
        }
        cell.validate()?;

        let id = cell.id;
        self.by_kind.entry(cell.kind).or_default().push(id);
        self.order.push(id);
        self.cells.insert(id, cell);
        Ok(id)
    }

    /// Get a reference to a cell by ID.
    pub fn get_cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    /// Get a mutable reference to a cell by ID.
    pub fn get_cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(&id)
    }

    /// Whether the cell is alive.
    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains_key(&id)
    }

    /// Remove a cell. Links on other cells that target it are left dangling.
    pub fn remove_cell(&mut self, id: CellId) -> CoreResult<Cell> {
        let cell = self.cells.remove(&id).ok_or(CoreError::CellNotFound(id))?;

        self.order.retain(|cid| *cid != id);
        if let Some(ids) = self.by_kind.get_mut(&cell.kind) {
            ids.retain(|cid| *cid != id);
        }

        Ok(cell)
    }

    /// Remove many cells at once, skipping ids that are already gone.
    ///
    /// The indexes are swept once for the whole batch, so this is linear in
    /// the store size no matter how many cells go. Returns the removed cells
    /// in the order their ids were given.
    pub fn remove_cells(&mut self, ids: impl IntoIterator<Item = CellId>) -> Vec<Cell> {
        let removed: Vec<Cell> = ids
            .into_iter()
            .filter_map(|id| self.cells.remove(&id))
            .collect();
        if removed.is_empty() {
            return removed;
        }

        let gone: HashSet<CellId> = removed.iter().map(|c| c.id).collect();
        self.order.retain(|cid| !gone.contains(cid));
        for kind in removed.iter().map(|c| c.kind).collect::<HashSet<_>>() {
            if let Some(ids) = self.by_kind.get_mut(&kind) {
                ids.retain(|cid| !gone.contains(cid));
            }
        }

        removed
    }

    // -----------------------------------------------------------------------
    // Component access
    // -----------------------------------------------------------------------

    /// Overwrite a cell's position. Returns `false` if the cell is gone.
    pub fn set_position(&mut self, id: CellId, position: Vec2) -> bool {
        match self.cells.get_mut(&id) {
            Some(cell) => {
                cell.position = position;
                true
            }
            None => false,
        }
    }

    /// Relabel a cell's organism. Returns `false` if the cell is gone.
    pub fn set_organism(&mut self, id: CellId, organism: OrganismId) -> bool {
        match self.cells.get_mut(&id) {
            Some(cell) => {
                cell.organism = organism;
                true
            }
            None => false,
        }
    }

    /// Energy reserve of a cell, if it has one.
    pub fn energy(&self, id: CellId) -> Option<f32> {
        self.cells.get(&id).and_then(|c| c.energy)
    }

    /// Add to a cell's energy reserve and return the new total.
    ///
    /// Returns `None` when the cell is gone or carries no reserve.
    pub fn add_energy(&mut self, id: CellId, amount: f32) -> Option<f32> {
        let energy = self.cells.get_mut(&id)?.energy.as_mut()?;
        *energy += amount;
        Some(*energy)
    }

    /// Links owned by a cell.
    pub fn constraints(&self, id: CellId) -> Option<&[Constraint]> {
        self.cells.get(&id).map(|c| c.constraints.as_slice())
    }

    /// Append a link to a cell's list.
    pub fn append_constraint(&mut self, id: CellId, constraint: Constraint) -> CoreResult<()> {
        constraint.validate()?;
        let cell = self
            .cells
            .get_mut(&id)
            .ok_or(CoreError::CellNotFound(id))?;
        cell.constraints.push(constraint);
        Ok(())
    }

    /// Link two cells in both directions.
    pub fn link(&mut self, a: CellId, b: CellId, rest_length: f32, stiffness: f32) -> CoreResult<()> {
        if !self.contains(b) {
            return Err(CoreError::CellNotFound(b));
        }
        self.append_constraint(a, Constraint::new(b, rest_length, stiffness))?;
        self.append_constraint(b, Constraint::new(a, rest_length, stiffness))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// IDs of all cells in insertion order.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.order.iter().copied()
    }

    /// All cells in insertion order.
    pub fn all_cells(&self) -> impl Iterator<Item = &Cell> {
        self.order.iter().filter_map(|id| self.cells.get(id))
    }

    /// IDs of all cells of one kind, in insertion order.
    pub fn ids_by_kind(&self, kind: CellKind) -> &[CellId] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// All cells of one kind, in insertion order.
    pub fn cells_by_kind(&self, kind: CellKind) -> Vec<&Cell> {
        self.ids_by_kind(kind)
            .iter()
            .filter_map(|id| self.cells.get(id))
            .collect()
    }

    /// Cells carrying an organism label.
    ///
    /// The label is a cached value; use [`World::organism_graph`] for the
    /// structurally connected set.
    pub fn organism_members(&self, organism: OrganismId) -> Vec<&Cell> {
        self.all_cells().filter(|c| c.organism == organism).collect()
    }

    /// Start building a query.
    pub fn query(&self) -> CellQuery<'_> {
        CellQuery::new(self)
    }

    // -----------------------------------------------------------------------
    // Graph traversal
    // -----------------------------------------------------------------------

    /// Every cell reachable from `root` over links in either direction.
    ///
    /// Empty when `root` is not alive.
    pub fn organism_graph(&self, root: CellId) -> Vec<CellId> {
        if !self.contains(root) {
            return Vec::new();
        }
        LinkIndex::build(self).traverse(root)
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    /// Number of live cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of live cells per kind.
    pub fn cell_counts_by_kind(&self) -> HashMap<CellKind, usize> {
        self.by_kind
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(k, ids)| (*k, ids.len()))
            .collect()
    }

    /// Number of distinct organism labels among non-food cells.
    pub fn organism_count(&self) -> usize {
        self.cells
            .values()
            .filter(|c| c.kind != CellKind::Food)
            .map(|c| c.organism)
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellKind, x: f32, y: f32) -> Cell {
        Cell::new(kind, Vec2::new(x, y))
    }

    #[test]
    fn add_and_get_cell() {
        let mut world = World::new();
        let id = world.add_cell(cell(CellKind::Structure, 1.0, 2.0)).unwrap();
        let stored = world.get_cell(id).unwrap();
        assert_eq!(stored.position, Vec2::new(1.0, 2.0));
        assert!(world.contains(id));
        assert_eq!(world.cell_count(), 1);
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut world = World::new();
        let c = cell(CellKind::Structure, 0.0, 0.0);
        world.add_cell(c.clone()).unwrap();
        assert!(matches!(
            world.add_cell(c),
            Err(CoreError::DuplicateCell(_))
        ));
    }

    #[test]
    fn invalid_cell_rejected() {
        let mut world = World::new();
        let result = world.add_cell(cell(CellKind::Structure, 0.0, 0.0).with_radius(-1.0));
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(world.cell_count(), 0);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut world = World::new();
        let ids: Vec<CellId> = (0..10)
            .map(|i| world.add_cell(cell(CellKind::Storage, i as f32, 0.0)).unwrap())
            .collect();
        assert_eq!(world.cell_ids().collect::<Vec<_>>(), ids);
        world.remove_cell(ids[3]).unwrap();
        let remaining: Vec<CellId> = world.cell_ids().collect();
        assert_eq!(remaining.len(), 9);
        assert!(!remaining.contains(&ids[3]));
        assert_eq!(remaining[3], ids[4]);
    }

    #[test]
    fn batch_remove_keeps_survivor_order() {
        let mut world = World::new();
        let ids: Vec<CellId> = (0..10)
            .map(|i| {
                let kind = if i % 2 == 0 { CellKind::Food } else { CellKind::Mouth };
                world.add_cell(cell(kind, i as f32, 0.0)).unwrap()
            })
            .collect();

        // Duplicates and unknown ids are ignored
        let removed = world.remove_cells([ids[0], ids[5], ids[0], CellId::new(), ids[8]]);
        assert_eq!(removed.iter().map(|c| c.id).collect::<Vec<_>>(), [ids[0], ids[5], ids[8]]);

        let expected: Vec<CellId> = [1, 2, 3, 4, 6, 7, 9].iter().map(|&i| ids[i]).collect();
        assert_eq!(world.cell_ids().collect::<Vec<_>>(), expected);
        assert_eq!(world.ids_by_kind(CellKind::Food), [ids[2], ids[4], ids[6]]);
        assert_eq!(world.ids_by_kind(CellKind::Mouth), [ids[1], ids[3], ids[7], ids[9]]);

        assert!(world.remove_cells(Vec::new()).is_empty());
        assert_eq!(world.cell_count(), 7);
    }

    #[test]
    fn remove_leaves_dangling_links() {
        let mut world = World::new();
        let a = world.add_cell(cell(CellKind::Structure, 0.0, 0.0)).unwrap();
        let b = world.add_cell(cell(CellKind::Structure, 1.0, 0.0)).unwrap();
        world.link(a, b, 1.0, 1.0).unwrap();

        world.remove_cell(b).unwrap();
        assert_eq!(world.constraints(a).unwrap().len(), 1);
        assert!(!world.contains(b));
        assert!(world.remove_cell(b).is_err());
        assert_eq!(world.cells_by_kind(CellKind::Structure).len(), 1);
        assert!(world.organism_graph(b).is_empty());
    }

    #[test]
    fn link_creates_both_directions() {
        let mut world = World::new();
        let a = world.add_cell(cell(CellKind::Structure, 0.0, 0.0)).unwrap();
        let b = world.add_cell(cell(CellKind::Connector, 1.0, 0.0)).unwrap();
        world.link(a, b, 1.0, 0.5).unwrap();
        assert_eq!(world.constraints(a).unwrap()[0].target, b);
        assert_eq!(world.constraints(b).unwrap()[0].target, a);
    }

    #[test]
    fn link_to_missing_cell_fails_without_side_effects() {
        let mut world = World::new();
        let a = world.add_cell(cell(CellKind::Structure, 0.0, 0.0)).unwrap();
        assert!(world.link(a, CellId::new(), 1.0, 1.0).is_err());
        assert!(world.constraints(a).unwrap().is_empty());
    }

    #[test]
    fn add_energy_requires_reserve() {
        let mut world = World::new();
        let owner = world
            .add_cell(cell(CellKind::Reproducer, 0.0, 0.0).with_energy(10.0))
            .unwrap();
        let plain = world.add_cell(cell(CellKind::Structure, 0.0, 0.0)).unwrap();

        assert_eq!(world.add_energy(owner, 5.0), Some(15.0));
        assert_eq!(world.energy(owner), Some(15.0));
        assert_eq!(world.add_energy(plain, 5.0), None);
        assert_eq!(world.add_energy(CellId::new(), 5.0), None);
    }

    #[test]
    fn setters_report_missing_cells() {
        let mut world = World::new();
        let a = world.add_cell(cell(CellKind::Structure, 0.0, 0.0)).unwrap();
        assert!(world.set_position(a, Vec2::ONE));
        assert_eq!(world.get_cell(a).unwrap().position, Vec2::ONE);

        let ghost = CellId::new();
        assert!(!world.set_position(ghost, Vec2::ONE));
        assert!(!world.set_organism(ghost, OrganismId(a)));
    }

    #[test]
    fn organism_labels_and_counts() {
        let mut world = World::new();
        let a = world.add_cell(cell(CellKind::Structure, 0.0, 0.0)).unwrap();
        let b = world.add_cell(cell(CellKind::Structure, 1.0, 0.0)).unwrap();
        world.add_cell(Cell::food(Vec2::ZERO, 5.0)).unwrap();
        assert_eq!(world.organism_count(), 2);

        world.set_organism(b, OrganismId(a));
        assert_eq!(world.organism_count(), 1);
        assert_eq!(world.organism_members(OrganismId(a)).len(), 2);
    }

    #[test]
    fn counts_by_kind_skip_empty_kinds() {
        let mut world = World::new();
        let food = world.add_cell(Cell::food(Vec2::ZERO, 5.0)).unwrap();
        world.add_cell(cell(CellKind::Mouth, 0.0, 0.0)).unwrap();
        world.remove_cell(food).unwrap();

        let counts = world.cell_counts_by_kind();
        assert_eq!(counts.get(&CellKind::Mouth), Some(&1));
        assert!(!counts.contains_key(&CellKind::Food));
    }
}
