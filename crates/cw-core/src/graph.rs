use std::collections::{HashMap, HashSet, VecDeque};

use crate::cell::CellId;
use crate::world::World;

/// Undirected adjacency over constraint links.
///
/// Every live link `a -> b` contributes the edges `a - b` and `b - a`, so a
/// one-directional link (as left behind by merging) still connects both ends.
/// Links whose target is gone are dropped.
#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    adjacency: HashMap<CellId, Vec<CellId>>,
}

impl LinkIndex {
    /// Build the adjacency for the current state of `world`.
    pub fn build(world: &World) -> Self {
        let mut adjacency: HashMap<CellId, Vec<CellId>> = HashMap::new();
        for cell in world.all_cells() {
            for constraint in &cell.constraints {
                if !world.contains(constraint.target) {
                    continue;
                }
                adjacency.entry(cell.id).or_default().push(constraint.target);
                adjacency.entry(constraint.target).or_default().push(cell.id);
            }
        }
        Self { adjacency }
    }

    /// Cells linked to `id` in either direction. May contain repeats.
    pub fn neighbors(&self, id: CellId) -> &[CellId] {
        self.adjacency
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Breadth-first traversal from `root`.
    ///
    /// Returns `root` first followed by every reachable cell exactly once.
    /// Cells that were never indexed are treated as isolated, so an unlinked
    /// root yields `[root]`.
    pub fn traverse(&self, root: CellId) -> Vec<CellId> {
        let mut visited = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);
        let mut order = Vec::new();

        while let Some(current) = queue.pop_front() {
            order.push(current);
            for &next in self.neighbors(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        order
    }
}
