use cw_core::{Cell, CellId, World};
use glam::Vec2;
use rayon::prelude::*;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::grid::SpatialGrid;
use crate::system::System;

/// Squared distances at or below this are treated as coincident centers.
const MIN_DISTANCE_SQ: f32 = 0.00001;

/// Pushes overlapping cells apart.
///
/// Each cell moves itself by half of every overlap it finds; the other cell
/// of the pair does the same from its side, so a pair separates
/// symmetrically. One pass per tick, no iteration to convergence.
#[derive(Debug, Default)]
pub struct CollisionSystem {
    last_corrected: usize,
}

impl CollisionSystem {
    /// Create a new collision system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells moved during the last tick.
    pub fn last_corrected(&self) -> usize {
        self.last_corrected
    }

    /// Total separation `cell` should apply against everything in the grid.
    fn separation(cell: &Cell, grid: &SpatialGrid, world: &World) -> Vec2 {
        let mut push = Vec2::ZERO;
        for neighbor_id in grid.neighborhood(cell.position) {
            if neighbor_id == cell.id {
                continue;
            }
            let Some(neighbor) = world.get_cell(neighbor_id) else {
                continue;
            };

            let delta = cell.position - neighbor.position;
            let dist_sq = delta.length_squared();
            let min_dist = cell.physics.radius + neighbor.physics.radius;

            if dist_sq < min_dist * min_dist && dist_sq > MIN_DISTANCE_SQ {
                let dist = dist_sq.sqrt();
                let overlap = min_dist - dist;
                push += delta / dist * overlap * 0.5;
            }
        }
        push
    }
}

impl System for CollisionSystem {
    fn name(&self) -> &str {
        "collision"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let world: &World = &*ctx.world;
        let grid = SpatialGrid::from_config(world, ctx.config, |_| true)?;

        let ids: Vec<CellId> = world.cell_ids().collect();
        let corrections: Vec<(CellId, Vec2)> = ids
            .par_iter()
            .filter_map(|id| {
                let cell = world.get_cell(*id)?;
                let push = Self::separation(cell, &grid, world);
                (push != Vec2::ZERO).then_some((*id, push))
            })
            .collect();

        self.last_corrected = corrections.len();
        for (id, push) in corrections {
            if let Some(cell) = ctx.world.get_cell_mut(id) {
                cell.position += push;
            }
        }

        tracing::debug!(corrected = self.last_corrected, "collision pass");
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use cw_core::CellKind;

    use super::*;
    use crate::config::SimConfig;
    use crate::simulation::Simulation;

    fn run_once(world: World) -> World {
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.add_system(CollisionSystem::new());
        sim.tick().unwrap();
        sim.into_world()
    }

    fn unit_cell(x: f32, y: f32) -> Cell {
        Cell::new(CellKind::Structure, Vec2::new(x, y)).with_radius(1.0)
    }

    #[test]
    fn overlapping_pair_separates_symmetrically() {
        let mut world = World::new();
        let a = world.add_cell(unit_cell(0.0, 0.0)).unwrap();
        let b = world.add_cell(unit_cell(0.5, 0.0)).unwrap();

        let world = run_once(world);
        let pa = world.get_cell(a).unwrap().position;
        let pb = world.get_cell(b).unwrap().position;

        assert!(pa.x < 0.0);
        assert!(pb.x > 0.5);
        assert!(pa.distance(pb) > 0.5);
        // Overlap 1.5, each side moves 0.75
        assert!((pa.x + 0.75).abs() < 1e-5);
        assert!((pb.x - 1.25).abs() < 1e-5);
        assert!((pa.x + pb.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn separated_cells_do_not_move() {
        let mut world = World::new();
        let a = world.add_cell(unit_cell(0.0, 0.0)).unwrap();
        let b = world.add_cell(unit_cell(2.5, 0.0)).unwrap();

        let mut sim = Simulation::new(world, SimConfig::default());
        sim.add_system(CollisionSystem::new());
        sim.tick().unwrap();

        assert_eq!(sim.get_system::<CollisionSystem>().unwrap().last_corrected(), 0);
        assert_eq!(sim.world().get_cell(a).unwrap().position, Vec2::ZERO);
        assert_eq!(sim.world().get_cell(b).unwrap().position, Vec2::new(2.5, 0.0));
    }

    #[test]
    fn coincident_centers_are_skipped() {
        let mut world = World::new();
        let a = world.add_cell(unit_cell(1.0, 1.0)).unwrap();
        let b = world.add_cell(unit_cell(1.0, 1.0)).unwrap();

        let world = run_once(world);
        assert_eq!(world.get_cell(a).unwrap().position, Vec2::ONE);
        assert_eq!(world.get_cell(b).unwrap().position, Vec2::ONE);
    }

    #[test]
    fn corrections_accumulate_from_all_neighbors() {
        let mut world = World::new();
        let middle = world.add_cell(unit_cell(0.0, 0.0)).unwrap();
        world.add_cell(unit_cell(-1.0, 0.0)).unwrap();
        world.add_cell(unit_cell(1.0, 0.0)).unwrap();
        let top = world.add_cell(unit_cell(0.0, 1.5)).unwrap();

        let world = run_once(world);
        // Left and right cancel; the top neighbor pushes the middle down
        let p = world.get_cell(middle).unwrap().position;
        assert!(p.x.abs() < 1e-5);
        assert!((p.y + 0.25).abs() < 1e-5);
        assert!(world.get_cell(top).unwrap().position.y > 1.5);
    }

    #[test]
    fn previous_position_is_untouched() {
        let mut world = World::new();
        let a = world.add_cell(unit_cell(0.0, 0.0)).unwrap();
        world.add_cell(unit_cell(0.5, 0.0)).unwrap();

        let world = run_once(world);
        assert_eq!(world.get_cell(a).unwrap().previous_position, Vec2::ZERO);
    }
}
