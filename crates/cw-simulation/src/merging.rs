use cw_core::{Cell, CellId, CellKind, Constraint, OrganismId, World};
use rayon::prelude::*;

use crate::commands::{Command, CommandBuffer};
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::grid::SpatialGrid;
use crate::system::System;

/// A connector's claim on a foreign structure cell.
#[derive(Debug, Clone, Copy)]
struct Merge {
    connector: CellId,
    structure: CellId,
    organism: OrganismId,
    distance: f32,
}

/// Fuses organisms on contact.
///
/// A connector touching a structure cell of another organism pulls that cell
/// into its own organism and links to it at the current distance. Each
/// connector takes at most one cell per tick, and only that cell is
/// relabeled; the rest of the other organism keeps its label.
#[derive(Debug, Default)]
pub struct MergingSystem {
    last_merged: usize,
}

impl MergingSystem {
    /// Create a new merging system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of merges recorded during the last tick.
    pub fn last_merged(&self) -> usize {
        self.last_merged
    }

    fn find_merge(connector: &Cell, grid: &SpatialGrid, world: &World) -> Option<Merge> {
        grid.neighborhood(connector.position)
            .filter(|id| *id != connector.id)
            .filter_map(|id| world.get_cell(id))
            .filter(|other| other.kind == CellKind::Structure)
            .filter(|other| other.organism != connector.organism)
            .find_map(|other| {
                let distance_sq = connector.position.distance_squared(other.position);
                let reach = connector.physics.radius + other.physics.radius;
                (distance_sq < reach * reach).then(|| Merge {
                    connector: connector.id,
                    structure: other.id,
                    organism: connector.organism,
                    distance: distance_sq.sqrt(),
                })
            })
    }
}

impl System for MergingSystem {
    fn name(&self) -> &str {
        "merging"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let stiffness = ctx.config.merge_stiffness;
        let world: &World = &*ctx.world;
        let grid = SpatialGrid::from_config(world, ctx.config, |c| {
            matches!(c.kind, CellKind::Structure | CellKind::Connector)
        })?;

        let merges: Vec<Merge> = world
            .ids_by_kind(CellKind::Connector)
            .par_iter()
            .filter_map(|id| {
                let connector = world.get_cell(*id)?;
                Self::find_merge(connector, &grid, world)
            })
            .collect();

        self.last_merged = merges.len();
        if merges.is_empty() {
            tracing::trace!("no merges this tick");
            return Ok(());
        }

        let mut buffer = CommandBuffer::new();
        for merge in &merges {
            buffer.push(Command::SetOrganism {
                cell: merge.structure,
                organism: merge.organism,
            });
            buffer.push(Command::AppendConstraint {
                cell: merge.connector,
                constraint: Constraint::new(merge.structure, merge.distance, stiffness),
            });
        }
        let report = buffer.playback(ctx.world);

        for merge in merges {
            ctx.emit(
                SimEventKind::OrganismsMerged {
                    connector: merge.connector,
                    structure: merge.structure,
                    organism: merge.organism,
                },
                format!(
                    "connector {} pulled {} into {}",
                    merge.connector, merge.structure, merge.organism
                ),
            );
        }

        tracing::debug!(
            merged = self.last_merged,
            applied = report.applied,
            skipped = report.skipped,
            "merging pass"
        );
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
    use glam::Vec2;

    use super::*;
    use crate::config::SimConfig;
    use crate::simulation::Simulation;

    fn sim_with(world: World) -> Simulation {
        let mut sim = Simulation::new(world, SimConfig::default());
        sim.add_system(MergingSystem::new());
        sim
    }

    #[test]
    fn connector_absorbs_touching_structure() {
        let mut world = World::new();
        let connector = world
            .add_cell(Cell::new(CellKind::Connector, Vec2::ZERO))
            .unwrap();
        let structure = world
            .add_cell(Cell::new(CellKind::Structure, Vec2::new(0.8, 0.0)))
            .unwrap();

        let mut sim = sim_with(world);
        sim.tick().unwrap();

        let world = sim.world();
        assert_eq!(
            world.get_cell(structure).unwrap().organism,
            OrganismId(connector)
        );
        let links = world.constraints(connector).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, structure);
        assert!((links[0].rest_length - 0.8).abs() < 1e-6);
        assert!((links[0].stiffness - 0.1).abs() < 1e-6);
        // Merge links are one-way
        assert!(world.constraints(structure).unwrap().is_empty());

        assert_eq!(sim.get_system::<MergingSystem>().unwrap().last_merged(), 1);
        assert_eq!(sim.events().events_for_cell(structure).len(), 1);
    }

    #[test]
    fn merging_is_idempotent() {
        let mut world = World::new();
        let connector = world
            .add_cell(Cell::new(CellKind::Connector, Vec2::ZERO))
            .unwrap();
        world
            .add_cell(Cell::new(CellKind::Structure, Vec2::new(0.5, 0.0)))
            .unwrap();

        let mut sim = sim_with(world);
        sim.run(2).unwrap();

        assert_eq!(sim.world().constraints(connector).unwrap().len(), 1);
        assert_eq!(sim.get_system::<MergingSystem>().unwrap().last_merged(), 0);
        assert_eq!(sim.events().len(), 1);
    }

    #[test]
    fn only_foreign_structure_cells_qualify() {
        let mut world = World::new();
        let connector = world
            .add_cell(Cell::new(CellKind::Connector, Vec2::ZERO))
            .unwrap();
        // Same organism
        world
            .add_cell(
                Cell::new(CellKind::Structure, Vec2::new(0.5, 0.0))
                    .with_organism(OrganismId(connector)),
            )
            .unwrap();
        // Wrong kinds
        world
            .add_cell(Cell::new(CellKind::Mouth, Vec2::new(-0.5, 0.0)))
            .unwrap();
        world
            .add_cell(
                Cell::new(CellKind::Connector, Vec2::new(0.0, 0.5))
                    .with_organism(OrganismId(connector)),
            )
            .unwrap();
        // Too far
        world
            .add_cell(Cell::new(CellKind::Structure, Vec2::new(0.0, -1.5)))
            .unwrap();

        let mut sim = sim_with(world);
        sim.tick().unwrap();

        assert!(sim.world().constraints(connector).unwrap().is_empty());
        assert!(sim.events().is_empty());
    }

    #[test]
    fn one_merge_per_connector_per_tick() {
        let mut world = World::new();
        let connector = world
            .add_cell(Cell::new(CellKind::Connector, Vec2::ZERO))
            .unwrap();
        let first = world
            .add_cell(Cell::new(CellKind::Structure, Vec2::new(0.5, 0.0)))
            .unwrap();
        let second = world
            .add_cell(Cell::new(CellKind::Structure, Vec2::new(-0.5, 0.0)))
            .unwrap();

        let mut sim = sim_with(world);
        sim.tick().unwrap();
        assert_eq!(sim.world().constraints(connector).unwrap().len(), 1);
        let relabeled = [first, second]
            .iter()
            .filter(|id| sim.world().get_cell(**id).unwrap().organism == OrganismId(connector))
            .count();
        assert_eq!(relabeled, 1);

        // The other one is picked up next tick
        sim.tick().unwrap();
        assert_eq!(sim.world().constraints(connector).unwrap().len(), 2);
        assert_eq!(
            sim.world().organism_members(OrganismId(connector)).len(),
            3
        );
    }

    #[test]
    fn relabels_only_the_touched_cell() {
        let mut world = World::new();
        let connector = world
            .add_cell(Cell::new(CellKind::Connector, Vec2::ZERO))
            .unwrap();
        let touched = world
            .add_cell(Cell::new(CellKind::Structure, Vec2::new(0.9, 0.0)))
            .unwrap();
        let far = world
            .add_cell(
                Cell::new(CellKind::Storage, Vec2::new(10.0, 0.0))
                    .with_organism(OrganismId(touched)),
            )
            .unwrap();
        world.link(touched, far, 9.1, 0.5).unwrap();

        let mut sim = sim_with(world);
        sim.tick().unwrap();

        assert_eq!(
            sim.world().get_cell(touched).unwrap().organism,
            OrganismId(connector)
        );
        assert_eq!(
            sim.world().get_cell(far).unwrap().organism,
            OrganismId(touched)
        );
    }
}
