use std::collections::HashMap;

use cw_core::{Cell, CellId, CellKind, LinkIndex, OrganismId, World};
use glam::Vec2;
use rayon::prelude::*;

use crate::commands::{Command, CommandBuffer};
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// One paid-for reproduction, ready to spawn.
#[derive(Debug)]
struct Offspring {
    root: CellId,
    organism: OrganismId,
    cells: Vec<Cell>,
}

/// Clones whole organisms out of reproducers that can afford it.
///
/// Every reproducer holding at least the configured cost pays it up front
/// and becomes a root. The root's connected set is found by walking links in
/// either direction, and each visited cell is duplicated under a new ID.
/// Links inside the set are rewired onto the clones; a link leaving the set
/// keeps pointing at the original. Clones are shifted by the configured
/// offset and start at rest.
#[derive(Debug, Default)]
pub struct ReproductionSystem {
    last_offspring: usize,
    last_cloned: usize,
}

impl ReproductionSystem {
    /// Create a new reproduction system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of organisms spawned during the last tick.
    pub fn last_offspring(&self) -> usize {
        self.last_offspring
    }

    /// Number of cells cloned during the last tick.
    pub fn last_cloned(&self) -> usize {
        self.last_cloned
    }

    /// Duplicate the connected set of `root`.
    ///
    /// The clone list matches `members` index for index.
    fn clone_organism(
        root: CellId,
        members: &[CellId],
        world: &World,
        offset: Vec2,
    ) -> Offspring {
        let lookup: HashMap<CellId, CellId> =
            members.iter().map(|id| (*id, CellId::new())).collect();
        let root_clone = lookup.get(&root).copied().unwrap_or(root);
        let organism = OrganismId(root_clone);

        let cells = members
            .iter()
            .filter_map(|original| {
                let source = world.get_cell(*original)?;
                let mut clone = source.clone();
                clone.id = lookup.get(original).copied()?;

                for constraint in &mut clone.constraints {
                    if let Some(mapped) = lookup.get(&constraint.target) {
                        constraint.target = *mapped;
                    }
                }
                clone.organism = lookup
                    .get(&source.organism.owner())
                    .map(|owner| OrganismId(*owner))
                    .unwrap_or(organism);

                clone.position += offset;
                clone.previous_position = clone.position;
                Some(clone)
            })
            .collect();

        Offspring {
            root,
            organism,
            cells,
        }
    }
}

impl System for ReproductionSystem {
    fn name(&self) -> &str {
        "reproduction"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let cost = ctx.config.reproduction_cost;
        let offset = ctx.config.reproduction_offset;

        // Identification pays eagerly, so a reserve is spent at most once
        let roots: Vec<CellId> = ctx
            .world
            .query()
            .kind(CellKind::Reproducer)
            .min_energy(cost)
            .execute()
            .into_iter()
            .map(|cell| cell.id)
            .collect();
        for root in &roots {
            ctx.world.add_energy(*root, -cost);
        }

        if roots.is_empty() {
            self.last_offspring = 0;
            self.last_cloned = 0;
            tracing::trace!("no reproducer can afford a clone");
            return Ok(());
        }

        let world: &World = &*ctx.world;
        let links = LinkIndex::build(world);
        let offspring: Vec<Offspring> = roots
            .par_iter()
            .map(|root| {
                let members = links.traverse(*root);
                Self::clone_organism(*root, &members, world, offset)
            })
            .collect();

        let mut buffer = CommandBuffer::new();
        for child in &offspring {
            buffer.extend(
                child
                    .cells
                    .iter()
                    .map(|cell| Command::Spawn(Box::new(cell.clone()))),
            );
        }
        let report = buffer.playback(ctx.world);

        self.last_offspring = offspring.len();
        self.last_cloned = report.applied;
        for child in offspring {
            ctx.emit(
                SimEventKind::Reproduced {
                    root: child.root,
                    organism: child.organism,
                    clones: child.cells.len(),
                },
                format!(
                    "{} reproduced into {} ({} cells)",
                    child.root,
                    child.organism,
                    child.cells.len()
                ),
            );
        }

        tracing::debug!(
            offspring = self.last_offspring,
            cloned = self.last_cloned,
            "reproduction pass"
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
