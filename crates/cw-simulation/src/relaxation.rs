use cw_core::{Cell, CellId, World};
use glam::Vec2;
use rayon::prelude::*;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::system::System;

/// Links shorter than this have no usable direction and are skipped.
const MIN_LINK_LENGTH: f32 = 0.0001;

/// Nudges linked cells toward their links' rest lengths.
///
/// One position-based pass per tick. A cell walks its own links in order,
/// carrying its corrected position from one link to the next, while every
/// target is read where it stood when the pass began. Each link end moves by
/// half the error, so a symmetric pair meets in the middle.
#[derive(Debug, Default)]
pub struct ConstraintRelaxationSystem {
    last_relaxed: usize,
}

impl ConstraintRelaxationSystem {
    /// Create a new relaxation system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells moved during the last tick.
    pub fn last_relaxed(&self) -> usize {
        self.last_relaxed
    }

    fn relax(cell: &Cell, world: &World) -> Vec2 {
        let mut working = cell.position;
        for constraint in &cell.constraints {
            let Some(target) = world.get_cell(constraint.target) else {
                tracing::trace!(cell = %cell.id, target = %constraint.target, "skipping dangling link");
                continue;
            };

            let delta = target.position - working;
            let distance = delta.length();
            if distance < MIN_LINK_LENGTH {
                continue;
            }

            let correction = (distance - constraint.rest_length) * constraint.stiffness * 0.5;
            working += delta / distance * correction;
        }
        working
    }
}

impl System for ConstraintRelaxationSystem {
    fn name(&self) -> &str {
        "constraint_relaxation"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let world: &World = &*ctx.world;
        let ids: Vec<CellId> = world.cell_ids().collect();

        let moved: Vec<(CellId, Vec2)> = ids
            .par_iter()
            .filter_map(|id| {
                let cell = world.get_cell(*id)?;
                if cell.constraints.is_empty() {
                    return None;
                }
                let relaxed = Self::relax(cell, world);
                (relaxed != cell.position).then_some((*id, relaxed))
            })
            .collect();

        self.last_relaxed = moved.len();
        for (id, position) in moved {
            ctx.world.set_position(id, position);
        }

        tracing::debug!(relaxed = self.last_relaxed, "relaxation pass");
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
