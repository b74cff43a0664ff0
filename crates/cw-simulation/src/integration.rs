use cw_core::{Cell, CellId, World};
use glam::Vec2;
use rayon::prelude::*;

use crate::context::SimContext;
use crate::error::SimResult;
use crate::system::System;

/// Position and previous position after one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Step {
    position: Vec2,
    previous: Vec2,
    bounced: bool,
}

/// Advances every cell from its implicit velocity.
///
/// Velocity is `position - previous_position`, damped by the cell's friction.
/// A step that would leave the world is clamped to the boundary, and the
/// previous position is rewritten so the next tick moves back inward at
/// `bounciness` times the speed.
#[derive(Debug, Default)]
pub struct IntegrationSystem {
    last_bounced: usize,
}

impl IntegrationSystem {
    /// Create a new integration system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells that hit a boundary during the last tick.
    pub fn last_bounced(&self) -> usize {
        self.last_bounced
    }

    fn step(cell: &Cell, half_extents: Vec2) -> Step {
        let velocity = cell.velocity() * cell.physics.friction;
        let candidate = cell.position + velocity;
        let clamped = candidate.clamp(-half_extents, half_extents);

        // Un-clamped axes keep the plain verlet snapshot
        let mut previous = cell.position;
        let mut bounced = false;
        if clamped.x != candidate.x {
            previous.x = clamped.x + velocity.x * cell.physics.bounciness;
            bounced = true;
        }
        if clamped.y != candidate.y {
            previous.y = clamped.y + velocity.y * cell.physics.bounciness;
            bounced = true;
        }

        Step {
            position: clamped,
            previous,
            bounced,
        }
    }
}

impl System for IntegrationSystem {
    fn name(&self) -> &str {
        "integration"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let half_extents = ctx.config.world_half_extents;
        let world: &World = &*ctx.world;
        let ids: Vec<CellId> = world.cell_ids().collect();

        let steps: Vec<(CellId, Step)> = ids
            .par_iter()
            .filter_map(|id| {
                let cell = world.get_cell(*id)?;
                Some((*id, Self::step(cell, half_extents)))
            })
            .collect();

        self.last_bounced = 0;
        for (id, step) in steps {
            if let Some(cell) = ctx.world.get_cell_mut(id) {
                cell.position = step.position;
                cell.previous_position = step.previous;
            }
            if step.bounced {
                self.last_bounced += 1;
            }
        }

        tracing::debug!(bounced = self.last_bounced, "integration pass");
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
