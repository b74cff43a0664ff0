use cw_core::{Cell, CellId, CellKind, OrganismId, World};
use rayon::prelude::*;

use crate::commands::{Command, CommandBuffer, EnergyGain, EnergyQueue};
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::grid::SpatialGrid;
use crate::system::System;

/// A mouth's claim on a food cell, found during the parallel scan.
#[derive(Debug, Clone, Copy)]
struct Meal {
    mouth: CellId,
    food: CellId,
    organism: OrganismId,
}

/// Mouths consume overlapping food and credit their organism.
///
/// Runs in two phases. The scan is read-only and parallel over mouths; it
/// records food destruction into a [`CommandBuffer`] and credits into an
/// [`EnergyQueue`]. The queue is then drained on one thread, so any number
/// of mouths feeding the same organism add up correctly. Every mouth
/// overlapping a food cell is credited for it, even when several share it.
#[derive(Debug, Default)]
pub struct EatingSystem {
    last_meals: usize,
}

impl EatingSystem {
    /// Create a new eating system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mouth-on-food meals during the last tick. A food cell shared
    /// by two mouths counts twice.
    pub fn last_meals(&self) -> usize {
        self.last_meals
    }

    fn overlapping_food(mouth: &Cell, grid: &SpatialGrid, world: &World) -> Vec<Meal> {
        grid.neighborhood(mouth.position)
            .filter_map(|id| world.get_cell(id))
            .filter(|food| {
                let reach = mouth.physics.radius + food.physics.radius;
                mouth.position.distance_squared(food.position) < reach * reach
            })
            .map(|food| Meal {
                mouth: mouth.id,
                food: food.id,
                organism: mouth.organism,
            })
            .collect()
    }
}

impl System for EatingSystem {
    fn name(&self) -> &str {
        "eating"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let food_value = ctx.config.food_value;
        let world: &World = &*ctx.world;
        let grid = SpatialGrid::from_config(world, ctx.config, |c| c.kind == CellKind::Food)?;
        if grid.is_empty() {
            self.last_meals = 0;
            tracing::trace!("no food in the world");
            return Ok(());
        }

        // Phase 1: parallel scan, reads only
        let meals: Vec<Meal> = world
            .ids_by_kind(CellKind::Mouth)
            .par_iter()
            .flat_map_iter(|id| {
                world
                    .get_cell(*id)
                    .map(|mouth| Self::overlapping_food(mouth, &grid, world))
                    .unwrap_or_default()
            })
            .collect();

        let mut buffer = CommandBuffer::new();
        buffer.par_extend(meals.par_iter().map(|meal| Command::Destroy(meal.food)));
        let mut queue = EnergyQueue::new();
        queue.par_extend(meals.par_iter().map(|meal| EnergyGain {
            organism: meal.organism,
            amount: food_value,
        }));

        // Phase 2: sequential. A food shared by several mouths is destroyed
        // by the first Destroy; the rest are skipped.
        let report = buffer.playback(ctx.world);
        let credited = queue.drain_into(ctx.world);

        self.last_meals = meals.len();
        for meal in &meals {
            ctx.emit(
                SimEventKind::FoodEaten {
                    mouth: meal.mouth,
                    food: meal.food,
                    organism: meal.organism,
                },
                format!("mouth {} ate food {}", meal.mouth, meal.food),
            );
        }
        for (gain, total) in &credited {
            ctx.emit(
                SimEventKind::EnergyGained {
                    organism: gain.organism,
                    amount: gain.amount,
                    total: *total,
                },
                format!("{} gained {} energy (now {total})", gain.organism, gain.amount),
            );
        }

        tracing::debug!(
            meals = self.last_meals,
            destroyed = report.applied,
            credited = credited.len(),
            "eating pass"
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
