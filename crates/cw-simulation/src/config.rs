use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Cells are confined to `[-x, x] x [-y, y]`.
    pub world_half_extents: Vec2,
    /// Broadphase cell size shared by collision, merging, and eating.
    /// Must be at least the largest summed radii of any interacting pair.
    pub grid_cell_size: f32,
    /// Energy a reproducer spends per clone.
    pub reproduction_cost: f32,
    /// Energy credited per food cell eaten.
    pub food_value: f32,
    /// Stiffness of links created by merging.
    pub merge_stiffness: f32,
    /// Displacement applied to every clone relative to its original.
    pub reproduction_offset: Vec2,
    /// Most cells a single broadphase bucket may hold before the tick fails.
    pub max_bucket_occupancy: usize,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_half_extents: Vec2::new(50.0, 50.0),
            grid_cell_size: 2.0,
            reproduction_cost: 50.0,
            food_value: 5.0,
            merge_stiffness: 0.1,
            reproduction_offset: Vec2::new(5.0, 5.0),
            max_bucket_occupancy: 4096,
            max_events: 0,
        }
    }
}

impl SimConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SimError::InvalidConfig(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the world half extents.
    pub fn with_world_half_extents(mut self, extents: Vec2) -> Self {
        self.world_half_extents = extents;
        self
    }

    /// Set the broadphase cell size.
    pub fn with_grid_cell_size(mut self, size: f32) -> Self {
        self.grid_cell_size = size;
        self
    }

    /// Set the reproduction cost.
    pub fn with_reproduction_cost(mut self, cost: f32) -> Self {
        self.reproduction_cost = cost;
        self
    }

    /// Set the energy credited per food cell.
    pub fn with_food_value(mut self, value: f32) -> Self {
        self.food_value = value;
        self
    }

    /// Set the stiffness of merge links.
    pub fn with_merge_stiffness(mut self, stiffness: f32) -> Self {
        self.merge_stiffness = stiffness;
        self
    }

    /// Set the clone offset.
    pub fn with_reproduction_offset(mut self, offset: Vec2) -> Self {
        self.reproduction_offset = offset;
        self
    }

    /// Set the broadphase bucket limit.
    pub fn with_max_bucket_occupancy(mut self, max: usize) -> Self {
        self.max_bucket_occupancy = max;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Reject values the systems cannot work with.
    pub fn validate(&self) -> SimResult<()> {
        let extents = self.world_half_extents;
        if !(extents.is_finite() && extents.x > 0.0 && extents.y > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "world half extents must be positive, got {extents}"
            )));
        }
        if !(self.grid_cell_size.is_finite() && self.grid_cell_size > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "grid cell size must be positive, got {}",
                self.grid_cell_size
            )));
        }
        if !(self.reproduction_cost.is_finite() && self.reproduction_cost >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "reproduction cost must be non-negative, got {}",
                self.reproduction_cost
            )));
        }
        if !(self.food_value.is_finite() && self.food_value >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "food value must be non-negative, got {}",
                self.food_value
            )));
        }
        if !(0.0..=1.0).contains(&self.merge_stiffness) {
            return Err(SimError::InvalidConfig(format!(
                "merge stiffness must be in [0, 1], got {}",
                self.merge_stiffness
            )));
        }
        if !self.reproduction_offset.is_finite() {
            return Err(SimError::InvalidConfig(
                "reproduction offset must be finite".into(),
            ));
        }
        if self.max_bucket_occupancy == 0 {
            return Err(SimError::InvalidConfig(
                "max bucket occupancy must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
