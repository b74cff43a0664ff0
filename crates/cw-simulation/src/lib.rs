//! Tick-based soft-body simulation for CircleWorld organisms.
//!
//! Provides a system-based simulation framework operating on a
//! [`cw_core::World`]. Each tick runs collision, constraint relaxation,
//! motion integration, merging, eating, and reproduction in that order.
//! Systems scan the world in parallel against a read-only snapshot and
//! apply every write afterwards on a single thread, either directly or
//! through a [`CommandBuffer`].

/// Simulation clock for tracking ticks.
pub mod clock;
/// Overlap resolution between cells.
pub mod collision;
/// Deferred writes: command buffer and energy queue.
pub mod commands;
/// Configuration types for simulation runs.
pub mod config;
/// Mutable context passed to systems each tick.
pub mod context;
/// Mouths consuming food.
pub mod eating;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Uniform-grid broadphase.
pub mod grid;
/// Verlet integration with boundary bounce.
pub mod integration;
/// Organism merging through connectors.
pub mod merging;
/// Elastic link relaxation.
pub mod relaxation;
/// Organism cloning.
pub mod reproduction;
/// Top-level simulation orchestrator.
pub mod simulation;
/// The trait that all simulation systems implement.
pub mod system;

/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-export of [`collision::CollisionSystem`].
pub use collision::CollisionSystem;
/// Re-exports of the deferred-write types.
pub use commands::{Command, CommandBuffer, EnergyGain, EnergyQueue, Playback};
/// Re-export of [`config::SimConfig`].
pub use config::SimConfig;
/// Re-export of [`context::SimContext`].
pub use context::SimContext;
/// Re-export of [`eating::EatingSystem`].
pub use eating::EatingSystem;
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], and [`event::SimEventKind`].
pub use event::{EventLog, SimEvent, SimEventKind};
/// Re-export of [`grid::SpatialGrid`].
pub use grid::SpatialGrid;
/// Re-export of [`integration::IntegrationSystem`].
pub use integration::IntegrationSystem;
/// Re-export of [`merging::MergingSystem`].
pub use merging::MergingSystem;
/// Re-export of [`relaxation::ConstraintRelaxationSystem`].
pub use relaxation::ConstraintRelaxationSystem;
/// Re-export of [`reproduction::ReproductionSystem`].
pub use reproduction::ReproductionSystem;
/// Re-export of [`simulation::Simulation`].
pub use simulation::Simulation;
/// Re-export of [`system::System`].
pub use system::System;
