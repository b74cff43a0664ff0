//! Core types for CircleWorld: cells, elastic links, and the cell store.
//!
//! This crate defines the data model the simulation engine operates on. It
//! is independent of the engine; spawners and renderers can build and read a
//! [`World`] directly.

/// Cells, their kinds, physical properties, and constraints.
pub mod cell;
/// Error types used throughout the crate.
pub mod error;
/// Undirected link adjacency and organism-graph traversal.
pub mod graph;
/// Query builder for filtering cells.
pub mod query;
/// The cell store.
pub mod world;

/// Re-export core cell types.
pub use cell::{Cell, CellId, CellKind, Constraint, OrganismId, PhysicsProperties};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export the link index.
pub use graph::LinkIndex;
/// Re-export the query builder.
pub use query::CellQuery;
/// Re-export the store.
pub use world::World;
/// Re-export of the vector type used for positions.
pub use glam::Vec2;
