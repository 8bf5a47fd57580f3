//! Astrolabe - Condition evaluation over a galaxy object graph
//!
//! This crate re-exports all layers of the Astrolabe system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: astrolabe_condition - Condition trees, value references, sampling, lane geometry
//! Layer 1: astrolabe_universe  - Object arena, starlanes, registries, pathfinding
//! Layer 0: astrolabe_foundation - Core types (ObjectId, Value, Error)
//! ```

pub use astrolabe_condition as condition;
pub use astrolabe_foundation as foundation;
pub use astrolabe_universe as universe;
