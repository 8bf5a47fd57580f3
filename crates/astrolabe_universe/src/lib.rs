//! Object graph, starlanes and read-only registries for Astrolabe.
//!
//! This crate provides:
//! - [`Universe`] - Immutable object arena with structural sharing
//! - [`UniverseObject`] - The attributes conditions read from an object
//! - [`EmpireRegistry`], [`SpeciesRegistry`], [`SupplyRegistry`] - Read-only lookups
//! - [`Pathfinder`] - Starlane jump distances, with [`LanePathfinder`] as the default

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod object;
pub mod pathfinding;
pub mod registry;
pub mod universe;

pub use object::{ObjectProperty, Special, UniverseObject};
pub use pathfinding::{LanePathfinder, Pathfinder};
pub use registry::{
    EmpireRecord, EmpireRegistry, EmpireTable, SpeciesRecord, SpeciesRegistry, SpeciesTable,
    SupplyRegistry, SupplyTable,
};
pub use universe::Universe;
