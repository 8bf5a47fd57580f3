//! Core identifiers, enumerations, values and errors for Astrolabe.
//!
//! This crate provides:
//! - [`ObjectId`] and [`EmpireId`] - Copyable handles into caller-owned registries
//! - [`ObjectType`], [`MeterType`] and the other domain enumerations
//! - [`Value`] - Dynamically typed property values read from objects
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod id;
pub mod types;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use id::{EmpireId, ObjectId};
pub use types::{
    Affiliation, ContentType, DiplomaticStatus, MeterType, ObjectType, PlanetType, StarType,
    Visibility,
};
pub use value::Value;
