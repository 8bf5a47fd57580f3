//! Integration tests for Layer 1: Universe
//!
//! Tests for the object arena, starlanes, registries and pathfinding.

mod objects;
mod pathfinding;
mod registries;
