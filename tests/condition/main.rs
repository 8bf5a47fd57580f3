//! Integration tests for Layer 2: Condition
//!
//! Tests for condition evaluation against registries, value references and
//! rendering.

mod evaluation;
mod rendering;
mod value_refs;
