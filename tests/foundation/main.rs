//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: identifiers, enumerations, Value and Error.

mod errors;
mod types;
mod values;
