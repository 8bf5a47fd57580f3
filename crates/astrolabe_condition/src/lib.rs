//! Condition trees, partition evaluation, sampling and lane geometry for Astrolabe.
//!
//! This crate provides:
//! - [`Condition`] - Immutable condition trees over ~50 node kinds
//! - [`ScriptingContext`] - The read-only bundle every evaluation receives
//! - [`ValueRef`] - Literal and computed operands with invariance tracking
//! - [`geometry`] - Segment crossing, angular closeness and proximity tests
//! - [`selection`] - Bounded-count selection strategies
//!
//! # Evaluation protocol
//!
//! ```text
//! eval(ctx, matches, non_matches, domain)
//!   domain = Matches     -> objects failing the condition leave `matches`
//!   domain = NonMatches  -> objects passing the condition leave `non_matches`
//! ```
//!
//! Objects outside the domain set are never touched.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod checksum;
pub mod condition;
pub mod config;
pub mod content;
pub mod context;
pub mod geometry;
pub mod invariance;
pub mod partition;
pub mod selection;
pub mod text;
pub mod value_ref;

pub use checksum::{CheckSum, Checksummer};
pub use condition::{Condition, ConditionKind};
pub use config::EvaluationConfig;
pub use content::{ContentLibrary, StaticContent};
pub use context::{ScriptingContext, SharedRng, seeded_rng, seeded_rng_from};
pub use invariance::{Invariance, Invariant};
pub use partition::{ObjectSet, SearchDomain};
pub use selection::{SortKey, SortValue, SortingMethod};
pub use text::{EnglishStrings, StringTable};
pub use value_ref::{ComparisonType, OpType, ReferenceType, StatisticType, ValueKind, ValueRef};
