//! Bounded-count selection strategies for `SortedNumberOf`.
//!
//! Given a pool of candidates and, for the sorting strategies, a key per
//! candidate, pick at most `n` objects:
//!
//! | method | picks |
//! |---|---|
//! | `Random` | uniformly, from the context RNG |
//! | `Min` | smallest keys, ties by ascending id |
//! | `Max` | largest keys, ties by descending id |
//! | `Mode` | objects whose key is most common first |
//! | `Unique` | the first object of each distinct key |

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use astrolabe_foundation::{ObjectId, Result};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::checksum::{CheckSum, Checksummer};
use crate::context::ScriptingContext;
use crate::invariance::{Invariance, Invariant};
use crate::value_ref::ValueRef;

/// How `SortedNumberOf` chooses among its pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortingMethod {
    /// Uniformly random choice.
    Random,
    /// Smallest sort keys first.
    Min,
    /// Largest sort keys first.
    Max,
    /// Most common sort keys first.
    Mode,
    /// One object per distinct sort key.
    Unique,
}

impl SortingMethod {
    /// Name used in dumps and checksums.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Random => "Random",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Mode => "Mode",
            Self::Unique => "Unique",
        }
    }
}

impl CheckSum for SortingMethod {
    fn check_sum(&self) -> u32 {
        self.name().check_sum()
    }
}

/// The expression objects are sorted by.
#[derive(Clone, Debug, PartialEq)]
pub enum SortKey {
    /// A numeric key.
    Number(ValueRef<f64>),
    /// A text key.
    Text(ValueRef<String>),
}

impl SortKey {
    /// Canonical single-line text.
    #[must_use]
    pub fn dump(&self) -> String {
        match self {
            Self::Number(key) => key.dump(),
            Self::Text(key) => key.dump(),
        }
    }

    /// Evaluates the key for the context's local candidate.
    ///
    /// # Errors
    /// Returns an error when the key expression fails to evaluate.
    pub fn eval(&self, ctx: &ScriptingContext<'_>) -> Result<SortValue> {
        match self {
            Self::Number(key) => key.eval(ctx).map(SortValue::Number),
            Self::Text(key) => key.eval(ctx).map(SortValue::Text),
        }
    }
}

impl Invariant for SortKey {
    fn invariance(&self) -> Invariance {
        match self {
            Self::Number(key) => key.invariance(),
            Self::Text(key) => key.invariance(),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

impl CheckSum for SortKey {
    fn check_sum(&self) -> u32 {
        match self {
            Self::Number(key) => Checksummer::tagged("Number").add(key).finish(),
            Self::Text(key) => Checksummer::tagged("Text").add(key).finish(),
        }
    }
}

/// An evaluated sort key.
///
/// Totally ordered: numbers before text, numbers by IEEE total order.
#[derive(Clone, Debug)]
pub enum SortValue {
    /// A numeric key value.
    Number(f64),
    /// A text key value.
    Text(String),
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

/// Picks up to `n` ids uniformly at random.
pub fn select_random(mut pool: Vec<ObjectId>, n: usize, rng: &mut impl Rng) -> Vec<ObjectId> {
    let n = n.min(pool.len());
    let (chosen, _) = pool.partial_shuffle(rng, n);
    chosen.to_vec()
}

/// Picks the `n` smallest keys, ties broken by ascending id.
pub fn select_min(mut keyed: Vec<(SortValue, ObjectId)>, n: usize) -> Vec<ObjectId> {
    keyed.sort();
    keyed.into_iter().take(n).map(|(_, id)| id).collect()
}

/// Picks the `n` largest keys, ties broken by descending id.
pub fn select_max(mut keyed: Vec<(SortValue, ObjectId)>, n: usize) -> Vec<ObjectId> {
    keyed.sort_by(|a, b| b.cmp(a));
    keyed.into_iter().take(n).map(|(_, id)| id).collect()
}

/// Picks objects from the most common keys first.
///
/// Groups are ordered by size, largest first; equally large groups keep
/// ascending key order. Within a group, objects keep pool order.
pub fn select_mode(keyed: Vec<(SortValue, ObjectId)>, n: usize) -> Vec<ObjectId> {
    let mut groups: BTreeMap<SortValue, Vec<ObjectId>> = BTreeMap::new();
    for (key, id) in keyed {
        groups.entry(key).or_default().push(id);
    }
    let mut groups: Vec<Vec<ObjectId>> = groups.into_values().collect();
    // Stable, so equal counts keep ascending key order.
    groups.sort_by(|a, b| b.len().cmp(&a.len()));
    groups.into_iter().flatten().take(n).collect()
}

/// Picks the first object of each distinct key, in pool order.
pub fn select_unique(keyed: Vec<(SortValue, ObjectId)>, n: usize) -> Vec<ObjectId> {
    let mut seen = BTreeSet::new();
    keyed
        .into_iter()
        .filter(|(key, _)| seen.insert(key.clone()))
        .map(|(_, id)| id)
        .take(n)
        .collect()
}
