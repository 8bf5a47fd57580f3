//! The per-node evaluation contract.
//!
//! Most nodes only say how to turn their operands into a per-object test
//! ([`Evaluate::bind`]); the provided methods then supply the whole
//! protocol:
//!
//! ```text
//! simple_eval_safe?
//!   yes -> bind once -> one partition pass      (fast path)
//!          bind failed -> fall through
//!   no  -> nested context per candidate -> matches   (slow path)
//! ```
//!
//! Combinators and nodes with bespoke strategies override `eval`,
//! `matches` and `eval_any`, and reuse the free functions here for their
//! fallbacks.

use astrolabe_foundation::{ObjectId, Result};
use astrolabe_universe::UniverseObject;
use tracing::{debug, trace};

use crate::context::ScriptingContext;
use crate::invariance::Invariance;
use crate::partition::{ObjectSet, SearchDomain, transfer_all, transfer_by, transfer_objects};
use crate::text::StringTable;

/// A bound per-object test.
pub(crate) type Matcher<'a> = Box<dyn Fn(&UniverseObject) -> bool + 'a>;

/// Evaluation behaviour of one node kind.
pub(crate) trait Evaluate {
    /// Flags recomputed from the current operands.
    fn invariance(&self) -> Invariance;

    /// Whether an object's result can depend on which other objects share
    /// its input pool, or on how many random draws came before it.
    fn pool_dependent(&self) -> bool {
        false
    }

    /// Evaluates operands in `ctx` and returns the per-object test.
    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>>;

    /// For nodes whose result never depends on the candidate object: the
    /// shared result in this context.
    fn context_test(&self, _ctx: &ScriptingContext<'_>) -> Option<Result<bool>> {
        None
    }

    /// Whether this call may bind operands once for every candidate.
    fn simple_eval_safe(&self, ctx: &ScriptingContext<'_>) -> bool {
        ctx.simple_eval_safe(self.invariance())
    }

    /// Moves objects out of the domain set according to the condition.
    fn eval(
        &self,
        ctx: &ScriptingContext<'_>,
        matches: &mut ObjectSet,
        non_matches: &mut ObjectSet,
        domain: SearchDomain,
    ) {
        eval_bound(self, ctx, matches, non_matches, domain);
    }

    /// Tests `ctx.local_candidate()`.
    fn matches(&self, ctx: &ScriptingContext<'_>) -> bool {
        match_bound(self, ctx)
    }

    /// Whether any of `candidates` passes.
    fn eval_any(&self, ctx: &ScriptingContext<'_>, candidates: &[ObjectId]) -> bool {
        eval_any_bound(self, ctx, candidates)
    }

    /// A superset of the objects that can match.
    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        ctx.universe().object_ids()
    }
}

/// Rendering behaviour of one node kind.
pub(crate) trait Describe {
    /// Human sentence.
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String;

    /// Canonical structural dump, newline-terminated.
    fn dump(&self, indent: usize) -> String;

    /// Structural checksum.
    fn checksum(&self) -> u32;
}

// =============================================================================
// Shared algorithms
// =============================================================================

/// The fast-path/slow-path partition algorithm.
pub(crate) fn eval_bound<N: Evaluate + ?Sized>(
    node: &N,
    ctx: &ScriptingContext<'_>,
    matches: &mut ObjectSet,
    non_matches: &mut ObjectSet,
    domain: SearchDomain,
) {
    if node.simple_eval_safe(ctx) {
        if let Some(result) = node.context_test(ctx) {
            match result {
                Ok(pass) => {
                    trace!(pass, "whole-set evaluation");
                    transfer_all(matches, non_matches, domain, pass);
                    return;
                }
                Err(err) => debug!(%err, "whole-set test failed; testing per candidate"),
            }
        } else {
            match node.bind(ctx) {
                Ok(matcher) => {
                    trace!("single-pass evaluation");
                    transfer_objects(ctx.universe(), matches, non_matches, domain, |obj| {
                        matcher(obj)
                    });
                    return;
                }
                Err(err) => debug!(%err, "operand evaluation failed; testing per candidate"),
            }
        }
    } else {
        trace!("operands vary per candidate");
    }
    eval_per_candidate(node, ctx, matches, non_matches, domain);
}

/// Tests each domain object through a nested context.
pub(crate) fn eval_per_candidate<N: Evaluate + ?Sized>(
    node: &N,
    ctx: &ScriptingContext<'_>,
    matches: &mut ObjectSet,
    non_matches: &mut ObjectSet,
    domain: SearchDomain,
) {
    transfer_by(matches, non_matches, domain, |id| {
        node.matches(&ctx.with_local_candidate(id))
    });
}

/// Tests the local candidate by binding operands in its own context.
pub(crate) fn match_bound<N: Evaluate + ?Sized>(node: &N, ctx: &ScriptingContext<'_>) -> bool {
    let Some(candidate) = ctx.local_candidate_object() else {
        return false;
    };
    let result = match node.context_test(ctx) {
        Some(result) => result,
        None => node.bind(ctx).map(|matcher| matcher(candidate)),
    };
    result.unwrap_or_else(|err| {
        debug!(%err, candidate = %candidate.id, "candidate does not match");
        false
    })
}

/// Short-circuiting existence check using the fast path when safe.
pub(crate) fn eval_any_bound<N: Evaluate + ?Sized>(
    node: &N,
    ctx: &ScriptingContext<'_>,
    candidates: &[ObjectId],
) -> bool {
    if candidates.is_empty() {
        return false;
    }
    if node.simple_eval_safe(ctx) {
        match node.context_test(ctx) {
            Some(Ok(pass)) => return pass,
            Some(Err(err)) => debug!(%err, "whole-set test failed; testing per candidate"),
            None => match node.bind(ctx) {
                Ok(matcher) => {
                    return candidates
                        .iter()
                        .filter_map(|&id| ctx.object(id))
                        .any(|obj| matcher(obj));
                }
                Err(err) => debug!(%err, "operand evaluation failed; testing per candidate"),
            },
        }
    }
    candidates
        .iter()
        .any(|&id| node.matches(&ctx.with_local_candidate(id)))
}

/// Existence check by running a full evaluation over a copy.
pub(crate) fn eval_any_by_partition<N: Evaluate + ?Sized>(
    node: &N,
    ctx: &ScriptingContext<'_>,
    candidates: &[ObjectId],
) -> bool {
    let mut matches = Vec::new();
    let mut non_matches = candidates.to_vec();
    node.eval(ctx, &mut matches, &mut non_matches, SearchDomain::NonMatches);
    !matches.is_empty()
}

/// A matcher that runs the node's own `matches` per object.
///
/// Used by nodes whose evaluation cannot be reduced to bound scalars.
pub(crate) fn bind_per_candidate<'a, N: Evaluate + ?Sized>(
    node: &'a N,
    ctx: &ScriptingContext<'a>,
) -> Matcher<'a> {
    let ctx = *ctx;
    Box::new(move |obj| node.matches(&ctx.with_local_candidate(obj.id)))
}

/// Binds an optional operand, keeping `None` as `None`.
pub(crate) fn bind_opt<T: crate::value_ref::ValueKind>(
    value: Option<&crate::value_ref::ValueRef<T>>,
    ctx: &ScriptingContext<'_>,
) -> Result<Option<T>> {
    value.map(|value| value.eval(ctx)).transpose()
}

/// Whether `value` lies in the inclusive range; missing bounds are open.
pub(crate) fn in_range<T: PartialOrd>(value: &T, low: Option<&T>, high: Option<&T>) -> bool {
    low.is_none_or(|low| low <= value) && high.is_none_or(|high| value <= high)
}

/// Text for an optional operand; missing operands read as "any".
pub(crate) fn opt_text<T: crate::value_ref::ValueKind>(
    value: Option<&crate::value_ref::ValueRef<T>>,
    strings: &dyn StringTable,
) -> String {
    value.map_or_else(|| strings.text("DESC_ANY", false, &[]), |value| value.dump())
}

/// Text for a list of alternatives; an empty list reads as "any".
pub(crate) fn list_text<T: std::fmt::Display>(values: &[T], strings: &dyn StringTable) -> String {
    if values.is_empty() {
        return strings.text("DESC_ANY", false, &[]);
    }
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    crate::text::join_alternatives(&items)
}

/// The system an object counts as being in: itself for systems.
pub(crate) fn system_of(obj: &UniverseObject) -> Option<ObjectId> {
    if obj.object_type == astrolabe_foundation::ObjectType::System {
        Some(obj.id)
    } else {
        obj.system_id
    }
}

/// Evaluates a list of string operands.
pub(crate) fn bind_names(
    names: &[crate::value_ref::ValueRef<String>],
    ctx: &ScriptingContext<'_>,
) -> Result<Vec<String>> {
    names.iter().map(|name| name.eval(ctx)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_inclusive_and_open_when_missing() {
        assert!(in_range(&2, Some(&2), Some(&4)));
        assert!(in_range(&4, Some(&2), Some(&4)));
        assert!(!in_range(&5, Some(&2), Some(&4)));
        assert!(in_range(&-100, None, Some(&4)));
        assert!(in_range(&100, None, None));
    }
}
