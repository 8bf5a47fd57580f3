//! Content conditions looked up by name.
//!
//! `Location` and `CombatTarget` resolve a condition from the
//! [`ContentLibrary`](crate::ContentLibrary) at evaluation time and evaluate
//! it in their place. Unknown content, a condition that resolves to the node
//! itself, and nesting past `EvaluationConfig::max_resolution_depth` all
//! match nothing; the failure is logged once per call.

use std::cell::Cell;

use astrolabe_foundation::{ContentType, Error, ErrorContext, ObjectId, Result};
use tracing::{debug, warn};

use super::node::{Describe, Evaluate, Matcher, bind_opt, eval_any_by_partition};
use super::{Condition, ConditionKind};
use crate::checksum::Checksummer;
use crate::context::ScriptingContext;
use crate::invariance::{Invariance, Invariant};
use crate::partition::{ObjectSet, SearchDomain, transfer_all, transfer_by};
use crate::text::{DumpLine, StringTable};
use crate::value_ref::ValueRef;

/// A node that stands for a named content condition.
trait Lookup {
    const KIND: &'static str;

    /// Flags of the operands naming the content.
    fn name_invariance(&self) -> Invariance;

    /// The content name and its condition.
    fn find<'a>(&self, ctx: &ScriptingContext<'a>) -> Result<(String, &'a Condition)>;

    /// Whether `condition` is this very node.
    fn is_self(&self, condition: &Condition) -> bool;
}

/// The content condition and the context one resolution deeper.
fn resolve<'a, L: Lookup>(
    node: &L,
    ctx: &ScriptingContext<'a>,
) -> Result<(&'a Condition, ScriptingContext<'a>)> {
    let resolved = node.find(ctx).and_then(|(name, condition)| {
        if node.is_self(condition) {
            return Err(Error::cyclic_resolution(name));
        }
        Ok((condition, ctx.deeper(&name)?))
    });
    resolved.map_err(|err| {
        let mut context = ErrorContext::new().with_node(L::KIND);
        if let Some(candidate) = ctx.local_candidate() {
            context = context.with_candidate(candidate);
        }
        err.with_context(context)
    })
}

fn report(err: &Error) {
    warn!(%err, "content condition unavailable; matching nothing");
}

fn eval_resolved<L: Lookup>(
    node: &L,
    ctx: &ScriptingContext<'_>,
    matches: &mut ObjectSet,
    non_matches: &mut ObjectSet,
    domain: SearchDomain,
) {
    if ctx.simple_eval_safe(node.name_invariance()) {
        match resolve(node, ctx) {
            Ok((condition, inner)) => condition.eval(&inner, matches, non_matches, domain),
            Err(err) => {
                report(&err);
                transfer_all(matches, non_matches, domain, false);
            }
        }
        return;
    }

    let reported = Cell::new(false);
    transfer_by(matches, non_matches, domain, |id| {
        match resolve(node, &ctx.with_local_candidate(id)) {
            Ok((condition, inner)) => condition.matches(&inner),
            Err(err) => {
                if !reported.replace(true) {
                    report(&err);
                }
                false
            }
        }
    });
}

/// Single-candidate tests run once per candidate of some enclosing call, so
/// failures stay at debug level here.
fn match_resolved<L: Lookup>(node: &L, ctx: &ScriptingContext<'_>) -> bool {
    match resolve(node, ctx) {
        Ok((condition, inner)) => condition.matches(&inner),
        Err(err) => {
            debug!(%err, "content condition unavailable for candidate");
            false
        }
    }
}

fn bind_resolved<'a, L: Lookup>(node: &L, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
    let (condition, inner) = resolve(node, ctx)?;
    Ok(Box::new(move |obj| {
        condition.matches(&inner.with_local_candidate(obj.id))
    }))
}

macro_rules! lookup_evaluate {
    ($node:ty) => {
        impl Evaluate for $node {
            /// The resolved condition is unknown until evaluation.
            fn invariance(&self) -> Invariance {
                Invariance::NONE
            }

            fn pool_dependent(&self) -> bool {
                true
            }

            fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
                bind_resolved(self, ctx)
            }

            fn eval(
                &self,
                ctx: &ScriptingContext<'_>,
                matches: &mut ObjectSet,
                non_matches: &mut ObjectSet,
                domain: SearchDomain,
            ) {
                eval_resolved(self, ctx, matches, non_matches, domain);
            }

            fn matches(&self, ctx: &ScriptingContext<'_>) -> bool {
                match_resolved(self, ctx)
            }

            fn eval_any(&self, ctx: &ScriptingContext<'_>, candidates: &[ObjectId]) -> bool {
                eval_any_by_partition(self, ctx, candidates)
            }
        }
    };
}

// =============================================================================
// Location
// =============================================================================

/// Matches where the named content could be produced or placed.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub(crate) content_type: ContentType,
    pub(crate) name: ValueRef<String>,
    pub(crate) name2: Option<ValueRef<String>>,
}

impl Condition {
    /// The location condition of a piece of content.
    #[must_use]
    pub fn location(content_type: ContentType, name: impl Into<ValueRef<String>>) -> Self {
        Location {
            content_type,
            name: name.into(),
            name2: None,
        }
        .into()
    }

    /// The location condition of content keyed by two names, such as a focus
    /// on a particular species.
    #[must_use]
    pub fn location_with(
        content_type: ContentType,
        name: impl Into<ValueRef<String>>,
        name2: impl Into<ValueRef<String>>,
    ) -> Self {
        Location {
            content_type,
            name: name.into(),
            name2: Some(name2.into()),
        }
        .into()
    }
}

impl Lookup for Location {
    const KIND: &'static str = "Location";

    fn name_invariance(&self) -> Invariance {
        self.name.invariance().and(self.name2.invariance())
    }

    fn find<'a>(&self, ctx: &ScriptingContext<'a>) -> Result<(String, &'a Condition)> {
        let name = self.name.eval(ctx)?;
        let name2 = bind_opt(self.name2.as_ref(), ctx)?.unwrap_or_default();
        let condition = ctx
            .content()
            .location(self.content_type, &name, &name2)
            .ok_or_else(|| Error::unresolved_content(self.content_type.to_string(), &name))?;
        Ok((name, condition))
    }

    fn is_self(&self, condition: &Condition) -> bool {
        matches!(condition.kind(), ConditionKind::Location(node) if node == self)
    }
}

lookup_evaluate!(Location);

impl Describe for Location {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let args = [self.content_type.to_string(), self.name.dump()];
        strings.text("DESC_LOCATION", negated, &args)
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Location")
            .field("contenttype", self.content_type)
            .field("name", &self.name)
            .opt_field("name2", self.name2.as_ref())
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Location")
            .add(&self.content_type)
            .add(&self.name)
            .add(&self.name2)
            .finish()
    }
}

// =============================================================================
// CombatTarget
// =============================================================================

/// Matches what the named content may target in combat.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatTarget {
    pub(crate) content_type: ContentType,
    pub(crate) name: ValueRef<String>,
}

impl Condition {
    /// The combat targeting condition of a piece of content.
    #[must_use]
    pub fn combat_target(content_type: ContentType, name: impl Into<ValueRef<String>>) -> Self {
        CombatTarget {
            content_type,
            name: name.into(),
        }
        .into()
    }
}

impl Lookup for CombatTarget {
    const KIND: &'static str = "CombatTarget";

    fn name_invariance(&self) -> Invariance {
        self.name.invariance()
    }

    fn find<'a>(&self, ctx: &ScriptingContext<'a>) -> Result<(String, &'a Condition)> {
        let name = self.name.eval(ctx)?;
        let condition = ctx
            .content()
            .combat_targets(self.content_type, &name)
            .ok_or_else(|| Error::unresolved_content(self.content_type.to_string(), &name))?;
        Ok((name, condition))
    }

    fn is_self(&self, condition: &Condition) -> bool {
        matches!(condition.kind(), ConditionKind::CombatTarget(node) if node == self)
    }
}

lookup_evaluate!(CombatTarget);

impl Describe for CombatTarget {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let args = [self.content_type.to_string(), self.name.dump()];
        strings.text("DESC_COMBAT_TARGET", negated, &args)
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "CombatTarget")
            .field("contenttype", self.content_type)
            .field("name", &self.name)
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("CombatTarget")
            .add(&self.content_type)
            .add(&self.name)
            .finish()
    }
}
