//! Logical combinators.

use std::mem;

use astrolabe_foundation::{ObjectId, Result};

use super::node::{
    Describe, Evaluate, Matcher, bind_per_candidate, eval_any_by_partition,
};
use super::{Condition, ConditionKind, any_pool_dependent, describe_all};
use crate::checksum::Checksummer;
use crate::context::ScriptingContext;
use crate::invariance::{Invariance, Invariant};
use crate::partition::{ObjectSet, SearchDomain, restore_order, transfer_all};
use crate::text::{StringTable, indent};

fn dump_list(name: &str, operands: &[Condition], level: usize) -> String {
    let mut out = format!("{}{name} [\n", indent(level));
    for operand in operands {
        out.push_str(&operand.dump(level + 1));
    }
    out.push_str(&indent(level));
    out.push_str("]\n");
    out
}

fn union_of_defaults(operands: &[Condition], ctx: &ScriptingContext<'_>) -> ObjectSet {
    let mut seen = std::collections::HashSet::new();
    operands
        .iter()
        .flat_map(|operand| operand.default_candidates(ctx))
        .filter(|id| seen.insert(*id))
        .collect()
}

// =============================================================================
// And
// =============================================================================

/// Matches objects every operand matches.
#[derive(Clone, Debug, PartialEq)]
pub struct And {
    pub(crate) operands: Vec<Condition>,
}

impl Condition {
    /// All operands must match. Nested `And`s are flattened.
    #[must_use]
    pub fn and(operands: impl IntoIterator<Item = Condition>) -> Self {
        let mut flat = Vec::new();
        for operand in operands {
            match operand.kind {
                ConditionKind::And(inner) => flat.extend(inner.operands),
                _ => flat.push(operand),
            }
        }
        And { operands: flat }.into()
    }
}

impl Evaluate for And {
    fn invariance(&self) -> Invariance {
        self.operands.invariance()
    }

    fn pool_dependent(&self) -> bool {
        any_pool_dependent(&self.operands)
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        Ok(bind_per_candidate(self, ctx))
    }

    fn eval(
        &self,
        ctx: &ScriptingContext<'_>,
        matches: &mut ObjectSet,
        non_matches: &mut ObjectSet,
        domain: SearchDomain,
    ) {
        let Some((first, rest)) = self.operands.split_first() else {
            transfer_all(matches, non_matches, domain, true);
            return;
        };
        match domain {
            SearchDomain::Matches => {
                for operand in &self.operands {
                    if matches.is_empty() {
                        break;
                    }
                    operand.eval(ctx, matches, non_matches, SearchDomain::Matches);
                }
            }
            SearchDomain::NonMatches => {
                // Promote what the first operand accepts, then narrow that
                // batch by the rest, returning rejects to non_matches.
                let mut candidates = Vec::new();
                first.eval(ctx, &mut candidates, non_matches, SearchDomain::NonMatches);
                for operand in rest {
                    if candidates.is_empty() {
                        break;
                    }
                    operand.eval(ctx, &mut candidates, non_matches, SearchDomain::Matches);
                }
                matches.append(&mut candidates);
            }
        }
    }

    fn matches(&self, ctx: &ScriptingContext<'_>) -> bool {
        self.operands.iter().all(|operand| operand.matches(ctx))
    }

    fn eval_any(&self, ctx: &ScriptingContext<'_>, candidates: &[ObjectId]) -> bool {
        eval_any_by_partition(self, ctx, candidates)
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        self.operands
            .first()
            .map_or_else(|| ctx.universe().object_ids(), |first| first.default_candidates(ctx))
    }
}

impl Describe for And {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_AND", negated, &[describe_all(&self.operands, strings, false)])
    }

    fn dump(&self, level: usize) -> String {
        dump_list("And", &self.operands, level)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("And").add(&self.operands).finish()
    }
}

// =============================================================================
// Or
// =============================================================================

/// Matches objects any operand matches.
#[derive(Clone, Debug, PartialEq)]
pub struct Or {
    pub(crate) operands: Vec<Condition>,
}

impl Condition {
    /// Any operand may match. Nested `Or`s are flattened.
    #[must_use]
    pub fn or(operands: impl IntoIterator<Item = Condition>) -> Self {
        let mut flat = Vec::new();
        for operand in operands {
            match operand.kind {
                ConditionKind::Or(inner) => flat.extend(inner.operands),
                _ => flat.push(operand),
            }
        }
        Or { operands: flat }.into()
    }
}

impl Evaluate for Or {
    fn invariance(&self) -> Invariance {
        self.operands.invariance()
    }

    fn pool_dependent(&self) -> bool {
        any_pool_dependent(&self.operands)
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        Ok(bind_per_candidate(self, ctx))
    }

    fn eval(
        &self,
        ctx: &ScriptingContext<'_>,
        matches: &mut ObjectSet,
        non_matches: &mut ObjectSet,
        domain: SearchDomain,
    ) {
        match domain {
            SearchDomain::NonMatches => {
                for operand in &self.operands {
                    if non_matches.is_empty() {
                        break;
                    }
                    operand.eval(ctx, matches, non_matches, SearchDomain::NonMatches);
                }
            }
            SearchDomain::Matches => {
                // Everything in matches is undecided; each operand rescues
                // what it accepts, and whatever nobody accepts fails.
                let original = mem::take(matches);
                let mut undecided = original.clone();
                let mut accepted = Vec::new();
                for operand in &self.operands {
                    if undecided.is_empty() {
                        break;
                    }
                    operand.eval(ctx, &mut accepted, &mut undecided, SearchDomain::NonMatches);
                }
                restore_order(&mut accepted, &original);
                *matches = accepted;
                non_matches.append(&mut undecided);
            }
        }
    }

    fn matches(&self, ctx: &ScriptingContext<'_>) -> bool {
        self.operands.iter().any(|operand| operand.matches(ctx))
    }

    fn eval_any(&self, ctx: &ScriptingContext<'_>, candidates: &[ObjectId]) -> bool {
        self.operands
            .iter()
            .any(|operand| operand.eval_any(ctx, candidates))
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        union_of_defaults(&self.operands, ctx)
    }
}

impl Describe for Or {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_OR", negated, &[describe_all(&self.operands, strings, false)])
    }

    fn dump(&self, level: usize) -> String {
        dump_list("Or", &self.operands, level)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Or").add(&self.operands).finish()
    }
}

// =============================================================================
// Not
// =============================================================================

/// Matches objects the operand does not match.
#[derive(Clone, Debug, PartialEq)]
pub struct Not {
    pub(crate) operand: Box<Condition>,
}

impl Condition {
    /// The operand must not match.
    #[must_use]
    pub fn not(operand: Condition) -> Self {
        Not {
            operand: Box::new(operand),
        }
        .into()
    }
}

impl Evaluate for Not {
    fn invariance(&self) -> Invariance {
        self.operand.invariance()
    }

    fn pool_dependent(&self) -> bool {
        self.operand.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        Ok(bind_per_candidate(self, ctx))
    }

    fn eval(
        &self,
        ctx: &ScriptingContext<'_>,
        matches: &mut ObjectSet,
        non_matches: &mut ObjectSet,
        domain: SearchDomain,
    ) {
        self.operand.eval(ctx, non_matches, matches, domain.flip());
    }

    fn matches(&self, ctx: &ScriptingContext<'_>) -> bool {
        !self.operand.matches(ctx)
    }

    fn eval_any(&self, ctx: &ScriptingContext<'_>, candidates: &[ObjectId]) -> bool {
        eval_any_by_partition(self, ctx, candidates)
    }
}

impl Describe for Not {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        self.operand.description_with(strings, !negated)
    }

    fn dump(&self, level: usize) -> String {
        format!("{}Not\n{}", indent(level), self.operand.dump(level + 1))
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Not").add(self.operand.as_ref()).finish()
    }
}

// =============================================================================
// OrderedAlternativesOf
// =============================================================================

/// Applies the first operand that matches anything in the input.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderedAlternativesOf {
    pub(crate) operands: Vec<Condition>,
}

impl Condition {
    /// The first operand matching any input object decides the whole batch.
    #[must_use]
    pub fn ordered_alternatives_of(operands: impl IntoIterator<Item = Condition>) -> Self {
        OrderedAlternativesOf {
            operands: operands.into_iter().collect(),
        }
        .into()
    }
}

impl Evaluate for OrderedAlternativesOf {
    fn invariance(&self) -> Invariance {
        self.operands.invariance()
    }

    /// The chosen operand depends on what the whole input contains.
    fn pool_dependent(&self) -> bool {
        true
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        Ok(bind_per_candidate(self, ctx))
    }

    fn eval(
        &self,
        ctx: &ScriptingContext<'_>,
        matches: &mut ObjectSet,
        non_matches: &mut ObjectSet,
        domain: SearchDomain,
    ) {
        let chosen = self.operands.iter().find(|operand| {
            operand.eval_any(ctx, matches) || operand.eval_any(ctx, non_matches)
        });
        match chosen {
            Some(operand) => operand.eval(ctx, matches, non_matches, domain),
            None => transfer_all(matches, non_matches, domain, false),
        }
    }

    fn matches(&self, ctx: &ScriptingContext<'_>) -> bool {
        self.operands.iter().any(|operand| operand.matches(ctx))
    }

    fn eval_any(&self, ctx: &ScriptingContext<'_>, candidates: &[ObjectId]) -> bool {
        self.operands
            .iter()
            .any(|operand| operand.eval_any(ctx, candidates))
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        union_of_defaults(&self.operands, ctx)
    }
}

impl Describe for OrderedAlternativesOf {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text(
            "DESC_ORDERED_ALTERNATIVES",
            negated,
            &[describe_all(&self.operands, strings, false)],
        )
    }

    fn dump(&self, level: usize) -> String {
        dump_list("OrderedAlternativesOf", &self.operands, level)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("OrderedAlternativesOf")
            .add(&self.operands)
            .finish()
    }
}

// =============================================================================
// Described
// =============================================================================

/// Evaluates like its operand but describes itself with a string-table key.
#[derive(Clone, Debug, PartialEq)]
pub struct Described {
    pub(crate) description: String,
    pub(crate) operand: Box<Condition>,
}

impl Condition {
    /// Gives `operand` a custom description key.
    #[must_use]
    pub fn described(description: impl Into<String>, operand: Condition) -> Self {
        Described {
            description: description.into(),
            operand: Box::new(operand),
        }
        .into()
    }
}

impl Evaluate for Described {
    fn invariance(&self) -> Invariance {
        self.operand.invariance()
    }

    fn pool_dependent(&self) -> bool {
        self.operand.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        Ok(bind_per_candidate(self, ctx))
    }

    fn eval(
        &self,
        ctx: &ScriptingContext<'_>,
        matches: &mut ObjectSet,
        non_matches: &mut ObjectSet,
        domain: SearchDomain,
    ) {
        self.operand.eval(ctx, matches, non_matches, domain);
    }

    fn matches(&self, ctx: &ScriptingContext<'_>) -> bool {
        self.operand.matches(ctx)
    }

    fn eval_any(&self, ctx: &ScriptingContext<'_>, candidates: &[ObjectId]) -> bool {
        self.operand.eval_any(ctx, candidates)
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        self.operand.default_candidates(ctx)
    }
}

impl Describe for Described {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let key = &self.description;
        if negated {
            let negated_key = format!("{key}_NOT");
            match strings.lookup(&negated_key) {
                Some(text) => text.to_owned(),
                None => format!("not {}", strings.lookup(key).unwrap_or(key)),
            }
        } else {
            strings.lookup(key).unwrap_or(key).to_owned()
        }
    }

    fn dump(&self, level: usize) -> String {
        crate::text::DumpLine::new(level, "Described")
            .field("description", format!("\"{}\"", self.description))
            .nested("condition", &self.operand)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Described")
            .add(&self.description)
            .add(self.operand.as_ref())
            .finish()
    }
}
