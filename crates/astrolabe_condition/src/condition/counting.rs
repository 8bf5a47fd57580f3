//! `Number` and `SortedNumberOf`.

use std::collections::BTreeSet;

use astrolabe_foundation::{ObjectId, Result};
use tracing::debug;

use super::Condition;
use super::node::{Describe, Evaluate, Matcher, bind_opt, eval_any_by_partition, in_range, opt_text};
use crate::checksum::Checksummer;
use crate::context::ScriptingContext;
use crate::invariance::{Invariance, Invariant};
use crate::partition::{ObjectSet, SearchDomain, transfer_by};
use crate::selection::{
    SortKey, SortValue, SortingMethod, select_max, select_min, select_mode, select_random,
    select_unique,
};
use crate::text::{DumpLine, StringTable};
use crate::value_ref::ValueRef;

// =============================================================================
// Number
// =============================================================================

/// Matches everything when the number of subcondition matches lies in
/// `[low, high]`, else nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct Number {
    pub(crate) low: Option<ValueRef<i32>>,
    pub(crate) high: Option<ValueRef<i32>>,
    pub(crate) condition: Box<Condition>,
}

impl Condition {
    /// Whether `condition` matches between `low` and `high` objects.
    #[must_use]
    pub fn number(
        low: Option<ValueRef<i32>>,
        high: Option<ValueRef<i32>>,
        condition: Condition,
    ) -> Self {
        Number {
            low,
            high,
            condition: Box::new(condition),
        }
        .into()
    }
}

impl Number {
    fn test(&self, ctx: &ScriptingContext<'_>) -> Result<bool> {
        let low = bind_opt(self.low.as_ref(), ctx)?;
        let high = bind_opt(self.high.as_ref(), ctx)?;
        let count = i32::try_from(self.condition.matching(ctx).len()).unwrap_or(i32::MAX);
        Ok(in_range(&count, low.as_ref(), high.as_ref()))
    }
}

impl Evaluate for Number {
    fn invariance(&self) -> Invariance {
        self.low
            .invariance()
            .and(self.high.invariance())
            .and(self.condition.invariance().nested())
    }

    fn pool_dependent(&self) -> bool {
        self.condition.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let pass = self.test(ctx)?;
        Ok(Box::new(move |_| pass))
    }

    fn context_test(&self, ctx: &ScriptingContext<'_>) -> Option<Result<bool>> {
        Some(self.test(ctx))
    }
}

impl Describe for Number {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let args = [
            opt_text(self.low.as_ref(), strings),
            opt_text(self.high.as_ref(), strings),
            self.condition.description_with(strings, false),
        ];
        strings.text("DESC_NUMBER", negated, &args)
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Number")
            .opt_field("low", self.low.as_ref())
            .opt_field("high", self.high.as_ref())
            .nested("condition", &self.condition)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Number")
            .add(&self.low)
            .add(&self.high)
            .add(&self.condition)
            .finish()
    }
}

// =============================================================================
// SortedNumberOf
// =============================================================================

/// Selects a bounded number of the subcondition's matches.
///
/// The pool is every input object, from both sets, that the subcondition
/// matches. `number` is clamped to `[0, pool size]`. Only objects in the
/// search domain move: with `Matches`, unselected objects leave `matches`;
/// with `NonMatches`, selected objects leave `non_matches`.
///
/// Without a sort key, the sorting methods order by object id. Objects
/// whose key fails to evaluate are left out of the pool.
#[derive(Clone, Debug, PartialEq)]
pub struct SortedNumberOf {
    pub(crate) number: ValueRef<i32>,
    pub(crate) sort_key: Option<SortKey>,
    pub(crate) method: SortingMethod,
    pub(crate) condition: Box<Condition>,
}

impl Condition {
    /// `number` objects matching `condition`, chosen at random.
    #[must_use]
    pub fn number_of(number: impl Into<ValueRef<i32>>, condition: Condition) -> Self {
        Self::sorted_number_of(number, None, SortingMethod::Random, condition)
    }

    /// `number` objects matching `condition`, chosen by `method` over
    /// `sort_key`.
    #[must_use]
    pub fn sorted_number_of(
        number: impl Into<ValueRef<i32>>,
        sort_key: Option<SortKey>,
        method: SortingMethod,
        condition: Condition,
    ) -> Self {
        SortedNumberOf {
            number: number.into(),
            sort_key,
            method,
            condition: Box::new(condition),
        }
        .into()
    }
}

impl SortedNumberOf {
    /// Chooses from `pool` (already filtered by the subcondition).
    fn select(&self, ctx: &ScriptingContext<'_>, pool: Vec<ObjectId>) -> BTreeSet<ObjectId> {
        let requested = self.number.eval(ctx).unwrap_or_else(|err| {
            debug!(%err, "selection size did not evaluate; selecting nothing");
            0
        });
        let n = usize::try_from(requested).unwrap_or(0).min(pool.len());
        if n == 0 {
            return BTreeSet::new();
        }

        if self.method == SortingMethod::Random {
            return select_random(pool, n, &mut *ctx.rng().borrow_mut())
                .into_iter()
                .collect();
        }

        let keyed: Vec<(SortValue, ObjectId)> = pool
            .into_iter()
            .filter_map(|id| match &self.sort_key {
                None => Some((SortValue::Number(f64::from(id.raw())), id)),
                Some(key) => match key.eval(&ctx.with_local_candidate(id)) {
                    Ok(value) => Some((value, id)),
                    Err(err) => {
                        debug!(%err, candidate = %id, "sort key did not evaluate");
                        None
                    }
                },
            })
            .collect();
        let n = n.min(keyed.len());
        let chosen = match self.method {
            SortingMethod::Min => select_min(keyed, n),
            SortingMethod::Max => select_max(keyed, n),
            SortingMethod::Mode => select_mode(keyed, n),
            SortingMethod::Unique | SortingMethod::Random => select_unique(keyed, n),
        };
        chosen.into_iter().collect()
    }
}

impl Evaluate for SortedNumberOf {
    fn invariance(&self) -> Invariance {
        let key = self
            .sort_key
            .as_ref()
            .map_or(Invariance::ALL, |key| key.invariance().nested());
        self.number
            .invariance()
            .and(key)
            .and(self.condition.invariance().nested())
    }

    fn pool_dependent(&self) -> bool {
        true
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let selected = self.select(ctx, self.condition.matching(ctx));
        Ok(Box::new(move |obj| selected.contains(&obj.id)))
    }

    fn eval(
        &self,
        ctx: &ScriptingContext<'_>,
        matches: &mut ObjectSet,
        non_matches: &mut ObjectSet,
        domain: SearchDomain,
    ) {
        let input: Vec<ObjectId> = matches.iter().chain(non_matches.iter()).copied().collect();
        let (pool, _) = self.condition.partition(ctx, &input);
        let selected = self.select(ctx, pool);
        transfer_by(matches, non_matches, domain, |id| selected.contains(&id));
    }

    fn eval_any(&self, ctx: &ScriptingContext<'_>, candidates: &[ObjectId]) -> bool {
        eval_any_by_partition(self, ctx, candidates)
    }
}

impl Describe for SortedNumberOf {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let args = [
            self.number.dump(),
            self.method.name().to_owned(),
            self.condition.description_with(strings, false),
        ];
        strings.text("DESC_SORTED_NUMBER_OF", negated, &args)
    }

    fn dump(&self, level: usize) -> String {
        let name = match self.method {
            SortingMethod::Random => "NumberOf",
            SortingMethod::Min => "MinimumNumberOf",
            SortingMethod::Max => "MaximumNumberOf",
            SortingMethod::Mode => "ModeNumberOf",
            SortingMethod::Unique => "UniqueNumberOf",
        };
        DumpLine::new(level, name)
            .field("number", &self.number)
            .opt_field("sortkey", self.sort_key.as_ref())
            .nested("condition", &self.condition)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("SortedNumberOf")
            .add(&self.number)
            .add(&self.sort_key)
            .add(&self.method)
            .add(&self.condition)
            .finish()
    }
}
