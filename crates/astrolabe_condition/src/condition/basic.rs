//! Identity, type, turn and chance tests.

use astrolabe_foundation::{Error, ObjectId, ObjectType, Result};
use rand::Rng;

use super::Condition;
use super::node::{Describe, Evaluate, Matcher, bind_opt, in_range, opt_text};
use crate::checksum::Checksummer;
use crate::context::ScriptingContext;
use crate::invariance::{Invariance, Invariant};
use crate::partition::{ObjectSet, SearchDomain};
use crate::text::{DumpLine, StringTable};
use crate::value_ref::{ReferenceType, ValueRef};

fn constant(pass: bool) -> Matcher<'static> {
    Box::new(move |_| pass)
}

// =============================================================================
// All / None / NoOp
// =============================================================================

/// Matches every object.
#[derive(Clone, Debug, PartialEq)]
pub struct All;

/// Matches no object.
#[derive(Clone, Debug, PartialEq)]
pub struct Nothing;

/// Leaves its input untouched.
///
/// `eval` moves nothing in either domain; `matches` accepts every candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct NoOp;

impl Condition {
    /// Matches every object.
    #[must_use]
    pub fn all() -> Self {
        All.into()
    }

    /// Matches no object.
    #[must_use]
    pub fn none() -> Self {
        Nothing.into()
    }

    /// Leaves its input untouched.
    #[must_use]
    pub fn no_op() -> Self {
        NoOp.into()
    }
}

impl Evaluate for All {
    fn invariance(&self) -> Invariance {
        Invariance::ALL
    }

    fn bind<'a>(&'a self, _ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        Ok(constant(true))
    }

    fn context_test(&self, _ctx: &ScriptingContext<'_>) -> Option<Result<bool>> {
        Some(Ok(true))
    }
}

impl Describe for All {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_ALL", negated, &[])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "All").finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("All").finish()
    }
}

impl Evaluate for Nothing {
    fn invariance(&self) -> Invariance {
        Invariance::ALL
    }

    fn bind<'a>(&'a self, _ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        Ok(constant(false))
    }

    fn context_test(&self, _ctx: &ScriptingContext<'_>) -> Option<Result<bool>> {
        Some(Ok(false))
    }

    fn default_candidates(&self, _ctx: &ScriptingContext<'_>) -> ObjectSet {
        Vec::new()
    }
}

impl Describe for Nothing {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_NONE", negated, &[])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "None").finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("None").finish()
    }
}

impl Evaluate for NoOp {
    fn invariance(&self) -> Invariance {
        Invariance::ALL
    }

    fn bind<'a>(&'a self, _ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        Ok(constant(true))
    }

    fn eval(
        &self,
        _ctx: &ScriptingContext<'_>,
        _matches: &mut ObjectSet,
        _non_matches: &mut ObjectSet,
        _domain: SearchDomain,
    ) {
    }

    fn matches(&self, _ctx: &ScriptingContext<'_>) -> bool {
        true
    }

    fn eval_any(&self, _ctx: &ScriptingContext<'_>, candidates: &[ObjectId]) -> bool {
        !candidates.is_empty()
    }
}

impl Describe for NoOp {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_NOOP", negated, &[])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "NoOp").finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("NoOp").finish()
    }
}

// =============================================================================
// Source / RootCandidate / Target
// =============================================================================

fn bind_reference(reference: ReferenceType, ctx: &ScriptingContext<'_>) -> Result<Matcher<'static>> {
    let id = reference
        .resolve(ctx)
        .ok_or_else(|| Error::missing_candidate(reference.name()))?;
    Ok(Box::new(move |obj| obj.id == id))
}

fn reference_candidates(reference: ReferenceType, ctx: &ScriptingContext<'_>) -> ObjectSet {
    match reference.resolve(ctx) {
        Some(id) if ctx.universe().contains(id) => vec![id],
        Some(_) => Vec::new(),
        None if reference == ReferenceType::RootCandidate => ctx.universe().object_ids(),
        None => Vec::new(),
    }
}

macro_rules! reference_node {
    ($(#[$meta:meta])* $name:ident, $ctor:ident, $reference:expr, $key:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name;

        impl Condition {
            $(#[$meta])*
            #[must_use]
            pub fn $ctor() -> Self {
                $name.into()
            }
        }

        impl Evaluate for $name {
            fn invariance(&self) -> Invariance {
                $reference.invariance()
            }

            fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
                bind_reference($reference, ctx)
            }

            fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
                reference_candidates($reference, ctx)
            }
        }

        impl Describe for $name {
            fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
                strings.text($key, negated, &[])
            }

            fn dump(&self, level: usize) -> String {
                DumpLine::new(level, stringify!($name)).finish()
            }

            fn checksum(&self) -> u32 {
                Checksummer::tagged(stringify!($name)).finish()
            }
        }
    };
}

reference_node!(
    /// Matches the source object.
    Source,
    source,
    ReferenceType::Source,
    "DESC_SOURCE"
);
reference_node!(
    /// Matches the root candidate.
    RootCandidate,
    root_candidate,
    ReferenceType::RootCandidate,
    "DESC_ROOT_CANDIDATE"
);
reference_node!(
    /// Matches the target object.
    Target,
    target,
    ReferenceType::Target,
    "DESC_TARGET"
);

// =============================================================================
// ObjectId / Type
// =============================================================================

/// Matches the object with a given id.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectIdMatch {
    pub(crate) id: ValueRef<i32>,
}

impl Condition {
    /// Matches the object with the given id.
    #[must_use]
    pub fn object_id(id: impl Into<ValueRef<i32>>) -> Self {
        ObjectIdMatch { id: id.into() }.into()
    }
}

impl Evaluate for ObjectIdMatch {
    fn invariance(&self) -> Invariance {
        self.id.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let id = self.id.eval(ctx)?;
        Ok(Box::new(move |obj| obj.id.raw() == id))
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        if !self.simple_eval_safe(ctx) {
            return ctx.universe().object_ids();
        }
        match self.id.eval(ctx).ok().and_then(ObjectId::from_raw) {
            Some(id) if ctx.universe().contains(id) => vec![id],
            _ => Vec::new(),
        }
    }
}

impl Describe for ObjectIdMatch {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_OBJECT_ID", negated, &[self.id.dump()])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Object").field("id", &self.id).finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("ObjectId").add(&self.id).finish()
    }
}

/// Matches objects of one type.
#[derive(Clone, Debug, PartialEq)]
pub struct Type {
    pub(crate) object_type: ObjectType,
}

impl Condition {
    /// Matches objects of the given type.
    #[must_use]
    pub fn object_type(object_type: ObjectType) -> Self {
        Type { object_type }.into()
    }
}

impl Evaluate for Type {
    fn invariance(&self) -> Invariance {
        Invariance::ALL
    }

    fn bind<'a>(&'a self, _ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let object_type = self.object_type;
        Ok(Box::new(move |obj| obj.object_type == object_type))
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        ctx.universe().objects_of_type(self.object_type)
    }
}

impl Describe for Type {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_TYPE", negated, &[self.object_type.to_string()])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Type")
            .field("type", self.object_type)
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Type").add(&self.object_type).finish()
    }
}

// =============================================================================
// Turn / CreatedOnTurn
// =============================================================================

/// Matches everything when the current turn is in range, else nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct Turn {
    pub(crate) low: Option<ValueRef<i32>>,
    pub(crate) high: Option<ValueRef<i32>>,
}

impl Condition {
    /// Current turn in `[low, high]`; missing bounds are open.
    #[must_use]
    pub fn turn(low: Option<ValueRef<i32>>, high: Option<ValueRef<i32>>) -> Self {
        Turn { low, high }.into()
    }
}

impl Turn {
    fn test(&self, ctx: &ScriptingContext<'_>) -> Result<bool> {
        let low = bind_opt(self.low.as_ref(), ctx)?;
        let high = bind_opt(self.high.as_ref(), ctx)?;
        Ok(in_range(&ctx.current_turn(), low.as_ref(), high.as_ref()))
    }
}

impl Evaluate for Turn {
    fn invariance(&self) -> Invariance {
        self.low.invariance().and(self.high.invariance())
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        Ok(constant(self.test(ctx)?))
    }

    fn context_test(&self, ctx: &ScriptingContext<'_>) -> Option<Result<bool>> {
        Some(self.test(ctx))
    }
}

impl Describe for Turn {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let args = [
            opt_text(self.low.as_ref(), strings),
            opt_text(self.high.as_ref(), strings),
        ];
        strings.text("DESC_TURN", negated, &args)
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Turn")
            .opt_field("low", self.low.as_ref())
            .opt_field("high", self.high.as_ref())
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Turn")
            .add(&self.low)
            .add(&self.high)
            .finish()
    }
}

/// Matches objects created within a turn range.
#[derive(Clone, Debug, PartialEq)]
pub struct CreatedOnTurn {
    pub(crate) low: Option<ValueRef<i32>>,
    pub(crate) high: Option<ValueRef<i32>>,
}

impl Condition {
    /// Creation turn in `[low, high]`; missing bounds are open.
    #[must_use]
    pub fn created_on_turn(low: Option<ValueRef<i32>>, high: Option<ValueRef<i32>>) -> Self {
        CreatedOnTurn { low, high }.into()
    }
}

impl Evaluate for CreatedOnTurn {
    fn invariance(&self) -> Invariance {
        self.low.invariance().and(self.high.invariance())
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let low = bind_opt(self.low.as_ref(), ctx)?;
        let high = bind_opt(self.high.as_ref(), ctx)?;
        Ok(Box::new(move |obj| {
            in_range(&obj.created_on_turn, low.as_ref(), high.as_ref())
        }))
    }
}

impl Describe for CreatedOnTurn {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let args = [
            opt_text(self.low.as_ref(), strings),
            opt_text(self.high.as_ref(), strings),
        ];
        strings.text("DESC_CREATED_ON_TURN", negated, &args)
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "CreatedOnTurn")
            .opt_field("low", self.low.as_ref())
            .opt_field("high", self.high.as_ref())
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("CreatedOnTurn")
            .add(&self.low)
            .add(&self.high)
            .finish()
    }
}

// =============================================================================
// Chance
// =============================================================================

/// Matches each object independently with a probability.
///
/// Draws come from the context's shared RNG, one per tested object.
#[derive(Clone, Debug, PartialEq)]
pub struct Chance {
    pub(crate) chance: ValueRef<f64>,
}

impl Condition {
    /// Matches each object with probability `chance` (clamped to `[0, 1]`).
    #[must_use]
    pub fn chance(chance: impl Into<ValueRef<f64>>) -> Self {
        Chance {
            chance: chance.into(),
        }
        .into()
    }
}

impl Evaluate for Chance {
    fn invariance(&self) -> Invariance {
        self.chance.invariance()
    }

    fn pool_dependent(&self) -> bool {
        true
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let chance = self.chance.eval(ctx)?.clamp(0.0, 1.0);
        let rng = ctx.rng();
        Ok(Box::new(move |_| rng.borrow_mut().r#gen::<f64>() < chance))
    }
}

impl Describe for Chance {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_CHANCE", negated, &[self.chance.dump()])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Random")
            .field("probability", &self.chance)
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Chance").add(&self.chance).finish()
    }
}
