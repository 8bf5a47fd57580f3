//! Condition trees.
//!
//! A [`Condition`] is an immutable tree of nodes. Each node kind lives in a
//! plain struct; [`ConditionKind`] is the closed set of kinds and the
//! `Condition` wrapper caches the kind's invariance flags.
//!
//! # Module Organization
//!
//! - [`combinators`] - `And`, `Or`, `Not`, `OrderedAlternativesOf`, `Described`
//! - [`basic`] - identity, type, turn and chance tests
//! - [`attributes`] - tests on a single object's own attributes
//! - [`empire`] - tests that consult the empire and supply registries
//! - [`meter`] - meter ranges and free-standing value comparisons
//! - [`relational`] - containment, distance and reachability
//! - [`counting`] - `Number` and `SortedNumberOf`
//! - [`lanes`] - starlane placement geometry
//! - [`dynamic`] - content conditions looked up by name
//!
//! # Example
//!
//! ```text
//! And [
//!     Type type = Planet
//!     MeterValue meter = Population low = 3
//! ]
//! ```

pub mod attributes;
pub mod basic;
pub mod combinators;
pub mod counting;
pub mod dynamic;
pub mod empire;
pub mod lanes;
pub mod meter;
pub mod relational;

mod node;

use std::fmt;

use astrolabe_foundation::ObjectId;

use crate::checksum::CheckSum;
use crate::context::ScriptingContext;
use crate::invariance::{Invariance, Invariant};
use crate::partition::{ObjectSet, SearchDomain};
use crate::text::{EnglishStrings, StringTable};

use node::{Describe, Evaluate};

pub use attributes::{
    Armed, Building, CanColonize, Focus, HasSpecial, HasTag, Homeworld, Monster, PlanetTypeIs,
    Species, StarTypeIs, Stationary,
};
pub use basic::{
    All, Chance, CreatedOnTurn, NoOp, Nothing, ObjectIdMatch, RootCandidate, Source, Target,
    Turn, Type,
};
pub use combinators::{And, Described, Not, Or, OrderedAlternativesOf};
pub use counting::{Number, SortedNumberOf};
pub use dynamic::{CombatTarget, Location};
pub use empire::{
    Capital, EmpireAffiliation, EmpireHasAdoptedPolicy, EmpireMeterValue, EmpireStockpileValue,
    ExploredByEmpire, FleetSupplyableByEmpire, OwnerHasTech, ProducedByEmpire, VisibleToEmpire,
};
pub use lanes::{
    CanAddStarlaneConnection, StarlaneToWouldBeAngularlyCloseToExistingStarlane,
    StarlaneToWouldBeCloseToObject, StarlaneToWouldCrossExistingStarlane,
};
pub use meter::{MeterValue, ValueTest};
pub use relational::{
    ContainedBy, Contains, HasStarlaneTo, InOrIsSystem, OnPlanet,
    ResourceSupplyConnectedByEmpire, WithinDistance, WithinStarlaneJumps,
};

macro_rules! condition_kinds {
    ($($(#[$meta:meta])* $variant:ident($node:ty),)+) => {
        /// Closed set of condition node kinds.
        #[derive(Clone, Debug, PartialEq)]
        pub enum ConditionKind {
            $($(#[$meta])* $variant($node),)+
        }

        impl ConditionKind {
            /// Name of the kind, as used in dumps.
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => stringify!($variant),)+
                }
            }

            fn evaluate(&self) -> &dyn Evaluate {
                match self {
                    $(Self::$variant(node) => node,)+
                }
            }

            fn render(&self) -> &dyn Describe {
                match self {
                    $(Self::$variant(node) => node,)+
                }
            }
        }

        $(
            impl From<$node> for Condition {
                fn from(node: $node) -> Self {
                    Self::new(ConditionKind::$variant(node))
                }
            }
        )+
    };
}

condition_kinds! {
    /// All operands match.
    And(And),
    /// Any operand matches.
    Or(Or),
    /// The operand does not match.
    Not(Not),
    /// The first operand that matches anything decides.
    OrderedAlternativesOf(OrderedAlternativesOf),
    /// An operand with its own description.
    Described(Described),
    /// Every object.
    All(All),
    /// No object.
    None(Nothing),
    /// Leaves its input untouched.
    NoOp(NoOp),
    /// The source object.
    Source(Source),
    /// The root candidate.
    RootCandidate(RootCandidate),
    /// The target object.
    Target(Target),
    /// The object with a given id.
    ObjectId(ObjectIdMatch),
    /// Objects of a given type.
    Type(Type),
    /// Current turn within a range.
    Turn(Turn),
    /// Creation turn within a range.
    CreatedOnTurn(CreatedOnTurn),
    /// Random per-object draw.
    Chance(Chance),
    /// Ownership relative to an empire.
    EmpireAffiliation(EmpireAffiliation),
    /// Species homeworlds.
    Homeworld(Homeworld),
    /// Empire capitals.
    Capital(Capital),
    /// Monsters.
    Monster(Monster),
    /// Armed objects.
    Armed(Armed),
    /// Buildings, optionally of given types.
    Building(Building),
    /// Objects with a special.
    HasSpecial(HasSpecial),
    /// Objects with a tag.
    HasTag(HasTag),
    /// Objects of given species.
    Species(Species),
    /// Planets with given foci.
    Focus(Focus),
    /// Planets of given types.
    PlanetType(PlanetTypeIs),
    /// Objects at stars of given types.
    StarType(StarTypeIs),
    /// Objects not moving.
    Stationary(Stationary),
    /// Objects whose species can colonize.
    CanColonize(CanColonize),
    /// Objects produced by an empire.
    ProducedByEmpire(ProducedByEmpire),
    /// Objects whose owner knows a tech.
    OwnerHasTech(OwnerHasTech),
    /// Objects whose empire adopted a policy.
    EmpireHasAdoptedPolicy(EmpireHasAdoptedPolicy),
    /// Objects an empire can see.
    VisibleToEmpire(VisibleToEmpire),
    /// Systems an empire explored.
    ExploredByEmpire(ExploredByEmpire),
    /// Objects inside an empire's fleet supply.
    FleetSupplyableByEmpire(FleetSupplyableByEmpire),
    /// Meter within a range.
    MeterValue(MeterValue),
    /// Empire meter within a range.
    EmpireMeterValue(EmpireMeterValue),
    /// Empire stockpile within a range.
    EmpireStockpileValue(EmpireStockpileValue),
    /// Comparison of free-standing values.
    ValueTest(ValueTest),
    /// Objects containing a match.
    Contains(Contains),
    /// Objects contained by a match.
    ContainedBy(ContainedBy),
    /// Objects in, or being, a system.
    InOrIsSystem(InOrIsSystem),
    /// Objects on a planet.
    OnPlanet(OnPlanet),
    /// Objects near a match.
    WithinDistance(WithinDistance),
    /// Objects few jumps from a match.
    WithinStarlaneJumps(WithinStarlaneJumps),
    /// Systems with a lane to a match.
    HasStarlaneTo(HasStarlaneTo),
    /// Count of matches within a range.
    Number(Number),
    /// A bounded, sorted selection.
    SortedNumberOf(SortedNumberOf),
    /// Objects sharing an empire's supply group with a match.
    ResourceSupplyConnectedByEmpire(ResourceSupplyConnectedByEmpire),
    /// Systems whose new lane would cross an existing lane.
    StarlaneToWouldCrossExistingStarlane(StarlaneToWouldCrossExistingStarlane),
    /// Systems whose new lane would be close in angle to an existing lane.
    StarlaneToWouldBeAngularlyCloseToExistingStarlane(
        StarlaneToWouldBeAngularlyCloseToExistingStarlane
    ),
    /// Systems whose new lane would pass close to an object.
    StarlaneToWouldBeCloseToObject(StarlaneToWouldBeCloseToObject),
    /// Systems that can gain a lane.
    CanAddStarlaneConnection(CanAddStarlaneConnection),
    /// A content item's location condition.
    Location(Location),
    /// A content item's combat targeting condition.
    CombatTarget(CombatTarget),
}

/// An immutable condition tree.
///
/// Cloning deep-copies the tree and recomputes invariance flags; equality
/// compares structure only.
#[derive(Debug)]
pub struct Condition {
    kind: ConditionKind,
    invariance: Invariance,
    pool_dependent: bool,
}

impl Condition {
    /// Wraps a node kind, computing its invariance flags.
    #[must_use]
    pub fn new(kind: ConditionKind) -> Self {
        let node = kind.evaluate();
        let invariance = node.invariance();
        let pool_dependent = node.pool_dependent();
        Self {
            kind,
            invariance,
            pool_dependent,
        }
    }

    /// The node kind.
    #[must_use]
    pub fn kind(&self) -> &ConditionKind {
        &self.kind
    }

    /// Whether the tree never reads the local candidate.
    #[must_use]
    pub fn local_candidate_invariant(&self) -> bool {
        self.invariance.local_candidate
    }

    /// Whether the tree never reads the root candidate.
    #[must_use]
    pub fn root_candidate_invariant(&self) -> bool {
        self.invariance.root_candidate
    }

    /// Whether the tree never reads the source object.
    #[must_use]
    pub fn source_invariant(&self) -> bool {
        self.invariance.source
    }

    /// Whether the tree never reads the target object.
    #[must_use]
    pub fn target_invariant(&self) -> bool {
        self.invariance.target
    }

    /// Whether results depend on the input pool as a whole, as with random
    /// draws and bounded selections. Such trees must see the same pool on
    /// every evaluation path.
    #[must_use]
    pub fn pool_dependent(&self) -> bool {
        self.pool_dependent
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Refines the domain set.
    ///
    /// With `SearchDomain::Matches`, objects failing the condition move from
    /// `matches` to `non_matches`; with `SearchDomain::NonMatches`, objects
    /// passing it move from `non_matches` to `matches`. The other set is
    /// only appended to.
    pub fn eval(
        &self,
        ctx: &ScriptingContext<'_>,
        matches: &mut ObjectSet,
        non_matches: &mut ObjectSet,
        domain: SearchDomain,
    ) {
        self.kind
            .evaluate()
            .eval(ctx, matches, non_matches, domain);
    }

    /// Tests the context's local candidate.
    #[must_use]
    pub fn matches(&self, ctx: &ScriptingContext<'_>) -> bool {
        self.kind.evaluate().matches(ctx)
    }

    /// Tests one candidate through a nested context.
    #[must_use]
    pub fn eval_one(&self, ctx: &ScriptingContext<'_>, candidate: ObjectId) -> bool {
        self.matches(&ctx.with_local_candidate(candidate))
    }

    /// Whether any candidate passes.
    #[must_use]
    pub fn eval_any(&self, ctx: &ScriptingContext<'_>, candidates: &[ObjectId]) -> bool {
        self.kind.evaluate().eval_any(ctx, candidates)
    }

    /// A superset of the objects that can match, used when no pool is given.
    #[must_use]
    pub fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        self.kind.evaluate().default_candidates(ctx)
    }

    /// Every object that matches, evaluated over the default candidates.
    #[must_use]
    pub fn matching(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        let mut matches = self.default_candidates(ctx);
        let mut non_matches = Vec::new();
        self.eval(ctx, &mut matches, &mut non_matches, SearchDomain::Matches);
        matches
    }

    /// Splits a pool into `(matches, non_matches)`, preserving order.
    #[must_use]
    pub fn partition(
        &self,
        ctx: &ScriptingContext<'_>,
        candidates: &[ObjectId],
    ) -> (ObjectSet, ObjectSet) {
        let mut matches = candidates.to_vec();
        let mut non_matches = Vec::new();
        self.eval(ctx, &mut matches, &mut non_matches, SearchDomain::Matches);
        (matches, non_matches)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// English description.
    #[must_use]
    pub fn description(&self, negated: bool) -> String {
        self.description_with(&EnglishStrings, negated)
    }

    /// Description through a custom string table.
    #[must_use]
    pub fn description_with(&self, strings: &dyn StringTable, negated: bool) -> String {
        self.kind.render().describe(strings, negated)
    }

    /// Canonical structural text, four spaces per indent level.
    #[must_use]
    pub fn dump(&self, indent: usize) -> String {
        self.kind.render().dump(indent)
    }

    /// Structural checksum; equal trees have equal checksums.
    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.kind.render().checksum()
    }
}

impl Clone for Condition {
    fn clone(&self) -> Self {
        Self::new(self.kind.clone())
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Invariant for Condition {
    fn invariance(&self) -> Invariance {
        self.invariance
    }
}

impl CheckSum for Condition {
    fn check_sum(&self) -> u32 {
        self.checksum()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump(0))
    }
}

/// Whether any operand depends on its input pool.
fn any_pool_dependent(operands: &[Condition]) -> bool {
    operands.iter().any(Condition::pool_dependent)
}

/// Describes each operand for a combinator's sentence.
fn describe_all(operands: &[Condition], strings: &dyn StringTable, negated: bool) -> String {
    operands
        .iter()
        .map(|operand| format!("({})", operand.description_with(strings, negated)))
        .collect::<Vec<_>>()
        .join(" ")
}
