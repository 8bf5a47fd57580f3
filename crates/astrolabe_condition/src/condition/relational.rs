//! Containment, distance and reachability.
//!
//! Each node evaluates its subcondition into a reference set once per bind,
//! then tests candidates against that set. When the operands vary per
//! candidate, the generic slow path rebinds (and re-evaluates the
//! subcondition) for every candidate.

use std::collections::BTreeSet;

use astrolabe_foundation::{EmpireId, ObjectId, ObjectType, Result};
use astrolabe_universe::UniverseObject;
use tracing::trace;

use super::Condition;
use super::node::{Describe, Evaluate, Matcher, eval_bound, opt_text, system_of};
use crate::checksum::Checksummer;
use crate::context::ScriptingContext;
use crate::geometry::Vec2;
use crate::invariance::{Invariance, Invariant};
use crate::partition::{ObjectSet, SearchDomain, transfer_objects};
use crate::text::{DumpLine, StringTable};
use crate::value_ref::ValueRef;

fn reference_set(condition: &Condition, ctx: &ScriptingContext<'_>) -> BTreeSet<ObjectId> {
    condition.matching(ctx).into_iter().collect()
}

fn domain_len(matches: &ObjectSet, non_matches: &ObjectSet, domain: SearchDomain) -> usize {
    match domain {
        SearchDomain::Matches => matches.len(),
        SearchDomain::NonMatches => non_matches.len(),
    }
}

/// Evaluation for small inputs: the subcondition only sees each candidate's
/// related objects instead of the whole universe. Pool-dependent
/// subconditions always see the whole universe.
fn eval_small_input<N, F>(
    node: &N,
    condition: &Condition,
    ctx: &ScriptingContext<'_>,
    matches: &mut ObjectSet,
    non_matches: &mut ObjectSet,
    domain: SearchDomain,
    related: F,
) where
    N: Evaluate + ?Sized,
    F: Fn(&UniverseObject) -> Vec<ObjectId>,
{
    let limit = ctx.config().small_input_limit;
    if !condition.pool_dependent()
        && node.simple_eval_safe(ctx)
        && domain_len(matches, non_matches, domain) <= limit
    {
        trace!(limit, "testing related objects per candidate");
        transfer_objects(ctx.universe(), matches, non_matches, domain, |obj| {
            condition.eval_any(ctx, &related(obj))
        });
    } else {
        eval_bound(node, ctx, matches, non_matches, domain);
    }
}

// =============================================================================
// Contains / ContainedBy
// =============================================================================

/// Matches objects that contain an object matching the subcondition.
#[derive(Clone, Debug, PartialEq)]
pub struct Contains {
    pub(crate) condition: Box<Condition>,
}

impl Condition {
    /// Objects containing a match of `condition`.
    #[must_use]
    pub fn contains(condition: Condition) -> Self {
        Contains {
            condition: Box::new(condition),
        }
        .into()
    }
}

impl Evaluate for Contains {
    fn invariance(&self) -> Invariance {
        self.condition.invariance().nested()
    }

    fn pool_dependent(&self) -> bool {
        self.condition.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let contained = reference_set(&self.condition, ctx);
        Ok(Box::new(move |obj| {
            obj.contents.iter().any(|id| contained.contains(id))
        }))
    }

    fn eval(
        &self,
        ctx: &ScriptingContext<'_>,
        matches: &mut ObjectSet,
        non_matches: &mut ObjectSet,
        domain: SearchDomain,
    ) {
        eval_small_input(self, &self.condition, ctx, matches, non_matches, domain, |obj| {
            obj.contents.clone()
        });
    }
}

impl Describe for Contains {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let inner = self.condition.description_with(strings, false);
        strings.text("DESC_CONTAINS", negated, &[inner])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Contains").nested("condition", &self.condition)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Contains")
            .add(&self.condition)
            .finish()
    }
}

/// Matches objects contained, directly or through their system, by an
/// object matching the subcondition.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainedBy {
    pub(crate) condition: Box<Condition>,
}

impl Condition {
    /// Objects contained by a match of `condition`.
    #[must_use]
    pub fn contained_by(condition: Condition) -> Self {
        ContainedBy {
            condition: Box::new(condition),
        }
        .into()
    }
}

impl Evaluate for ContainedBy {
    fn invariance(&self) -> Invariance {
        self.condition.invariance().nested()
    }

    fn pool_dependent(&self) -> bool {
        self.condition.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let containers = reference_set(&self.condition, ctx);
        Ok(Box::new(move |obj| {
            obj.containers().iter().any(|id| containers.contains(id))
        }))
    }

    fn eval(
        &self,
        ctx: &ScriptingContext<'_>,
        matches: &mut ObjectSet,
        non_matches: &mut ObjectSet,
        domain: SearchDomain,
    ) {
        eval_small_input(
            self,
            &self.condition,
            ctx,
            matches,
            non_matches,
            domain,
            UniverseObject::containers,
        );
    }
}

impl Describe for ContainedBy {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let inner = self.condition.description_with(strings, false);
        strings.text("DESC_CONTAINED_BY", negated, &[inner])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "ContainedBy").nested("condition", &self.condition)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("ContainedBy")
            .add(&self.condition)
            .finish()
    }
}

// =============================================================================
// InOrIsSystem / OnPlanet
// =============================================================================

/// Matches a system and everything in it.
///
/// Without an id, matches every system and every object in any system.
#[derive(Clone, Debug, PartialEq)]
pub struct InOrIsSystem {
    pub(crate) system_id: Option<ValueRef<i32>>,
}

impl Condition {
    /// The system with `system_id` and its contents; any system when `None`.
    #[must_use]
    pub fn in_or_is_system(system_id: Option<ValueRef<i32>>) -> Self {
        InOrIsSystem { system_id }.into()
    }
}

impl Evaluate for InOrIsSystem {
    fn invariance(&self) -> Invariance {
        self.system_id.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        match &self.system_id {
            Some(id) => {
                let id = id.eval(ctx)?;
                Ok(Box::new(move |obj| system_of(obj).is_some_and(|s| s.raw() == id)))
            }
            None => Ok(Box::new(|obj| system_of(obj).is_some())),
        }
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        let system = match &self.system_id {
            Some(id) if self.simple_eval_safe(ctx) => id.eval(ctx).ok().and_then(ObjectId::from_raw),
            _ => None,
        };
        match system.and_then(|id| ctx.object(id)) {
            Some(system) => std::iter::once(system.id)
                .chain(system.contents.iter().copied())
                .collect(),
            None => ctx.universe().object_ids(),
        }
    }
}

impl Describe for InOrIsSystem {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_IN_SYSTEM", negated, &[opt_text(self.system_id.as_ref(), strings)])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "InSystem")
            .opt_field("id", self.system_id.as_ref())
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("InOrIsSystem")
            .add(&self.system_id)
            .finish()
    }
}

/// Matches objects standing on a planet.
///
/// Without an id, matches objects on any planet.
#[derive(Clone, Debug, PartialEq)]
pub struct OnPlanet {
    pub(crate) planet_id: Option<ValueRef<i32>>,
}

impl Condition {
    /// Objects on the planet with `planet_id`; any planet when `None`.
    #[must_use]
    pub fn on_planet(planet_id: Option<ValueRef<i32>>) -> Self {
        OnPlanet { planet_id }.into()
    }
}

impl Evaluate for OnPlanet {
    fn invariance(&self) -> Invariance {
        self.planet_id.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let wanted = self
            .planet_id
            .as_ref()
            .map(|id| id.eval(ctx))
            .transpose()?;
        let universe = ctx.universe();
        Ok(Box::new(move |obj| {
            obj.container_id
                .and_then(|id| universe.get(id))
                .filter(|container| container.object_type == ObjectType::Planet)
                .is_some_and(|planet| wanted.is_none_or(|id| planet.id.raw() == id))
        }))
    }
}

impl Describe for OnPlanet {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_ON_PLANET", negated, &[opt_text(self.planet_id.as_ref(), strings)])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "OnPlanet")
            .opt_field("id", self.planet_id.as_ref())
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("OnPlanet")
            .add(&self.planet_id)
            .finish()
    }
}

// =============================================================================
// WithinDistance / WithinStarlaneJumps / HasStarlaneTo
// =============================================================================

/// Matches objects within a straight-line distance of a subcondition match.
#[derive(Clone, Debug, PartialEq)]
pub struct WithinDistance {
    pub(crate) distance: ValueRef<f64>,
    pub(crate) condition: Box<Condition>,
}

impl Condition {
    /// Objects at most `distance` from a match of `condition`.
    #[must_use]
    pub fn within_distance(distance: impl Into<ValueRef<f64>>, condition: Condition) -> Self {
        WithinDistance {
            distance: distance.into(),
            condition: Box::new(condition),
        }
        .into()
    }
}

impl Evaluate for WithinDistance {
    fn invariance(&self) -> Invariance {
        self.distance
            .invariance()
            .and(self.condition.invariance().nested())
    }

    fn pool_dependent(&self) -> bool {
        self.condition.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let distance = self.distance.eval(ctx)?;
        let limit = distance * distance;
        let anchors: Vec<Vec2> = self
            .condition
            .matching(ctx)
            .into_iter()
            .filter_map(|id| ctx.object(id))
            .map(Vec2::of)
            .collect();
        Ok(Box::new(move |obj| {
            let here = Vec2::of(obj);
            distance >= 0.0
                && anchors
                    .iter()
                    .any(|anchor| (*anchor - here).length_squared() <= limit)
        }))
    }
}

impl Describe for WithinDistance {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let args = [
            self.distance.dump(),
            self.condition.description_with(strings, false),
        ];
        strings.text("DESC_WITHIN_DISTANCE", negated, &args)
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "WithinDistance")
            .field("distance", &self.distance)
            .nested("condition", &self.condition)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("WithinDistance")
            .add(&self.distance)
            .add(&self.condition)
            .finish()
    }
}

/// Matches objects whose system is at most a number of starlane jumps from
/// the system of a subcondition match.
#[derive(Clone, Debug, PartialEq)]
pub struct WithinStarlaneJumps {
    pub(crate) jumps: ValueRef<i32>,
    pub(crate) condition: Box<Condition>,
}

impl Condition {
    /// Objects at most `jumps` starlane jumps from a match of `condition`.
    #[must_use]
    pub fn within_starlane_jumps(jumps: impl Into<ValueRef<i32>>, condition: Condition) -> Self {
        WithinStarlaneJumps {
            jumps: jumps.into(),
            condition: Box::new(condition),
        }
        .into()
    }
}

impl Evaluate for WithinStarlaneJumps {
    fn invariance(&self) -> Invariance {
        self.jumps
            .invariance()
            .and(self.condition.invariance().nested())
    }

    fn pool_dependent(&self) -> bool {
        self.condition.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let Ok(jumps) = u32::try_from(self.jumps.eval(ctx)?) else {
            return Ok(Box::new(|_| false));
        };
        let origins = self.condition.matching(ctx);
        let reachable = ctx
            .pathfinder()
            .systems_within_jumps(ctx.universe(), jumps, &origins);
        Ok(Box::new(move |obj| {
            system_of(obj).is_some_and(|system| reachable.contains(&system))
        }))
    }
}

impl Describe for WithinStarlaneJumps {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let args = [
            self.jumps.dump(),
            self.condition.description_with(strings, false),
        ];
        strings.text("DESC_WITHIN_STARLANE_JUMPS", negated, &args)
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "WithinStarlaneJumps")
            .field("jumps", &self.jumps)
            .nested("condition", &self.condition)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("WithinStarlaneJumps")
            .add(&self.jumps)
            .add(&self.condition)
            .finish()
    }
}

/// Matches objects whose system has a starlane to the system of a
/// subcondition match.
#[derive(Clone, Debug, PartialEq)]
pub struct HasStarlaneTo {
    pub(crate) condition: Box<Condition>,
}

impl Condition {
    /// Objects in systems with a starlane to a match of `condition`.
    #[must_use]
    pub fn has_starlane_to(condition: Condition) -> Self {
        HasStarlaneTo {
            condition: Box::new(condition),
        }
        .into()
    }
}

impl Evaluate for HasStarlaneTo {
    fn invariance(&self) -> Invariance {
        self.condition.invariance().nested()
    }

    fn pool_dependent(&self) -> bool {
        self.condition.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let universe = ctx.universe();
        let destinations: BTreeSet<ObjectId> = self
            .condition
            .matching(ctx)
            .into_iter()
            .filter_map(|id| ctx.object(id))
            .filter_map(system_of)
            .collect();
        Ok(Box::new(move |obj| {
            system_of(obj)
                .and_then(|id| universe.get(id))
                .is_some_and(|system| system.starlanes.iter().any(|lane| destinations.contains(lane)))
        }))
    }
}

impl Describe for HasStarlaneTo {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let inner = self.condition.description_with(strings, false);
        strings.text("DESC_HAS_STARLANE_TO", negated, &[inner])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "HasStarlane").nested("condition", &self.condition)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("HasStarlaneTo")
            .add(&self.condition)
            .finish()
    }
}

// =============================================================================
// ResourceSupplyConnectedByEmpire
// =============================================================================

/// Matches objects whose system shares one of an empire's resource supply
/// groups with the system of a subcondition match.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceSupplyConnectedByEmpire {
    pub(crate) empire: ValueRef<i32>,
    pub(crate) condition: Box<Condition>,
}

impl Condition {
    /// Objects supply-connected for `empire` to a match of `condition`.
    #[must_use]
    pub fn resource_supply_connected(
        empire: impl Into<ValueRef<i32>>,
        condition: Condition,
    ) -> Self {
        ResourceSupplyConnectedByEmpire {
            empire: empire.into(),
            condition: Box::new(condition),
        }
        .into()
    }
}

impl Evaluate for ResourceSupplyConnectedByEmpire {
    fn invariance(&self) -> Invariance {
        self.empire
            .invariance()
            .and(self.condition.invariance().nested())
    }

    fn pool_dependent(&self) -> bool {
        self.condition.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let empire = EmpireId::new(self.empire.eval(ctx)?);
        let anchors: BTreeSet<ObjectId> = self
            .condition
            .matching(ctx)
            .into_iter()
            .filter_map(|id| ctx.object(id))
            .filter_map(system_of)
            .collect();
        let connected: BTreeSet<ObjectId> = ctx
            .supply()
            .resource_supply_groups(empire)
            .iter()
            .filter(|group| group.iter().any(|system| anchors.contains(system)))
            .flat_map(|group| group.iter().copied())
            .collect();
        Ok(Box::new(move |obj| {
            system_of(obj).is_some_and(|system| connected.contains(&system))
        }))
    }
}

impl Describe for ResourceSupplyConnectedByEmpire {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let args = [
            self.empire.dump(),
            self.condition.description_with(strings, false),
        ];
        strings.text("DESC_SUPPLY_CONNECTED", negated, &args)
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "ResourceSupplyConnected")
            .field("empire", &self.empire)
            .nested("condition", &self.condition)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("ResourceSupplyConnectedByEmpire")
            .add(&self.empire)
            .add(&self.condition)
            .finish()
    }
}
