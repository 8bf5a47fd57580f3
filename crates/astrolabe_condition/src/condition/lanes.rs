//! Starlane placement geometry.
//!
//! Candidates are systems; the subcondition names the systems a new lane
//! from the candidate would lead to. Objects matched by the subcondition
//! that are not systems stand for the system they are in.

use std::collections::BTreeSet;

use astrolabe_foundation::{ObjectId, ObjectType, Result};
use astrolabe_universe::{Universe, UniverseObject};

use super::Condition;
use super::node::{Describe, Evaluate, Matcher, bind_opt, opt_text, system_of};
use crate::checksum::Checksummer;
use crate::context::ScriptingContext;
use crate::geometry::{Vec2, lanes_angularly_close, point_near_segment, segments_cross};
use crate::invariance::{Invariance, Invariant};
use crate::partition::ObjectSet;
use crate::text::{DumpLine, StringTable};
use crate::value_ref::ValueRef;

/// A point in the galaxy with the system it belongs to.
#[derive(Clone, Copy, Debug)]
struct Anchor {
    system: Option<ObjectId>,
    at: Vec2,
}

/// An existing starlane.
#[derive(Clone, Copy, Debug)]
struct Lane {
    a: ObjectId,
    b: ObjectId,
    at_a: Vec2,
    at_b: Vec2,
}

impl Lane {
    /// The other end, if the lane touches `system`.
    fn other_end(&self, system: ObjectId) -> Option<(ObjectId, Vec2)> {
        if self.a == system {
            Some((self.b, self.at_b))
        } else if self.b == system {
            Some((self.a, self.at_a))
        } else {
            None
        }
    }
}

fn existing_lanes(universe: &Universe) -> Vec<Lane> {
    universe
        .starlanes()
        .into_iter()
        .filter_map(|(a, b)| {
            let at_a = Vec2::of(universe.get(a)?);
            let at_b = Vec2::of(universe.get(b)?);
            Some(Lane { a, b, at_a, at_b })
        })
        .collect()
}

/// Systems of the subcondition's matches, each once.
fn lane_ends(condition: &Condition, ctx: &ScriptingContext<'_>) -> Vec<(ObjectId, Vec2)> {
    let systems: BTreeSet<ObjectId> = condition
        .matching(ctx)
        .into_iter()
        .filter_map(|id| ctx.object(id))
        .filter_map(system_of)
        .collect();
    systems
        .into_iter()
        .filter_map(|id| ctx.object(id).map(|system| (id, Vec2::of(system))))
        .collect()
}

fn anchors(condition: &Condition, ctx: &ScriptingContext<'_>) -> Vec<Anchor> {
    condition
        .matching(ctx)
        .into_iter()
        .filter_map(|id| ctx.object(id))
        .map(|obj| Anchor {
            system: system_of(obj),
            at: Vec2::of(obj),
        })
        .collect()
}

fn crosses_any(from: Vec2, to: Vec2, lanes: &[Lane]) -> bool {
    lanes
        .iter()
        .any(|lane| segments_cross(from, to, lane.at_a, lane.at_b))
}

/// Whether lane `from`-`to` leaves either end too close in angle to an
/// existing lane at that end.
fn angularly_close_to_any(
    from: (ObjectId, Vec2),
    to: (ObjectId, Vec2),
    lanes: &[Lane],
    max_dot_product: f64,
) -> bool {
    let close_at = |(end, at): (ObjectId, Vec2), (far, far_at): (ObjectId, Vec2)| {
        lanes
            .iter()
            .filter_map(|lane| lane.other_end(end))
            .filter(|&(other, _)| other != far)
            .any(|(_, other_at)| lanes_angularly_close(at, far_at, other_at, max_dot_product))
    };
    close_at(from, to) || close_at(to, from)
}

/// Whether lane `from`-`to` passes within `distance` of an anchor not at
/// either end.
fn near_any(
    from: (ObjectId, Vec2),
    to: (ObjectId, Vec2),
    anchors: &[Anchor],
    distance: f64,
) -> bool {
    anchors
        .iter()
        .filter(|anchor| anchor.system != Some(from.0) && anchor.system != Some(to.0))
        .any(|anchor| point_near_segment(anchor.at, from.1, to.1, distance))
}

/// Runs `test` for each lane end other than the candidate system.
fn for_lanes_from<'a, F>(ends: Vec<(ObjectId, Vec2)>, test: F) -> Matcher<'a>
where
    F: Fn((ObjectId, Vec2), (ObjectId, Vec2)) -> bool + 'a,
{
    Box::new(move |obj: &UniverseObject| {
        if obj.object_type != ObjectType::System {
            return false;
        }
        let from = (obj.id, Vec2::of(obj));
        ends.iter()
            .filter(|&&(end, _)| end != obj.id)
            .any(|&to| test(from, to))
    })
}

fn systems(ctx: &ScriptingContext<'_>) -> ObjectSet {
    ctx.universe().objects_of_type(ObjectType::System)
}

// =============================================================================
// Crossing
// =============================================================================

/// Matches systems from which a lane to a subcondition match would cross an
/// existing lane.
#[derive(Clone, Debug, PartialEq)]
pub struct StarlaneToWouldCrossExistingStarlane {
    pub(crate) condition: Box<Condition>,
}

impl Condition {
    /// Systems where a new lane to a match of `condition` would cross a lane.
    #[must_use]
    pub fn starlane_would_cross(condition: Condition) -> Self {
        StarlaneToWouldCrossExistingStarlane {
            condition: Box::new(condition),
        }
        .into()
    }
}

impl Evaluate for StarlaneToWouldCrossExistingStarlane {
    fn invariance(&self) -> Invariance {
        self.condition.invariance().nested()
    }

    fn pool_dependent(&self) -> bool {
        self.condition.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let lanes = existing_lanes(ctx.universe());
        Ok(for_lanes_from(lane_ends(&self.condition, ctx), move |from, to| {
            crosses_any(from.1, to.1, &lanes)
        }))
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        systems(ctx)
    }
}

impl Describe for StarlaneToWouldCrossExistingStarlane {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let inner = self.condition.description_with(strings, false);
        strings.text("DESC_LANE_CROSSES", negated, &[inner])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "StarlaneToWouldCrossExistingStarlane")
            .nested("condition", &self.condition)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("StarlaneToWouldCrossExistingStarlane")
            .add(&self.condition)
            .finish()
    }
}

// =============================================================================
// Angular closeness
// =============================================================================

/// Matches systems from which a lane to a subcondition match would leave
/// either end at a small angle to an existing lane.
///
/// The threshold is `EvaluationConfig::max_lane_dot_product`.
#[derive(Clone, Debug, PartialEq)]
pub struct StarlaneToWouldBeAngularlyCloseToExistingStarlane {
    pub(crate) condition: Box<Condition>,
}

impl Condition {
    /// Systems where a new lane to a match of `condition` would run close
    /// in angle to a lane.
    #[must_use]
    pub fn starlane_would_be_angularly_close(condition: Condition) -> Self {
        StarlaneToWouldBeAngularlyCloseToExistingStarlane {
            condition: Box::new(condition),
        }
        .into()
    }
}

impl Evaluate for StarlaneToWouldBeAngularlyCloseToExistingStarlane {
    fn invariance(&self) -> Invariance {
        self.condition.invariance().nested()
    }

    fn pool_dependent(&self) -> bool {
        self.condition.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let lanes = existing_lanes(ctx.universe());
        let max_dot = ctx.config().max_lane_dot_product;
        Ok(for_lanes_from(lane_ends(&self.condition, ctx), move |from, to| {
            angularly_close_to_any(from, to, &lanes, max_dot)
        }))
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        systems(ctx)
    }
}

impl Describe for StarlaneToWouldBeAngularlyCloseToExistingStarlane {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let inner = self.condition.description_with(strings, false);
        strings.text("DESC_LANE_ANGULARLY_CLOSE", negated, &[inner])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "StarlaneToWouldBeAngularlyCloseToExistingStarlane")
            .nested("condition", &self.condition)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("StarlaneToWouldBeAngularlyCloseToExistingStarlane")
            .add(&self.condition)
            .finish()
    }
}

// =============================================================================
// Proximity
// =============================================================================

/// Matches systems from which a lane to a lane-end match would pass close to
/// an object matched by the second subcondition.
///
/// Objects in either end system are ignored. Without a distance, uses
/// `EvaluationConfig::min_lane_object_distance`.
#[derive(Clone, Debug, PartialEq)]
pub struct StarlaneToWouldBeCloseToObject {
    pub(crate) lane_end: Box<Condition>,
    pub(crate) distance: Option<ValueRef<f64>>,
    pub(crate) objects: Box<Condition>,
}

impl Condition {
    /// Systems where a new lane to a match of `lane_end` would pass within
    /// `distance` of a match of `objects`.
    #[must_use]
    pub fn starlane_would_be_close_to_object(
        lane_end: Condition,
        distance: Option<ValueRef<f64>>,
        objects: Condition,
    ) -> Self {
        StarlaneToWouldBeCloseToObject {
            lane_end: Box::new(lane_end),
            distance,
            objects: Box::new(objects),
        }
        .into()
    }
}

impl Evaluate for StarlaneToWouldBeCloseToObject {
    fn invariance(&self) -> Invariance {
        self.lane_end
            .invariance()
            .nested()
            .and(self.distance.invariance())
            .and(self.objects.invariance().nested())
    }

    fn pool_dependent(&self) -> bool {
        self.lane_end.pool_dependent() || self.objects.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let distance = bind_opt(self.distance.as_ref(), ctx)?
            .unwrap_or(ctx.config().min_lane_object_distance);
        let obstacles = anchors(&self.objects, ctx);
        Ok(for_lanes_from(lane_ends(&self.lane_end, ctx), move |from, to| {
            near_any(from, to, &obstacles, distance)
        }))
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        systems(ctx)
    }
}

impl Describe for StarlaneToWouldBeCloseToObject {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let args = [
            self.lane_end.description_with(strings, false),
            opt_text(self.distance.as_ref(), strings),
            self.objects.description_with(strings, false),
        ];
        strings.text("DESC_LANE_CLOSE_TO_OBJECT", negated, &args)
    }

    fn dump(&self, level: usize) -> String {
        let mut text = DumpLine::new(level, "StarlaneToWouldBeCloseToObject")
            .opt_field("distance", self.distance.as_ref())
            .nested("laneend", &self.lane_end);
        text.push_str(&DumpLine::new(level + 1, "objects =").finish());
        text.push_str(&self.objects.dump(level + 2));
        text
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("StarlaneToWouldBeCloseToObject")
            .add(&self.lane_end)
            .add(&self.distance)
            .add(&self.objects)
            .finish()
    }
}

// =============================================================================
// CanAddStarlaneConnection
// =============================================================================

/// Matches systems that can gain a lane to every subcondition match.
///
/// Each new lane must lead to a different, not yet connected system and
/// pass all three placement tests: no crossing, no small angle, and no
/// other system closer than `EvaluationConfig::min_lane_object_distance`.
/// With no lane ends, nothing matches.
#[derive(Clone, Debug, PartialEq)]
pub struct CanAddStarlaneConnection {
    pub(crate) condition: Box<Condition>,
}

impl Condition {
    /// Systems that can gain a lane to every match of `condition`.
    #[must_use]
    pub fn can_add_starlane_to(condition: Condition) -> Self {
        CanAddStarlaneConnection {
            condition: Box::new(condition),
        }
        .into()
    }
}

impl Evaluate for CanAddStarlaneConnection {
    fn invariance(&self) -> Invariance {
        self.condition.invariance().nested()
    }

    fn pool_dependent(&self) -> bool {
        self.condition.pool_dependent()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let universe = ctx.universe();
        let lanes = existing_lanes(universe);
        let config = ctx.config();
        let obstacles: Vec<Anchor> = universe
            .objects()
            .filter(|obj| obj.object_type == ObjectType::System)
            .map(|system| Anchor {
                system: Some(system.id),
                at: Vec2::of(system),
            })
            .collect();
        let ends = lane_ends(&self.condition, ctx);
        Ok(Box::new(move |obj| {
            if obj.object_type != ObjectType::System || ends.is_empty() {
                return false;
            }
            let from = (obj.id, Vec2::of(obj));
            ends.iter().all(|&to| {
                to.0 != obj.id
                    && !obj.starlanes.contains(&to.0)
                    && !crosses_any(from.1, to.1, &lanes)
                    && !angularly_close_to_any(from, to, &lanes, config.max_lane_dot_product)
                    && !near_any(from, to, &obstacles, config.min_lane_object_distance)
            })
        }))
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        systems(ctx)
    }
}

impl Describe for CanAddStarlaneConnection {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        let inner = self.condition.description_with(strings, false);
        strings.text("DESC_CAN_ADD_STARLANE", negated, &[inner])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "CanAddStarlanesTo").nested("condition", &self.condition)
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("CanAddStarlaneConnection")
            .add(&self.condition)
            .finish()
    }
}
