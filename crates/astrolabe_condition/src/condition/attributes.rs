//! Tests on an object's own attributes.
//!
//! Buildings answer planet questions (species, focus, planet type) through
//! the planet they stand on; star questions go through the object's system.

use astrolabe_foundation::{Error, ObjectType, PlanetType, Result, StarType};
use astrolabe_universe::{SpeciesRegistry, Universe, UniverseObject};
use tracing::debug;

use super::Condition;
use super::node::{Describe, Evaluate, Matcher, bind_names, bind_opt, in_range, list_text, opt_text};
use crate::checksum::Checksummer;
use crate::context::ScriptingContext;
use crate::invariance::{Invariance, Invariant};
use crate::partition::ObjectSet;
use crate::text::{DumpLine, StringTable};
use crate::value_ref::ValueRef;

/// The planet an object answers planet questions for.
fn planet_of<'u>(universe: &'u Universe, obj: &'u UniverseObject) -> Option<&'u UniverseObject> {
    match obj.object_type {
        ObjectType::Planet => Some(obj),
        ObjectType::Building => obj
            .container_id
            .and_then(|id| universe.get(id))
            .filter(|planet| planet.object_type == ObjectType::Planet),
        _ => None,
    }
}

/// The species living on or crewing an object.
fn species_of<'u>(universe: &'u Universe, obj: &'u UniverseObject) -> Option<&'u str> {
    match obj.object_type {
        ObjectType::Building => planet_of(universe, obj)?.species.as_deref(),
        _ => obj.species.as_deref(),
    }
}

fn known_species(registry: &dyn SpeciesRegistry, name: String) -> Result<String> {
    if registry.exists(&name) {
        Ok(name)
    } else {
        Err(Error::unknown_species(name))
    }
}

fn name_in(name: Option<&str>, names: &[String]) -> bool {
    name.is_some_and(|name| names.is_empty() || names.iter().any(|n| n == name))
}

// =============================================================================
// Homeworld
// =============================================================================

/// Matches planets that are the homeworld of one of the named species, or of
/// the species living there when no names are given.
#[derive(Clone, Debug, PartialEq)]
pub struct Homeworld {
    pub(crate) names: Vec<ValueRef<String>>,
}

impl Condition {
    /// Homeworlds of the given species; any species when empty.
    #[must_use]
    pub fn homeworld(names: Vec<ValueRef<String>>) -> Self {
        Homeworld { names }.into()
    }
}

impl Evaluate for Homeworld {
    fn invariance(&self) -> Invariance {
        self.names.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let registry = ctx.species();
        let names: Vec<String> = bind_names(&self.names, ctx)?
            .into_iter()
            .filter_map(|name| {
                known_species(registry, name)
                    .inspect_err(|err| debug!(%err, "skipping homeworld species"))
                    .ok()
            })
            .collect();
        let any_species = self.names.is_empty();
        Ok(Box::new(move |obj| {
            if obj.object_type != ObjectType::Planet {
                return false;
            }
            if any_species {
                obj.species
                    .as_deref()
                    .is_some_and(|species| registry.homeworlds(species).contains(&obj.id))
            } else {
                names
                    .iter()
                    .any(|name| registry.homeworlds(name).contains(&obj.id))
            }
        }))
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        ctx.universe().objects_of_type(ObjectType::Planet)
    }
}

impl Describe for Homeworld {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_HOMEWORLD", negated, &[list_text(&self.names, strings)])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "HomeWorld")
            .list("name", &self.names)
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Homeworld").add(&self.names).finish()
    }
}

// =============================================================================
// Flags
// =============================================================================

macro_rules! flag_node {
    ($(#[$meta:meta])* $name:ident, $ctor:ident, $key:literal, |$obj:ident| $test:expr) => {
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
                Invariance::ALL
            }

            fn bind<'a>(&'a self, _ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
                Ok(Box::new(|$obj: &UniverseObject| $test))
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

flag_node!(
    /// Matches monsters.
    Monster,
    monster,
    "DESC_MONSTER",
    |obj| obj.monster
);
flag_node!(
    /// Matches objects carrying weapons.
    Armed,
    armed,
    "DESC_ARMED",
    |obj| obj.armed
);

// =============================================================================
// Building
// =============================================================================

/// Matches buildings, optionally restricted to building types.
#[derive(Clone, Debug, PartialEq)]
pub struct Building {
    pub(crate) names: Vec<ValueRef<String>>,
}

impl Condition {
    /// Buildings of the given types; any building when empty.
    #[must_use]
    pub fn building(names: Vec<ValueRef<String>>) -> Self {
        Building { names }.into()
    }
}

impl Evaluate for Building {
    fn invariance(&self) -> Invariance {
        self.names.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let names = bind_names(&self.names, ctx)?;
        Ok(Box::new(move |obj| {
            obj.object_type == ObjectType::Building && name_in(obj.building_type.as_deref(), &names)
        }))
    }

    fn default_candidates(&self, ctx: &ScriptingContext<'_>) -> ObjectSet {
        ctx.universe().objects_of_type(ObjectType::Building)
    }
}

impl Describe for Building {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_BUILDING", negated, &[list_text(&self.names, strings)])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Building")
            .list("name", &self.names)
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Building").add(&self.names).finish()
    }
}

// =============================================================================
// HasSpecial
// =============================================================================

/// Matches objects with a special whose capacity and attachment turn lie in
/// the given ranges.
///
/// Without a name, any attached special qualifies.
#[derive(Clone, Debug, PartialEq)]
pub struct HasSpecial {
    pub(crate) name: Option<ValueRef<String>>,
    pub(crate) capacity_low: Option<ValueRef<f64>>,
    pub(crate) capacity_high: Option<ValueRef<f64>>,
    pub(crate) since_turn_low: Option<ValueRef<i32>>,
    pub(crate) since_turn_high: Option<ValueRef<i32>>,
}

impl HasSpecial {
    /// Any special, or the named one.
    #[must_use]
    pub fn new(name: Option<ValueRef<String>>) -> Self {
        Self {
            name,
            capacity_low: None,
            capacity_high: None,
            since_turn_low: None,
            since_turn_high: None,
        }
    }

    /// Requires the special's capacity in `[low, high]`.
    #[must_use]
    pub fn with_capacity(mut self, low: Option<ValueRef<f64>>, high: Option<ValueRef<f64>>) -> Self {
        self.capacity_low = low;
        self.capacity_high = high;
        self
    }

    /// Requires the special to have been added in `[low, high]`.
    #[must_use]
    pub fn added_between(mut self, low: Option<ValueRef<i32>>, high: Option<ValueRef<i32>>) -> Self {
        self.since_turn_low = low;
        self.since_turn_high = high;
        self
    }
}

impl Condition {
    /// Objects with the named special; any special when `None`.
    #[must_use]
    pub fn has_special(name: Option<ValueRef<String>>) -> Self {
        HasSpecial::new(name).into()
    }
}

impl Evaluate for HasSpecial {
    fn invariance(&self) -> Invariance {
        self.name
            .invariance()
            .and(self.capacity_low.invariance())
            .and(self.capacity_high.invariance())
            .and(self.since_turn_low.invariance())
            .and(self.since_turn_high.invariance())
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let name = bind_opt(self.name.as_ref(), ctx)?;
        let capacity_low = bind_opt(self.capacity_low.as_ref(), ctx)?;
        let capacity_high = bind_opt(self.capacity_high.as_ref(), ctx)?;
        let since_low = bind_opt(self.since_turn_low.as_ref(), ctx)?;
        let since_high = bind_opt(self.since_turn_high.as_ref(), ctx)?;
        Ok(Box::new(move |obj| {
            obj.specials
                .iter()
                .filter(|(special, _)| name.as_ref().is_none_or(|name| *special == name))
                .any(|(_, special)| {
                    in_range(&special.capacity, capacity_low.as_ref(), capacity_high.as_ref())
                        && in_range(&special.added_on_turn, since_low.as_ref(), since_high.as_ref())
                })
        }))
    }
}

impl Describe for HasSpecial {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_HAS_SPECIAL", negated, &[opt_text(self.name.as_ref(), strings)])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "HasSpecial")
            .opt_field("name", self.name.as_ref())
            .opt_field("capacity_low", self.capacity_low.as_ref())
            .opt_field("capacity_high", self.capacity_high.as_ref())
            .opt_field("since_turn_low", self.since_turn_low.as_ref())
            .opt_field("since_turn_high", self.since_turn_high.as_ref())
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("HasSpecial")
            .add(&self.name)
            .add(&self.capacity_low)
            .add(&self.capacity_high)
            .add(&self.since_turn_low)
            .add(&self.since_turn_high)
            .finish()
    }
}

// =============================================================================
// HasTag
// =============================================================================

/// Matches objects carrying a tag, directly or through their species.
///
/// Without a name, any object with at least one tag of its own matches.
#[derive(Clone, Debug, PartialEq)]
pub struct HasTag {
    pub(crate) name: Option<ValueRef<String>>,
}

impl Condition {
    /// Objects tagged `name`; any tagged object when `None`.
    #[must_use]
    pub fn has_tag(name: Option<ValueRef<String>>) -> Self {
        HasTag { name }.into()
    }
}

impl Evaluate for HasTag {
    fn invariance(&self) -> Invariance {
        self.name.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let name = bind_opt(self.name.as_ref(), ctx)?;
        let universe = ctx.universe();
        let species = ctx.species();
        Ok(Box::new(move |obj| match &name {
            None => !obj.tags.is_empty(),
            Some(tag) => {
                obj.has_tag(tag)
                    || species_of(universe, obj).is_some_and(|s| species.has_tag(s, tag))
            }
        }))
    }
}

impl Describe for HasTag {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_HAS_TAG", negated, &[opt_text(self.name.as_ref(), strings)])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "HasTag")
            .opt_field("name", self.name.as_ref())
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("HasTag").add(&self.name).finish()
    }
}

// =============================================================================
// Species / Focus
// =============================================================================

/// Matches objects of the named species; any populated object when empty.
#[derive(Clone, Debug, PartialEq)]
pub struct Species {
    pub(crate) names: Vec<ValueRef<String>>,
}

impl Condition {
    /// Objects of the given species; any species when empty.
    #[must_use]
    pub fn species(names: Vec<ValueRef<String>>) -> Self {
        Species { names }.into()
    }
}

impl Evaluate for Species {
    fn invariance(&self) -> Invariance {
        self.names.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let names = bind_names(&self.names, ctx)?;
        let universe = ctx.universe();
        Ok(Box::new(move |obj| name_in(species_of(universe, obj), &names)))
    }
}

impl Describe for Species {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_SPECIES", negated, &[list_text(&self.names, strings)])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Species")
            .list("name", &self.names)
            .finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Species").add(&self.names).finish()
    }
}

/// Matches planets (and buildings on them) with one of the named foci.
#[derive(Clone, Debug, PartialEq)]
pub struct Focus {
    pub(crate) names: Vec<ValueRef<String>>,
}

impl Condition {
    /// Planets with one of the given foci; any focus when empty.
    #[must_use]
    pub fn focus(names: Vec<ValueRef<String>>) -> Self {
        Focus { names }.into()
    }
}

impl Evaluate for Focus {
    fn invariance(&self) -> Invariance {
        self.names.invariance()
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let names = bind_names(&self.names, ctx)?;
        let universe = ctx.universe();
        Ok(Box::new(move |obj| {
            let focus = planet_of(universe, obj).and_then(|planet| planet.focus.as_deref());
            name_in(focus, &names)
        }))
    }
}

impl Describe for Focus {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_FOCUS", negated, &[list_text(&self.names, strings)])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Focus").list("type", &self.names).finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Focus").add(&self.names).finish()
    }
}

// =============================================================================
// PlanetType / StarType
// =============================================================================

/// Matches planets (and buildings on them) of the listed types.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetTypeIs {
    pub(crate) types: Vec<PlanetType>,
}

impl Condition {
    /// Planets of the given types; any planet when empty.
    #[must_use]
    pub fn planet_type(types: Vec<PlanetType>) -> Self {
        PlanetTypeIs { types }.into()
    }
}

impl Evaluate for PlanetTypeIs {
    fn invariance(&self) -> Invariance {
        Invariance::ALL
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let universe = ctx.universe();
        let types = &self.types;
        Ok(Box::new(move |obj| {
            planet_of(universe, obj)
                .and_then(|planet| planet.planet_type)
                .is_some_and(|t| types.is_empty() || types.contains(&t))
        }))
    }
}

impl Describe for PlanetTypeIs {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_PLANET_TYPE", negated, &[list_text(&self.types, strings)])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Planet").list("type", &self.types).finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("PlanetType").add(&self.types).finish()
    }
}

/// Matches systems, and objects in systems, with one of the listed stars.
#[derive(Clone, Debug, PartialEq)]
pub struct StarTypeIs {
    pub(crate) types: Vec<StarType>,
}

impl Condition {
    /// Objects at stars of the given types; any star when empty.
    #[must_use]
    pub fn star_type(types: Vec<StarType>) -> Self {
        StarTypeIs { types }.into()
    }
}

impl Evaluate for StarTypeIs {
    fn invariance(&self) -> Invariance {
        Invariance::ALL
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let universe = ctx.universe();
        let types = &self.types;
        Ok(Box::new(move |obj| {
            let system = if obj.object_type == ObjectType::System {
                Some(obj)
            } else {
                obj.system_id.and_then(|id| universe.get(id))
            };
            system
                .and_then(|system| system.star_type)
                .is_some_and(|t| types.is_empty() || types.contains(&t))
        }))
    }
}

impl Describe for StarTypeIs {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_STAR_TYPE", negated, &[list_text(&self.types, strings)])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Star").list("type", &self.types).finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("StarType").add(&self.types).finish()
    }
}

// =============================================================================
// Stationary / CanColonize
// =============================================================================

/// Matches objects that are not moving.
///
/// Fleets are stationary without a next system; ships follow their fleet.
/// Every other kind of object is stationary.
#[derive(Clone, Debug, PartialEq)]
pub struct Stationary;

impl Condition {
    /// Objects not moving.
    #[must_use]
    pub fn stationary() -> Self {
        Stationary.into()
    }
}

impl Evaluate for Stationary {
    fn invariance(&self) -> Invariance {
        Invariance::ALL
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let universe = ctx.universe();
        Ok(Box::new(move |obj| match obj.object_type {
            ObjectType::Fleet => obj.is_stationary(),
            ObjectType::Ship => obj
                .container_id
                .and_then(|id| universe.get(id))
                .filter(|fleet| fleet.object_type == ObjectType::Fleet)
                .map_or_else(|| obj.is_stationary(), UniverseObject::is_stationary),
            _ => true,
        }))
    }
}

impl Describe for Stationary {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_STATIONARY", negated, &[])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "Stationary").finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("Stationary").finish()
    }
}

/// Matches objects whose species can colonize.
#[derive(Clone, Debug, PartialEq)]
pub struct CanColonize;

impl Condition {
    /// Objects whose species can colonize.
    #[must_use]
    pub fn can_colonize() -> Self {
        CanColonize.into()
    }
}

impl Evaluate for CanColonize {
    fn invariance(&self) -> Invariance {
        Invariance::ALL
    }

    fn bind<'a>(&'a self, ctx: &ScriptingContext<'a>) -> Result<Matcher<'a>> {
        let universe = ctx.universe();
        let registry = ctx.species();
        Ok(Box::new(move |obj| {
            species_of(universe, obj).is_some_and(|species| registry.can_colonize(species))
        }))
    }
}

impl Describe for CanColonize {
    fn describe(&self, strings: &dyn StringTable, negated: bool) -> String {
        strings.text("DESC_CAN_COLONIZE", negated, &[])
    }

    fn dump(&self, level: usize) -> String {
        DumpLine::new(level, "CanColonize").finish()
    }

    fn checksum(&self) -> u32 {
        Checksummer::tagged("CanColonize").finish()
    }
}
