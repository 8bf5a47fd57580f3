//! Universe objects and the properties conditions can read from them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use astrolabe_foundation::{
    EmpireId, MeterType, ObjectId, ObjectType, PlanetType, StarType, Value,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A special attached to an object.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Special {
    /// Strength of the special.
    pub capacity: f64,
    /// Turn on which the special was attached.
    pub added_on_turn: i32,
}

/// One object in the universe.
///
/// Only the attributes conditions need are modelled. Fields are public so
/// callers can build fixtures directly; the builder methods cover the common
/// cases.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UniverseObject {
    /// Identity, assigned by [`Universe::spawn`](crate::Universe::spawn).
    pub id: ObjectId,
    /// Concrete kind.
    pub object_type: ObjectType,
    /// Display name.
    pub name: String,
    /// Owning empire, if any.
    pub owner: Option<EmpireId>,
    /// Galaxy x coordinate.
    pub x: f64,
    /// Galaxy y coordinate.
    pub y: f64,
    /// Current meter values.
    pub meters: BTreeMap<MeterType, f64>,
    /// Free-form tags.
    pub tags: BTreeSet<String>,
    /// Attached specials by name.
    pub specials: BTreeMap<String, Special>,
    /// Species living on or crewing the object.
    pub species: Option<String>,
    /// Planetary focus.
    pub focus: Option<String>,
    /// Planet classification, for planets.
    pub planet_type: Option<PlanetType>,
    /// Star colour, for systems.
    pub star_type: Option<StarType>,
    /// Building type name, for buildings.
    pub building_type: Option<String>,
    /// Ship design name, for ships.
    pub design_name: Option<String>,
    /// System the object is in.
    pub system_id: Option<ObjectId>,
    /// Direct container (planet for buildings, fleet for ships, system otherwise).
    pub container_id: Option<ObjectId>,
    /// Directly or indirectly contained objects.
    pub contents: Vec<ObjectId>,
    /// Systems connected by a starlane, for systems.
    pub starlanes: BTreeSet<ObjectId>,
    /// Turn the object was created on.
    pub created_on_turn: i32,
    /// Empire that produced the object, for ships and buildings.
    pub produced_by_empire: Option<EmpireId>,
    /// Whether the object carries weapons.
    pub armed: bool,
    /// Whether the object is a monster.
    pub monster: bool,
    /// Next system on the object's route, for fleets and ships.
    pub next_system_id: Option<ObjectId>,
}

impl UniverseObject {
    /// Creates an object of the given type with no attributes set.
    #[must_use]
    pub fn new(object_type: ObjectType, name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::invalid(),
            object_type,
            name: name.into(),
            owner: None,
            x: 0.0,
            y: 0.0,
            meters: BTreeMap::new(),
            tags: BTreeSet::new(),
            specials: BTreeMap::new(),
            species: None,
            focus: None,
            planet_type: None,
            star_type: None,
            building_type: None,
            design_name: None,
            system_id: None,
            container_id: None,
            contents: Vec::new(),
            starlanes: BTreeSet::new(),
            created_on_turn: 0,
            produced_by_empire: None,
            armed: false,
            monster: false,
            next_system_id: None,
        }
    }

    /// Creates a system at the given position.
    #[must_use]
    pub fn system(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new(ObjectType::System, name).at(x, y)
    }

    /// Creates a planet of the given type.
    #[must_use]
    pub fn planet(name: impl Into<String>, planet_type: PlanetType) -> Self {
        let mut planet = Self::new(ObjectType::Planet, name);
        planet.planet_type = Some(planet_type);
        planet
    }

    /// Creates a ship.
    #[must_use]
    pub fn ship(name: impl Into<String>) -> Self {
        Self::new(ObjectType::Ship, name)
    }

    /// Creates a fleet.
    #[must_use]
    pub fn fleet(name: impl Into<String>) -> Self {
        Self::new(ObjectType::Fleet, name)
    }

    /// Creates a building of the given building type.
    #[must_use]
    pub fn building(name: impl Into<String>, building_type: impl Into<String>) -> Self {
        let mut building = Self::new(ObjectType::Building, name);
        building.building_type = Some(building_type.into());
        building
    }

    /// Sets the position.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Sets the owner.
    #[must_use]
    pub fn owned_by(mut self, empire: EmpireId) -> Self {
        self.owner = Some(empire);
        self
    }

    /// Sets a meter value.
    #[must_use]
    pub fn with_meter(mut self, meter: MeterType, value: f64) -> Self {
        self.meters.insert(meter, value);
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Attaches a special.
    #[must_use]
    pub fn with_special(mut self, name: impl Into<String>, capacity: f64, added_on_turn: i32) -> Self {
        self.specials.insert(
            name.into(),
            Special {
                capacity,
                added_on_turn,
            },
        );
        self
    }

    /// Sets the species.
    #[must_use]
    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    /// Sets the focus.
    #[must_use]
    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = Some(focus.into());
        self
    }

    /// Sets the star colour.
    #[must_use]
    pub fn with_star(mut self, star_type: StarType) -> Self {
        self.star_type = Some(star_type);
        self
    }

    /// Sets the creation turn.
    #[must_use]
    pub fn created_on(mut self, turn: i32) -> Self {
        self.created_on_turn = turn;
        self
    }

    /// Sets the producing empire.
    #[must_use]
    pub fn produced_by(mut self, empire: EmpireId) -> Self {
        self.produced_by_empire = Some(empire);
        self
    }

    /// Marks the object as armed.
    #[must_use]
    pub fn armed(mut self) -> Self {
        self.armed = true;
        self
    }

    /// Marks the object as a monster.
    #[must_use]
    pub fn monster(mut self) -> Self {
        self.monster = true;
        self
    }

    /// Sets the design name.
    #[must_use]
    pub fn with_design(mut self, design: impl Into<String>) -> Self {
        self.design_name = Some(design.into());
        self
    }

    /// Sets the next system on the object's route.
    #[must_use]
    pub fn heading_to(mut self, system: ObjectId) -> Self {
        self.next_system_id = Some(system);
        self
    }

    /// Returns a meter value, if the object has that meter.
    #[must_use]
    pub fn meter(&self, meter: MeterType) -> Option<f64> {
        self.meters.get(&meter).copied()
    }

    /// Returns true if the object carries the tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Objects that directly or through their system contain this object.
    ///
    /// The direct container comes first; the system follows when it differs.
    #[must_use]
    pub fn containers(&self) -> Vec<ObjectId> {
        let mut containers = Vec::with_capacity(2);
        if let Some(container) = self.container_id {
            containers.push(container);
        }
        if let Some(system) = self.system_id {
            if Some(system) != self.container_id {
                containers.push(system);
            }
        }
        containers
    }

    /// Whether a moving object has no next system (or its next system is where it is).
    #[must_use]
    pub fn is_stationary(&self) -> bool {
        match self.next_system_id {
            None => true,
            Some(next) => Some(next) == self.system_id,
        }
    }

    /// Reads a property as a dynamically typed value.
    #[must_use]
    pub fn property(&self, property: ObjectProperty, current_turn: i32) -> Value {
        match property {
            ObjectProperty::Id => Value::Object(self.id),
            ObjectProperty::Owner => Value::Int(self.owner.map_or(-1, EmpireId::raw)),
            ObjectProperty::CreatedOnTurn => Value::Int(self.created_on_turn),
            ObjectProperty::Age => Value::Int(current_turn.saturating_sub(self.created_on_turn)),
            ObjectProperty::X => Value::Float(self.x),
            ObjectProperty::Y => Value::Float(self.y),
            ObjectProperty::SystemId => Value::Int(self.system_id.map_or(-1, ObjectId::raw)),
            ObjectProperty::ContainerId => {
                Value::Int(self.container_id.map_or(-1, ObjectId::raw))
            }
            ObjectProperty::NextSystemId => {
                Value::Int(self.next_system_id.map_or(-1, ObjectId::raw))
            }
            ObjectProperty::ProducedByEmpireId => {
                Value::Int(self.produced_by_empire.map_or(-1, EmpireId::raw))
            }
            ObjectProperty::Meter(meter) => Value::from(self.meter(meter)),
            ObjectProperty::Name => Value::from(self.name.as_str()),
            ObjectProperty::Species => Value::from(self.species.as_deref()),
            ObjectProperty::Focus => Value::from(self.focus.as_deref()),
            ObjectProperty::BuildingType => Value::from(self.building_type.as_deref()),
            ObjectProperty::DesignName => Value::from(self.design_name.as_deref()),
            ObjectProperty::TypeName => Value::from(self.object_type.name()),
            ObjectProperty::NumSpecials => {
                Value::Int(i32::try_from(self.specials.len()).unwrap_or(i32::MAX))
            }
        }
    }
}

/// Properties a value reference can read from an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObjectProperty {
    /// Object id.
    Id,
    /// Owner empire id, -1 when unowned.
    Owner,
    /// Creation turn.
    CreatedOnTurn,
    /// Turns since creation.
    Age,
    /// X coordinate.
    X,
    /// Y coordinate.
    Y,
    /// System id, -1 when outside a system.
    SystemId,
    /// Container id, -1 when uncontained.
    ContainerId,
    /// Next system id, -1 when none.
    NextSystemId,
    /// Producing empire id, -1 when none.
    ProducedByEmpireId,
    /// A meter's current value.
    Meter(MeterType),
    /// Display name.
    Name,
    /// Species name.
    Species,
    /// Focus name.
    Focus,
    /// Building type name.
    BuildingType,
    /// Ship design name.
    DesignName,
    /// Object type name.
    TypeName,
    /// Number of attached specials.
    NumSpecials,
}

impl ObjectProperty {
    /// Canonical name used in dumps.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Owner => "Owner",
            Self::CreatedOnTurn => "CreationTurn",
            Self::Age => "Age",
            Self::X => "X",
            Self::Y => "Y",
            Self::SystemId => "SystemID",
            Self::ContainerId => "ContainerID",
            Self::NextSystemId => "NextSystemID",
            Self::ProducedByEmpireId => "ProducedByEmpireID",
            Self::Meter(meter) => meter.name(),
            Self::Name => "Name",
            Self::Species => "Species",
            Self::Focus => "Focus",
            Self::BuildingType => "BuildingType",
            Self::DesignName => "DesignName",
            Self::TypeName => "TypeName",
            Self::NumSpecials => "NumSpecials",
        }
    }

    /// Stable discriminant used by structural checksums.
    #[must_use]
    pub fn ordinal(self) -> u32 {
        match self {
            Self::Id => 0,
            Self::Owner => 1,
            Self::CreatedOnTurn => 2,
            Self::Age => 3,
            Self::X => 4,
            Self::Y => 5,
            Self::SystemId => 6,
            Self::ContainerId => 7,
            Self::NextSystemId => 8,
            Self::ProducedByEmpireId => 9,
            Self::Meter(meter) => 100 + meter.ordinal(),
            Self::Name => 10,
            Self::Species => 11,
            Self::Focus => 12,
            Self::BuildingType => 13,
            Self::DesignName => 14,
            Self::TypeName => 15,
            Self::NumSpecials => 16,
        }
    }
}

impl fmt::Display for ObjectProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let ship = UniverseObject::ship("Scout")
            .owned_by(EmpireId::new(1))
            .with_meter(MeterType::Fuel, 3.0)
            .with_tag("ROBOTIC")
            .armed();

        assert_eq!(ship.object_type, ObjectType::Ship);
        assert_eq!(ship.owner, Some(EmpireId::new(1)));
        assert_eq!(ship.meter(MeterType::Fuel), Some(3.0));
        assert_eq!(ship.meter(MeterType::Structure), None);
        assert!(ship.has_tag("ROBOTIC"));
        assert!(ship.armed);
    }

    #[test]
    fn containers_lists_container_then_system() {
        let mut building = UniverseObject::building("Yard", "BLD_SHIPYARD");
        building.container_id = Some(ObjectId::new(4));
        building.system_id = Some(ObjectId::new(2));
        assert_eq!(building.containers(), vec![ObjectId::new(4), ObjectId::new(2)]);

        let mut planet = UniverseObject::planet("Earth", PlanetType::Terran);
        planet.container_id = Some(ObjectId::new(2));
        planet.system_id = Some(ObjectId::new(2));
        assert_eq!(planet.containers(), vec![ObjectId::new(2)]);
    }

    #[test]
    fn stationary_when_no_route() {
        let fleet = UniverseObject::fleet("Home Fleet");
        assert!(fleet.is_stationary());

        let moving = UniverseObject::fleet("Raiders").heading_to(ObjectId::new(9));
        assert!(!moving.is_stationary());
    }

    #[test]
    fn property_reads() {
        let planet = UniverseObject::planet("Mars", PlanetType::Desert)
            .created_on(3)
            .with_species("SP_HUMAN")
            .with_meter(MeterType::Population, 12.5);

        assert_eq!(planet.property(ObjectProperty::Age, 10), Value::Int(7));
        assert_eq!(
            planet.property(ObjectProperty::Meter(MeterType::Population), 10),
            Value::Float(12.5)
        );
        assert_eq!(planet.property(ObjectProperty::Species, 0), Value::from("SP_HUMAN"));
        assert_eq!(planet.property(ObjectProperty::Owner, 0), Value::Int(-1));
        assert!(planet.property(ObjectProperty::Focus, 0).is_nil());
    }

    #[test]
    fn meter_property_names_use_meter_name() {
        assert_eq!(ObjectProperty::Meter(MeterType::Industry).name(), "Industry");
        assert_ne!(
            ObjectProperty::Meter(MeterType::Industry).ordinal(),
            ObjectProperty::Meter(MeterType::Research).ordinal()
        );
    }
}
