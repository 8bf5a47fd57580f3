//! Universe state management with immutable snapshots.
//!
//! The `Universe` is the object arena conditions read from. It uses
//! persistent data structures for O(1) cloning and structural sharing, so an
//! evaluation can hold a snapshot while the caller prepares the next one.

use std::sync::Arc;

use astrolabe_foundation::{EmpireId, Error, ObjectId, ObjectType, Result, Visibility};
use tracing::trace;

use crate::object::UniverseObject;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable snapshot of every object in the galaxy.
///
/// Clone is O(1) due to structural sharing.
/// All mutation methods return a new `Universe` instance.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Universe {
    /// Objects keyed by id; iteration is in ascending id order.
    objects: im::OrdMap<ObjectId, Arc<UniverseObject>>,
    /// Per-empire visibility of objects; absent entries are `Invalid`.
    visibility: im::HashMap<(EmpireId, ObjectId), Visibility>,
    /// Next id handed out by `spawn`.
    next_id: i32,
}

impl Universe {
    /// Creates an empty universe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the universe has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Looks up an object.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&UniverseObject> {
        self.objects.get(&id).map(AsRef::as_ref)
    }

    /// Returns true if the object exists.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Iterates all objects in ascending id order.
    pub fn objects(&self) -> impl Iterator<Item = &UniverseObject> + '_ {
        self.objects.values().map(AsRef::as_ref)
    }

    /// All object ids in ascending order.
    #[must_use]
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    /// Ids of all objects of the given type, in ascending order.
    #[must_use]
    pub fn objects_of_type(&self, object_type: ObjectType) -> Vec<ObjectId> {
        self.objects()
            .filter(|obj| obj.object_type == object_type)
            .map(|obj| obj.id)
            .collect()
    }

    /// Every starlane once, as `(lower id, higher id)` pairs.
    #[must_use]
    pub fn starlanes(&self) -> Vec<(ObjectId, ObjectId)> {
        let mut lanes = Vec::new();
        for system in self.objects().filter(|o| o.object_type == ObjectType::System) {
            for &other in &system.starlanes {
                if system.id < other {
                    lanes.push((system.id, other));
                }
            }
        }
        lanes
    }

    /// How well the empire can see the object.
    #[must_use]
    pub fn visibility(&self, empire: EmpireId, object: ObjectId) -> Visibility {
        self.visibility
            .get(&(empire, object))
            .copied()
            .unwrap_or(Visibility::Invalid)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Adds an object, assigning it the next free id.
    #[must_use]
    pub fn spawn(&self, mut object: UniverseObject) -> (Universe, ObjectId) {
        let id = ObjectId::new(self.next_id);
        object.id = id;
        trace!(%id, object_type = %object.object_type, "spawned object");

        let mut next = self.clone();
        next.objects.insert(id, Arc::new(object));
        next.next_id += 1;
        (next, id)
    }

    /// Applies an edit to one object.
    ///
    /// # Errors
    /// Returns an error if the object does not exist.
    pub fn update(&self, id: ObjectId, edit: impl FnOnce(&mut UniverseObject)) -> Result<Universe> {
        let current = self.objects.get(&id).ok_or_else(|| Error::object_not_found(id))?;
        let mut object = UniverseObject::clone(current);
        edit(&mut object);
        object.id = id;

        let mut next = self.clone();
        next.objects.insert(id, Arc::new(object));
        Ok(next)
    }

    /// Sets a meter value on an object.
    ///
    /// # Errors
    /// Returns an error if the object does not exist.
    pub fn set_meter(
        &self,
        id: ObjectId,
        meter: astrolabe_foundation::MeterType,
        value: f64,
    ) -> Result<Universe> {
        self.update(id, |obj| {
            obj.meters.insert(meter, value);
        })
    }

    /// Connects two systems with a starlane.
    ///
    /// # Errors
    /// Returns an error if either object is missing or not a system, or if
    /// both ends are the same system.
    pub fn add_starlane(&self, a: ObjectId, b: ObjectId) -> Result<Universe> {
        if a == b {
            return Err(Error::invalid_topology(format!(
                "starlane from system {a} to itself"
            )));
        }
        self.require_type(a, ObjectType::System)?;
        self.require_type(b, ObjectType::System)?;

        self.update(a, |sys| {
            sys.starlanes.insert(b);
        })?
        .update(b, |sys| {
            sys.starlanes.insert(a);
        })
    }

    /// Places an object directly in a system, at the system's position.
    ///
    /// # Errors
    /// Returns an error if either object is missing or the container is not a system.
    pub fn place_in_system(&self, system: ObjectId, object: ObjectId) -> Result<Universe> {
        self.require_type(system, ObjectType::System)?;
        if !self.contains(object) {
            return Err(Error::object_not_found(object));
        }
        let (x, y) = self.get(system).map(|s| (s.x, s.y)).unwrap_or_default();

        self.update(object, |obj| {
            obj.system_id = Some(system);
            obj.container_id = Some(system);
            obj.x = x;
            obj.y = y;
        })?
        .update(system, |sys| {
            if !sys.contents.contains(&object) {
                sys.contents.push(object);
            }
        })
    }

    /// Puts an object inside a planet or fleet.
    ///
    /// The contained object joins the container's system and takes its
    /// position; the system lists it among its contents as well.
    ///
    /// # Errors
    /// Returns an error if either object is missing, if the container is not
    /// a planet or fleet, or if an object would contain itself.
    pub fn contain(&self, container: ObjectId, object: ObjectId) -> Result<Universe> {
        if container == object {
            return Err(Error::invalid_topology(format!(
                "object {object} cannot contain itself"
            )));
        }
        let host = self
            .get(container)
            .ok_or_else(|| Error::object_not_found(container))?;
        if !matches!(host.object_type, ObjectType::Planet | ObjectType::Fleet) {
            return Err(Error::invalid_topology(format!(
                "{} {container} cannot contain objects",
                host.object_type
            )));
        }
        if !self.contains(object) {
            return Err(Error::object_not_found(object));
        }
        let (system, x, y) = (host.system_id, host.x, host.y);

        let mut next = self
            .update(object, |obj| {
                obj.container_id = Some(container);
                obj.system_id = system;
                obj.x = x;
                obj.y = y;
            })?
            .update(container, |host| {
                if !host.contents.contains(&object) {
                    host.contents.push(object);
                }
            })?;
        if let Some(system) = system {
            next = next.update(system, |sys| {
                if !sys.contents.contains(&object) {
                    sys.contents.push(object);
                }
            })?;
        }
        Ok(next)
    }

    /// Records how well an empire can see an object.
    #[must_use]
    pub fn set_visibility(&self, empire: EmpireId, object: ObjectId, vis: Visibility) -> Universe {
        let mut next = self.clone();
        next.visibility.insert((empire, object), vis);
        next
    }

    fn require_type(&self, id: ObjectId, expected: ObjectType) -> Result<()> {
        let obj = self.get(id).ok_or_else(|| Error::object_not_found(id))?;
        if obj.object_type == expected {
            Ok(())
        } else {
            Err(Error::invalid_topology(format!(
                "object {id} is a {}, expected a {expected}",
                obj.object_type
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astrolabe_foundation::{ErrorKind, MeterType, PlanetType};

    #[test]
    fn spawn_assigns_sequential_ids() {
        let universe = Universe::new();
        let (universe, a) = universe.spawn(UniverseObject::system("A", 0.0, 0.0));
        let (universe, b) = universe.spawn(UniverseObject::system("B", 1.0, 0.0));

        assert_eq!(a, ObjectId::new(0));
        assert_eq!(b, ObjectId::new(1));
        assert_eq!(universe.len(), 2);
        assert_eq!(universe.get(b).map(|o| o.name.as_str()), Some("B"));
    }

    #[test]
    fn spawn_leaves_original_untouched() {
        let empty = Universe::new();
        let (one, _) = empty.spawn(UniverseObject::ship("S"));
        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn starlanes_are_symmetric_and_listed_once() {
        let (u, a) = Universe::new().spawn(UniverseObject::system("A", 0.0, 0.0));
        let (u, b) = u.spawn(UniverseObject::system("B", 5.0, 0.0));
        let u = u.add_starlane(b, a).unwrap();

        assert!(u.get(a).unwrap().starlanes.contains(&b));
        assert!(u.get(b).unwrap().starlanes.contains(&a));
        assert_eq!(u.starlanes(), vec![(a, b)]);
    }

    #[test]
    fn starlane_requires_two_distinct_systems() {
        let (u, a) = Universe::new().spawn(UniverseObject::system("A", 0.0, 0.0));
        let (u, p) = u.spawn(UniverseObject::planet("P", PlanetType::Ocean));

        let err = u.add_starlane(a, a).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidTopology(_)));
        let err = u.add_starlane(a, p).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidTopology(_)));
    }

    #[test]
    fn containment_propagates_system_and_position() {
        let (u, sys) = Universe::new().spawn(UniverseObject::system("Sol", 3.0, 4.0));
        let (u, planet) = u.spawn(UniverseObject::planet("Earth", PlanetType::Terran));
        let (u, building) = u.spawn(UniverseObject::building("Yard", "BLD_SHIPYARD"));
        let u = u.place_in_system(sys, planet).unwrap();
        let u = u.contain(planet, building).unwrap();

        let b = u.get(building).unwrap();
        assert_eq!(b.container_id, Some(planet));
        assert_eq!(b.system_id, Some(sys));
        assert_eq!((b.x, b.y), (3.0, 4.0));
        assert!(u.get(planet).unwrap().contents.contains(&building));
        assert!(u.get(sys).unwrap().contents.contains(&building));
    }

    #[test]
    fn set_meter_on_missing_object_fails() {
        let err = Universe::new()
            .set_meter(ObjectId::new(3), MeterType::Industry, 1.0)
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ObjectNotFound(_)));
    }

    #[test]
    fn visibility_defaults_to_invalid() {
        let (u, ship) = Universe::new().spawn(UniverseObject::ship("S"));
        let empire = EmpireId::new(1);
        assert_eq!(u.visibility(empire, ship), Visibility::Invalid);
        let u = u.set_visibility(empire, ship, Visibility::Partial);
        assert_eq!(u.visibility(empire, ship), Visibility::Partial);
    }

    #[test]
    fn objects_of_type_filters() {
        let (u, _) = Universe::new().spawn(UniverseObject::system("A", 0.0, 0.0));
        let (u, s) = u.spawn(UniverseObject::ship("S"));
        assert_eq!(u.objects_of_type(ObjectType::Ship), vec![s]);
    }
}
