//! Integration tests for the object arena

use astrolabe_foundation::{EmpireId, MeterType, ObjectId, ObjectType, PlanetType, Value};
use astrolabe_universe::{ObjectProperty, Universe, UniverseObject};

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn snapshots_are_independent() {
    let (before, sys) = Universe::new().spawn(UniverseObject::system("Sol", 0.0, 0.0));
    let (after, planet) = before.spawn(UniverseObject::planet("Earth", PlanetType::Terran));
    let after = after.place_in_system(sys, planet).unwrap();

    assert_eq!(before.len(), 1);
    assert!(before.get(sys).unwrap().contents.is_empty());
    assert_eq!(after.get(sys).unwrap().contents, vec![planet]);
}

#[test]
fn update_keeps_id() {
    let (u, ship) = Universe::new().spawn(UniverseObject::ship("Scout"));
    let u = u
        .update(ship, |obj| {
            obj.id = ObjectId::new(99);
            obj.name = "Renamed".to_owned();
        })
        .unwrap();
    let obj = u.get(ship).unwrap();
    assert_eq!(obj.id, ship);
    assert_eq!(obj.name, "Renamed");
}

// =============================================================================
// Containment
// =============================================================================

#[test]
fn ships_in_fleets_know_both_containers() {
    let (u, sys) = Universe::new().spawn(UniverseObject::system("Sol", 5.0, 5.0));
    let (u, fleet) = u.spawn(UniverseObject::fleet("Home Fleet"));
    let (u, ship) = u.spawn(UniverseObject::ship("Scout"));
    let u = u.place_in_system(sys, fleet).unwrap();
    let u = u.contain(fleet, ship).unwrap();

    let ship = u.get(ship).unwrap();
    assert_eq!(ship.containers(), vec![fleet, sys]);
    assert_eq!((ship.x, ship.y), (5.0, 5.0));
}

#[test]
fn only_planets_and_fleets_contain() {
    let (u, a) = Universe::new().spawn(UniverseObject::ship("A"));
    let (u, b) = u.spawn(UniverseObject::ship("B"));
    assert!(u.contain(a, b).is_err());
    assert!(u.contain(a, a).is_err());
}

#[test]
fn objects_of_type_in_id_order() {
    let (u, a) = Universe::new().spawn(UniverseObject::system("A", 0.0, 0.0));
    let (u, _) = u.spawn(UniverseObject::ship("S"));
    let (u, b) = u.spawn(UniverseObject::system("B", 1.0, 0.0));
    assert_eq!(u.objects_of_type(ObjectType::System), vec![a, b]);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn properties_read_as_values() {
    let planet = UniverseObject::planet("Earth", PlanetType::Terran)
        .owned_by(EmpireId::new(2))
        .with_meter(MeterType::Population, 12.5)
        .with_species("SP_HUMAN")
        .created_on(3);

    assert_eq!(planet.property(ObjectProperty::Owner, 10), Value::Int(2));
    assert_eq!(
        planet.property(ObjectProperty::Meter(MeterType::Population), 10),
        Value::Float(12.5)
    );
    assert_eq!(planet.property(ObjectProperty::Species, 10).as_str(), Some("SP_HUMAN"));
    assert_eq!(planet.property(ObjectProperty::Age, 10), Value::Int(7));
    assert_eq!(planet.property(ObjectProperty::SystemId, 10), Value::Int(-1));
}

#[test]
fn moving_fleets_are_not_stationary() {
    let (u, a) = Universe::new().spawn(UniverseObject::system("A", 0.0, 0.0));
    let (u, b) = u.spawn(UniverseObject::system("B", 9.0, 0.0));
    let (u, parked) = u.spawn(UniverseObject::fleet("Parked"));
    let (u, moving) = u.spawn(UniverseObject::fleet("Moving").heading_to(b));
    let u = u.place_in_system(a, parked).unwrap();
    let u = u.place_in_system(a, moving).unwrap();

    assert!(u.get(parked).unwrap().is_stationary());
    assert!(!u.get(moving).unwrap().is_stationary());
}
