//! Integration tests for starlane pathfinding

use std::collections::BTreeSet;

use astrolabe_foundation::{ObjectId, PlanetType};
use astrolabe_universe::{LanePathfinder, Pathfinder, Universe, UniverseObject};

/// A ring of six systems.
fn ring() -> (Universe, Vec<ObjectId>) {
    let mut u = Universe::new();
    let mut ids = Vec::new();
    for i in 0..6_u8 {
        let angle = f64::from(i) * std::f64::consts::PI / 3.0;
        let (next, id) = u.spawn(UniverseObject::system(
            format!("R{i}"),
            angle.cos() * 100.0,
            angle.sin() * 100.0,
        ));
        u = next;
        ids.push(id);
    }
    for i in 0..6 {
        u = u.add_starlane(ids[i], ids[(i + 1) % 6]).unwrap();
    }
    (u, ids)
}

#[test]
fn shortest_way_around_the_ring() {
    let (u, ids) = ring();
    assert_eq!(LanePathfinder.jump_distance(&u, ids[0], ids[3]), Some(3));
    assert_eq!(LanePathfinder.jump_distance(&u, ids[0], ids[5]), Some(1));
    assert_eq!(LanePathfinder.jump_distance(&u, ids[1], ids[5]), Some(2));
}

#[test]
fn planets_measure_from_their_system() {
    let (u, ids) = ring();
    let (u, planet) = u.spawn(UniverseObject::planet("P", PlanetType::Ocean));
    let u = u.place_in_system(ids[2], planet).unwrap();
    assert_eq!(LanePathfinder.jump_distance(&u, planet, ids[0]), Some(2));
}

#[test]
fn reach_grows_with_jumps() {
    let (u, ids) = ring();
    let one: BTreeSet<_> = [ids[5], ids[0], ids[1]].into_iter().collect();
    assert_eq!(LanePathfinder.systems_within_jumps(&u, 1, &[ids[0]]), one);
    assert_eq!(LanePathfinder.systems_within_jumps(&u, 3, &[ids[0]]).len(), 6);
}
