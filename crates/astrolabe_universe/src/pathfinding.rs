//! Starlane jump distances.
//!
//! Conditions never walk the starlane graph themselves; they ask a
//! [`Pathfinder`]. [`LanePathfinder`] answers with breadth-first search over
//! the universe's starlanes.

use std::collections::{BTreeSet, HashMap, VecDeque};

use astrolabe_foundation::{ObjectId, ObjectType};

use crate::universe::Universe;

/// Jump-distance queries over the starlane graph.
pub trait Pathfinder {
    /// Fewest starlane jumps between the systems of two objects.
    ///
    /// Returns `None` if either object is outside a system or the systems are
    /// not connected.
    fn jump_distance(&self, universe: &Universe, from: ObjectId, to: ObjectId) -> Option<u32>;

    /// Systems reachable within `jumps` jumps of any origin object's system.
    ///
    /// Origins' own systems are included at distance zero.
    fn systems_within_jumps(
        &self,
        universe: &Universe,
        jumps: u32,
        origins: &[ObjectId],
    ) -> BTreeSet<ObjectId>;
}

/// Breadth-first [`Pathfinder`] over the starlanes stored in the universe.
#[derive(Clone, Copy, Debug, Default)]
pub struct LanePathfinder;

impl LanePathfinder {
    /// The system an object counts as being in: itself for systems.
    #[must_use]
    pub fn system_of(universe: &Universe, object: ObjectId) -> Option<ObjectId> {
        let obj = universe.get(object)?;
        if obj.object_type == ObjectType::System {
            Some(obj.id)
        } else {
            obj.system_id
        }
    }

    /// Distances from the seed systems, stopping after `limit` jumps.
    fn bfs(
        universe: &Universe,
        seeds: impl IntoIterator<Item = ObjectId>,
        limit: Option<u32>,
        goal: Option<ObjectId>,
    ) -> HashMap<ObjectId, u32> {
        let mut distance: HashMap<ObjectId, u32> = HashMap::new();
        let mut queue = VecDeque::new();

        for seed in seeds {
            if distance.insert(seed, 0).is_none() {
                queue.push_back(seed);
            }
        }

        while let Some(current) = queue.pop_front() {
            if Some(current) == goal {
                break;
            }
            let d = distance[&current];
            if limit.is_some_and(|limit| d >= limit) {
                continue;
            }
            let Some(system) = universe.get(current) else {
                continue;
            };
            for &next in &system.starlanes {
                if !distance.contains_key(&next) {
                    distance.insert(next, d + 1);
                    queue.push_back(next);
                }
            }
        }

        distance
    }
}

impl Pathfinder for LanePathfinder {
    fn jump_distance(&self, universe: &Universe, from: ObjectId, to: ObjectId) -> Option<u32> {
        let start = Self::system_of(universe, from)?;
        let goal = Self::system_of(universe, to)?;
        Self::bfs(universe, [start], None, Some(goal))
            .get(&goal)
            .copied()
    }

    fn systems_within_jumps(
        &self,
        universe: &Universe,
        jumps: u32,
        origins: &[ObjectId],
    ) -> BTreeSet<ObjectId> {
        let seeds = origins
            .iter()
            .filter_map(|&origin| Self::system_of(universe, origin));
        Self::bfs(universe, seeds, Some(jumps), None)
            .into_keys()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::UniverseObject;

    /// Four systems in a line: a - b - c - d, plus an isolated e.
    fn line() -> (Universe, Vec<ObjectId>) {
        let mut universe = Universe::new();
        let mut ids = Vec::new();
        for (i, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            let (u, id) = universe.spawn(UniverseObject::system(*name, f64::from(i as u8), 0.0));
            universe = u;
            ids.push(id);
        }
        for pair in ids[..4].windows(2) {
            universe = universe.add_starlane(pair[0], pair[1]).unwrap();
        }
        (universe, ids)
    }

    #[test]
    fn jump_distance_counts_lanes() {
        let (u, ids) = line();
        let pf = LanePathfinder;
        assert_eq!(pf.jump_distance(&u, ids[0], ids[0]), Some(0));
        assert_eq!(pf.jump_distance(&u, ids[0], ids[3]), Some(3));
        assert_eq!(pf.jump_distance(&u, ids[3], ids[1]), Some(2));
        assert_eq!(pf.jump_distance(&u, ids[0], ids[4]), None);
    }

    #[test]
    fn objects_use_their_system() {
        let (u, ids) = line();
        let (u, ship) = u.spawn(UniverseObject::ship("s"));
        let u = u.place_in_system(ids[2], ship).unwrap();
        assert_eq!(LanePathfinder.jump_distance(&u, ship, ids[0]), Some(2));
    }

    #[test]
    fn within_jumps_from_multiple_origins() {
        let (u, ids) = line();
        let reached = LanePathfinder.systems_within_jumps(&u, 1, &[ids[0], ids[3]]);
        let expected: BTreeSet<_> = [ids[0], ids[1], ids[2], ids[3]].into_iter().collect();
        assert_eq!(reached, expected);

        let zero = LanePathfinder.systems_within_jumps(&u, 0, &[ids[1]]);
        assert_eq!(zero.len(), 1);
        assert!(zero.contains(&ids[1]));
    }

    #[test]
    fn unplaced_origins_reach_nothing() {
        let (u, _) = line();
        let (u, ship) = u.spawn(UniverseObject::ship("lost"));
        assert!(LanePathfinder.systems_within_jumps(&u, 5, &[ship]).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::object::UniverseObject;
    use proptest::prelude::*;

    fn chain(len: usize) -> (Universe, Vec<ObjectId>) {
        let mut universe = Universe::new();
        let mut ids = Vec::new();
        for i in 0..len {
            let (u, id) = universe.spawn(UniverseObject::system(format!("S{i}"), i as f64, 0.0));
            universe = u;
            ids.push(id);
        }
        for pair in ids.windows(2) {
            universe = universe.add_starlane(pair[0], pair[1]).unwrap();
        }
        (universe, ids)
    }

    proptest! {
        #[test]
        fn chain_distance_is_index_gap(len in 1_usize..12, a in 0_usize..12, b in 0_usize..12) {
            let (u, ids) = chain(len);
            let (a, b) = (a % len, b % len);
            let expected = u32::try_from(a.abs_diff(b)).unwrap();
            prop_assert_eq!(LanePathfinder.jump_distance(&u, ids[a], ids[b]), Some(expected));
            prop_assert_eq!(LanePathfinder.jump_distance(&u, ids[b], ids[a]), Some(expected));
        }

        #[test]
        fn reach_from_chain_end(len in 1_usize..12, jumps in 0_u32..15) {
            let (u, ids) = chain(len);
            let reached = LanePathfinder.systems_within_jumps(&u, jumps, &[ids[0]]);
            prop_assert_eq!(reached.len(), len.min(jumps as usize + 1));
        }
    }
}
