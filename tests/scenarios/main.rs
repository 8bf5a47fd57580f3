//! End-to-end scenarios
//!
//! Small galaxies evaluated through the public API only.

use std::collections::BTreeSet;

use astrolabe_condition::{Condition, EvaluationConfig, ScriptingContext, seeded_rng, seeded_rng_from};
use astrolabe_foundation::{ObjectId, ObjectType};
use astrolabe_universe::{Universe, UniverseObject};
use proptest::prelude::*;

fn spawn_all(objects: impl IntoIterator<Item = UniverseObject>) -> (Universe, Vec<ObjectId>) {
    let mut universe = Universe::new();
    let mut ids = Vec::new();
    for object in objects {
        let (next, id) = universe.spawn(object);
        universe = next;
        ids.push(id);
    }
    (universe, ids)
}

#[test]
fn creation_turn_range_is_inclusive() {
    let (u, ids) =
        spawn_all((1..=5).map(|turn| UniverseObject::ship(format!("S{turn}")).created_on(turn)));
    let rng = seeded_rng(0);
    let ctx = ScriptingContext::new(&u, &rng);

    let condition = Condition::created_on_turn(Some(2.into()), Some(4.into()));
    let (matches, non_matches) = condition.partition(&ctx, &ids);
    assert_eq!(matches, ids[1..4].to_vec());
    assert_eq!(non_matches, vec![ids[0], ids[4]]);
}

#[test]
fn random_selection_takes_exactly_n_of_the_qualifying() {
    let (u, ids) = spawn_all((0..10).map(|i| {
        let ship = UniverseObject::ship(format!("S{i}"));
        if i % 3 == 0 { ship.armed() } else { ship }
    }));
    let armed: BTreeSet<ObjectId> = [ids[0], ids[3], ids[6], ids[9]].into_iter().collect();

    for seed in 0..20 {
        let rng = seeded_rng(seed);
        let ctx = ScriptingContext::new(&u, &rng);
        let condition = Condition::number_of(2, Condition::armed());
        let (matches, non_matches) = condition.partition(&ctx, &ids);

        assert_eq!(matches.len(), 2, "seed {seed}");
        assert_eq!(non_matches.len(), 8, "seed {seed}");
        assert!(matches.iter().all(|id| armed.contains(id)), "seed {seed}");
    }
}

#[test]
fn and_of_all_and_none_matches_nothing() {
    let (u, ids) = spawn_all((0..4).map(|i| UniverseObject::ship(format!("S{i}"))));
    let rng = seeded_rng(0);
    let ctx = ScriptingContext::new(&u, &rng);

    let condition = Condition::and(vec![Condition::all(), Condition::none()]);
    let (matches, non_matches) = condition.partition(&ctx, &ids);
    assert!(matches.is_empty());
    assert_eq!(non_matches, ids);
}

#[test]
fn or_unites_its_operands() {
    let (u, ids) = spawn_all(["x", "y", "z"].map(|name| UniverseObject::ship(name)));
    let (x, y) = (ids[0], ids[1]);
    let rng = seeded_rng(0);
    let ctx = ScriptingContext::new(&u, &rng);

    let condition = Condition::or(vec![
        Condition::object_id(x.raw()),
        Condition::object_id(y.raw()),
    ]);
    let (matches, non_matches) = condition.partition(&ctx, &ids);
    assert_eq!(matches, vec![x, y]);
    assert_eq!(non_matches, vec![ids[2]]);
}

#[test]
fn new_lane_crossing_existing_lane() {
    let (u, ids) = spawn_all([
        UniverseObject::system("West", 0.0, 0.0),
        UniverseObject::system("East", 2.0, 0.0),
        UniverseObject::system("North", 1.0, 1.0),
        UniverseObject::system("South", 1.0, -1.0),
    ]);
    let u = u.add_starlane(ids[0], ids[1]).unwrap();
    let rng = seeded_rng(0);
    let ctx = ScriptingContext::new(&u, &rng);

    let crossing = Condition::starlane_would_cross(Condition::object_id(ids[3].raw()));
    assert!(crossing.eval_one(&ctx, ids[2]));
    assert_eq!(crossing.matching(&ctx), vec![ids[2]]);

    let addable = Condition::can_add_starlane_to(Condition::object_id(ids[3].raw()));
    assert!(!addable.eval_one(&ctx, ids[2]));
    assert_eq!(
        Condition::and(vec![
            Condition::object_type(ObjectType::System),
            Condition::not(crossing),
        ])
        .matching(&ctx),
        vec![ids[0], ids[1], ids[3]]
    );
}

proptest! {
    #[test]
    fn random_selection_is_reproducible(seed in any::<u64>(), n in 0_i32..12) {
        let (u, ids) = spawn_all((0..10).map(|i| UniverseObject::ship(format!("S{i}"))));
        let condition = Condition::number_of(n, Condition::all());

        let first_rng = seeded_rng(seed);
        let first = condition.partition(&ScriptingContext::new(&u, &first_rng), &ids);
        let config = EvaluationConfig::default().with_seed(seed);
        let second_rng = seeded_rng_from(&config);
        let second_ctx = ScriptingContext::new(&u, &second_rng).with_config(&config);
        let second = condition.partition(&second_ctx, &ids);

        prop_assert_eq!(first.0.len(), usize::try_from(n.min(10)).unwrap());
        prop_assert_eq!(first, second);
    }
}
