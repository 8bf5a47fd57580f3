//! Integration tests for value references inside conditions

use astrolabe_condition::{
    ComparisonType, Condition, OpType, ScriptingContext, StatisticType, ValueRef, seeded_rng,
};
use astrolabe_foundation::{MeterType, ObjectId, ObjectType, PlanetType};
use astrolabe_universe::{ObjectProperty, Universe, UniverseObject};

const INDUSTRY: ObjectProperty = ObjectProperty::Meter(MeterType::Industry);

/// Three planets in a row at x = 0, 10, 20 with industry 1, 2 and 3.
fn row() -> (Universe, Vec<ObjectId>) {
    let mut u = Universe::new();
    let mut ids = Vec::new();
    for i in 0..3_u8 {
        let x = f64::from(i) * 10.0;
        let (next, system) = u.spawn(UniverseObject::system(format!("S{i}"), x, 0.0));
        let (next, planet) = next.spawn(
            UniverseObject::planet(format!("P{i}"), PlanetType::Inferno)
                .with_meter(MeterType::Industry, f64::from(i) + 1.0),
        );
        u = next.place_in_system(system, planet).unwrap();
        ids.push(planet);
    }
    (u, ids)
}

#[test]
fn bounds_relative_to_source() {
    let (u, ids) = row();
    let rng = seeded_rng(0);
    let ctx = ScriptingContext::new(&u, &rng).with_source(ids[0]);

    // Planets with more industry than the source.
    let richer = Condition::meter_value(
        MeterType::Industry,
        Some(ValueRef::operation(
            OpType::Plus,
            vec![ValueRef::source(INDUSTRY), 0.5.into()],
        )),
        None,
    );
    assert_eq!(richer.matching(&ctx), vec![ids[1], ids[2]]);
    assert!(!richer.source_invariant());
    assert!(richer.local_candidate_invariant());
}

#[test]
fn missing_source_matches_nothing() {
    let (u, _) = row();
    let rng = seeded_rng(0);
    let ctx = ScriptingContext::new(&u, &rng);
    let near_source = Condition::within_distance(15.0, Condition::source());
    assert!(near_source.matching(&ctx).is_empty());
}

#[test]
fn distance_to_source() {
    let (u, ids) = row();
    let rng = seeded_rng(0);
    let ctx = ScriptingContext::new(&u, &rng).with_source(ids[0]);
    let near_source = Condition::and(vec![
        Condition::object_type(ObjectType::Planet),
        Condition::within_distance(15.0, Condition::source()),
    ]);
    assert_eq!(near_source.matching(&ctx), vec![ids[0], ids[1]]);
}

#[test]
fn statistics_feed_value_tests() {
    let (u, ids) = row();
    let rng = seeded_rng(0);
    let ctx = ScriptingContext::new(&u, &rng);
    let planets = Condition::object_type(ObjectType::Planet);

    let total = ValueRef::<f64>::statistic(StatisticType::Sum, Some(INDUSTRY), planets.clone());
    assert!((total.eval(&ctx).unwrap() - 6.0).abs() < f64::EPSILON);

    let count = ValueRef::<f64>::statistic(StatisticType::Count, None, planets.clone());
    let three_planets = Condition::value_test(count, ComparisonType::Equal, 3.0);
    assert_eq!(three_planets.partition(&ctx, &ids).0, ids);

    // Candidates whose industry is above the mean.
    let mean = ValueRef::<f64>::statistic(StatisticType::Mean, Some(INDUSTRY), planets);
    let above_mean = Condition::value_test(ValueRef::<f64>::local(INDUSTRY), ComparisonType::Greater, mean);
    assert_eq!(above_mean.partition(&ctx, &ids).0, vec![ids[2]]);
}

#[test]
fn chained_comparison() {
    let (u, ids) = row();
    let rng = seeded_rng(0);
    let ctx = ScriptingContext::new(&u, &rng);
    let middle = Condition::value_test_chained(
        1.5,
        ComparisonType::Less,
        ValueRef::<f64>::local(INDUSTRY),
        ComparisonType::Less,
        2.5,
    );
    assert_eq!(middle.partition(&ctx, &ids).0, vec![ids[1]]);
}

#[test]
fn turn_bounds_follow_context() {
    let (u, ids) = row();
    let rng = seeded_rng(0);
    let early = Condition::turn(None, Some(5.into()));

    let ctx = ScriptingContext::new(&u, &rng).with_turn(3);
    assert_eq!(early.partition(&ctx, &ids).0.len(), 3);
    let ctx = ctx.with_turn(6);
    assert!(early.partition(&ctx, &ids).0.is_empty());
}

#[test]
fn division_by_zero_fails_closed() {
    let (u, ids) = row();
    let rng = seeded_rng(0);
    let ctx = ScriptingContext::new(&u, &rng);
    let broken = Condition::meter_value(
        MeterType::Industry,
        Some(ValueRef::operation(OpType::Divide, vec![1.0.into(), 0.0.into()])),
        None,
    );
    assert!(broken.partition(&ctx, &ids).0.is_empty());
}
