//! Integration tests for descriptions, dumps and checksums

use std::collections::HashMap;

use astrolabe_condition::{Condition, StringTable, ValueRef};
use astrolabe_foundation::{MeterType, ObjectType};
use astrolabe_universe::ObjectProperty;

/// A string table with a handful of French entries.
struct French(HashMap<&'static str, &'static str>);

impl French {
    fn new() -> Self {
        Self(HashMap::from([
            ("DESC_TYPE", "objets de type %1%"),
            ("DESC_TYPE_NOT", "objets qui ne sont pas de type %1%"),
            ("DESC_AND", "tous : %1%"),
        ]))
    }
}

impl StringTable for French {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.0.get(key).copied()
    }
}

fn sample() -> Condition {
    Condition::and(vec![
        Condition::object_type(ObjectType::Planet),
        Condition::meter_value(MeterType::Industry, Some(2.5.into()), None),
        Condition::contains(Condition::object_type(ObjectType::Building)),
    ])
}

#[test]
fn english_descriptions() {
    let condition = Condition::object_type(ObjectType::Ship);
    assert_eq!(condition.description(false), "objects of type Ship");
    assert_eq!(condition.description(true), "objects not of type Ship");
    assert_eq!(
        Condition::not(condition).description(false),
        "objects not of type Ship"
    );
}

#[test]
fn custom_string_table() {
    let strings = French::new();
    let condition = Condition::object_type(ObjectType::Planet);
    assert_eq!(condition.description_with(&strings, false), "objets de type Planet");
    assert_eq!(
        condition.description_with(&strings, true),
        "objets qui ne sont pas de type Planet"
    );

    let both = Condition::and(vec![condition.clone(), condition]);
    assert_eq!(
        both.description_with(&strings, false),
        "tous : (objets de type Planet) (objets de type Planet)"
    );
}

#[test]
fn missing_translations_show_the_key() {
    let strings = French::new();
    assert_eq!(Condition::monster().description_with(&strings, false), "DESC_MONSTER");
}

#[test]
fn missing_bounds_read_as_any() {
    let condition = Condition::meter_value(MeterType::Industry, Some(2.5.into()), None);
    assert_eq!(
        condition.description(false),
        "objects with Industry between 2.5 and any"
    );
}

#[test]
fn nested_dump() {
    assert_eq!(
        sample().dump(0),
        "And [\n    Type type = Planet\n    MeterValue meter = Industry low = 2.5\n    Contains condition =\n        Type type = Building\n]\n"
    );
}

#[test]
fn dump_indents_whole_tree() {
    let indented = sample().dump(2);
    for line in indented.lines() {
        assert!(line.starts_with("        "), "{line:?}");
    }
}

#[test]
fn value_refs_in_dumps() {
    let condition = Condition::meter_value(
        MeterType::Population,
        Some(ValueRef::source(ObjectProperty::Meter(MeterType::Population))),
        None,
    );
    assert_eq!(
        condition.dump(0),
        "MeterValue meter = Population low = Source.Population\n"
    );
}

#[test]
fn checksums_track_structure() {
    let a = sample();
    assert_eq!(a.checksum(), a.clone().checksum());

    let other_bound = Condition::and(vec![
        Condition::object_type(ObjectType::Planet),
        Condition::meter_value(MeterType::Industry, Some(3.0.into()), None),
        Condition::contains(Condition::object_type(ObjectType::Building)),
    ]);
    assert_ne!(a.checksum(), other_bound.checksum());

    let swapped = Condition::or(vec![
        Condition::object_type(ObjectType::Planet),
        Condition::object_type(ObjectType::Ship),
    ]);
    let reordered = Condition::or(vec![
        Condition::object_type(ObjectType::Ship),
        Condition::object_type(ObjectType::Planet),
    ]);
    assert_ne!(swapped.checksum(), reordered.checksum());
    assert_ne!(
        Condition::all().checksum(),
        Condition::none().checksum()
    );
}

#[test]
fn equality_is_structural() {
    assert_eq!(sample(), sample());
    assert_ne!(sample(), Condition::all());
}
