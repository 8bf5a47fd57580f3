//! Integration tests for identifiers and domain enumerations

use astrolabe_foundation::{
    Affiliation, ContentType, DiplomaticStatus, EmpireId, MeterType, ObjectId, ObjectType,
    PlanetType, StarType, Visibility,
};

// =============================================================================
// Identifiers
// =============================================================================

#[test]
fn object_ids_order_by_raw_value() {
    let mut ids = vec![ObjectId::new(5), ObjectId::new(-1), ObjectId::new(2)];
    ids.sort();
    assert_eq!(ids, vec![ObjectId::invalid(), ObjectId::new(2), ObjectId::new(5)]);
}

#[test]
fn negative_ids_are_invalid() {
    assert!(!ObjectId::invalid().is_valid());
    assert!(ObjectId::new(0).is_valid());
    assert_eq!(ObjectId::from_raw(-4), None);
    assert_eq!(ObjectId::from_raw(4), Some(ObjectId::new(4)));
    assert_eq!(EmpireId::from_raw(-1), None);
}

#[test]
fn id_formatting() {
    assert_eq!(format!("{}", ObjectId::new(12)), "12");
    assert_eq!(format!("{:?}", ObjectId::new(12)), "ObjectId(12)");
    assert_eq!(format!("{:?}", ObjectId::invalid()), "ObjectId(invalid)");
    assert_eq!(format!("{:?}", EmpireId::new(1)), "EmpireId(1)");
}

// =============================================================================
// Enumerations
// =============================================================================

#[test]
fn names_round_trip_for_every_enum() {
    for &v in PlanetType::ALL {
        assert_eq!(PlanetType::from_name(v.name()), Some(v));
    }
    for &v in StarType::ALL {
        assert_eq!(StarType::from_name(v.name()), Some(v));
    }
    for &v in Visibility::ALL {
        assert_eq!(Visibility::from_name(v.name()), Some(v));
    }
    for &v in Affiliation::ALL {
        assert_eq!(Affiliation::from_name(v.name()), Some(v));
    }
    for &v in ContentType::ALL {
        assert_eq!(ContentType::from_name(v.name()), Some(v));
    }
}

#[test]
fn unknown_names_are_rejected() {
    assert_eq!(ObjectType::from_name("Starbase"), None);
    assert_eq!(MeterType::from_name("industry"), None);
}

#[test]
fn visibility_is_ordered() {
    assert!(Visibility::Invalid < Visibility::Basic);
    assert!(Visibility::Basic < Visibility::Partial);
    assert!(Visibility::Partial < Visibility::Full);
}

#[test]
fn diplomatic_status_names() {
    assert_eq!(DiplomaticStatus::Allied.to_string(), "Allied");
    assert_eq!(ContentType::ShipPart.to_string(), "Part");
}
