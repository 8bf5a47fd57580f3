//! Integration tests for the map-backed registries

use astrolabe_foundation::{DiplomaticStatus, EmpireId, ObjectId};
use astrolabe_universe::{
    EmpireRecord, EmpireRegistry, EmpireTable, SpeciesRecord, SpeciesRegistry, SpeciesTable,
    SupplyRegistry, SupplyTable,
};

const RED: EmpireId = EmpireId::new(1);
const BLUE: EmpireId = EmpireId::new(2);

#[test]
fn empire_records() {
    let empires = EmpireTable::new().with_empire(
        EmpireRecord::new(RED, "Red")
            .with_capital(ObjectId::new(4))
            .with_tech("SHP_ZORTRIUM_PLATE")
            .with_policy("PLC_CENTRALIZATION")
            .with_explored(ObjectId::new(0))
            .with_meter("METER_DETECTION_STRENGTH", 30.0)
            .with_stockpile("INDUSTRY", 12.0),
    );

    assert!(empires.exists(RED));
    assert!(!empires.exists(BLUE));
    assert_eq!(empires.capital(RED), Some(ObjectId::new(4)));
    assert!(empires.has_tech(RED, "SHP_ZORTRIUM_PLATE"));
    assert!(!empires.has_tech(BLUE, "SHP_ZORTRIUM_PLATE"));
    assert!(empires.has_adopted_policy(RED, "PLC_CENTRALIZATION"));
    assert!(empires.has_explored(RED, ObjectId::new(0)));
    assert_eq!(empires.meter(RED, "METER_DETECTION_STRENGTH"), Some(30.0));
    assert_eq!(empires.stockpile(RED, "INFLUENCE"), None);
}

#[test]
fn diplomacy_is_symmetric_and_defaults_to_war() {
    let empires = EmpireTable::new()
        .with_empire(EmpireRecord::new(RED, "Red"))
        .with_empire(EmpireRecord::new(BLUE, "Blue"));
    assert_eq!(empires.diplomatic_status(RED, BLUE), DiplomaticStatus::War);

    let empires = empires.with_status(BLUE, RED, DiplomaticStatus::Allied);
    assert_eq!(empires.diplomatic_status(RED, BLUE), DiplomaticStatus::Allied);
    assert_eq!(empires.diplomatic_status(BLUE, RED), DiplomaticStatus::Allied);
}

#[test]
fn species_records() {
    let species = SpeciesTable::new().with_species(
        SpeciesRecord::new("SP_HUMAN")
            .with_homeworld(ObjectId::new(3))
            .colonizing(true)
            .with_tag("AVERAGE_INDUSTRY"),
    );
    assert!(species.exists("SP_HUMAN"));
    assert_eq!(species.homeworlds("SP_HUMAN"), &[ObjectId::new(3)]);
    assert!(species.homeworlds("SP_LAEN").is_empty());
    assert!(species.can_colonize("SP_HUMAN"));
    assert!(species.has_tag("SP_HUMAN", "AVERAGE_INDUSTRY"));
}

#[test]
fn supply_tables() {
    let supply = SupplyTable::new()
        .with_fleet_supply(RED, [ObjectId::new(0), ObjectId::new(1)])
        .with_resource_group(RED, [ObjectId::new(0)])
        .with_resource_group(RED, [ObjectId::new(5), ObjectId::new(6)]);

    assert_eq!(supply.fleet_supplyable_systems(RED).map(|s| s.len()), Some(2));
    assert!(supply.fleet_supplyable_systems(BLUE).is_none());
    assert_eq!(supply.resource_supply_groups(RED).len(), 2);
    assert!(supply.resource_supply_groups(BLUE).is_empty());
}
