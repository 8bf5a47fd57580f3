//! Integration tests for conditions that consult the registries

use astrolabe_condition::{Condition, ScriptingContext, seeded_rng};
use astrolabe_foundation::{
    Affiliation, DiplomaticStatus, EmpireId, ObjectId, PlanetType, Visibility,
};
use astrolabe_universe::{
    EmpireRecord, EmpireTable, SpeciesRecord, SpeciesTable, SupplyTable, Universe, UniverseObject,
};

const RED: EmpireId = EmpireId::new(1);
const BLUE: EmpireId = EmpireId::new(2);
const GREEN: EmpireId = EmpireId::new(3);

struct Galaxy {
    universe: Universe,
    empires: EmpireTable,
    species: SpeciesTable,
    supply: SupplyTable,
    home: ObjectId,
    frontier: ObjectId,
    red_capital: ObjectId,
    blue_colony: ObjectId,
    green_outpost: ObjectId,
    wild: ObjectId,
}

/// Two linked systems; Red's capital and Blue's colony at home, Green's
/// outpost and an unowned planet at the frontier. Red and Green are allied.
fn galaxy() -> Galaxy {
    let (u, home) = Universe::new().spawn(UniverseObject::system("Home", 0.0, 0.0));
    let (u, frontier) = u.spawn(UniverseObject::system("Frontier", 40.0, 0.0));
    let (u, red_capital) = u.spawn(
        UniverseObject::planet("Capital", PlanetType::Terran)
            .owned_by(RED)
            .with_species("SP_HUMAN"),
    );
    let (u, blue_colony) = u.spawn(
        UniverseObject::planet("Colony", PlanetType::Ocean)
            .owned_by(BLUE)
            .with_species("SP_LAEN"),
    );
    let (u, green_outpost) =
        u.spawn(UniverseObject::planet("Outpost", PlanetType::Barren).owned_by(GREEN));
    let (u, wild) = u.spawn(UniverseObject::planet("Wild", PlanetType::Swamp));
    let u = u.add_starlane(home, frontier).unwrap();
    let u = u.place_in_system(home, red_capital).unwrap();
    let u = u.place_in_system(home, blue_colony).unwrap();
    let u = u.place_in_system(frontier, green_outpost).unwrap();
    let u = u.place_in_system(frontier, wild).unwrap();
    let u = u.set_visibility(RED, wild, Visibility::Partial);

    let empires = EmpireTable::new()
        .with_empire(EmpireRecord::new(RED, "Red").with_capital(red_capital))
        .with_empire(EmpireRecord::new(BLUE, "Blue"))
        .with_empire(EmpireRecord::new(GREEN, "Green"))
        .with_status(RED, GREEN, DiplomaticStatus::Allied);
    let species = SpeciesTable::new()
        .with_species(SpeciesRecord::new("SP_HUMAN").with_homeworld(red_capital))
        .with_species(SpeciesRecord::new("SP_LAEN").colonizing(false));
    let supply = SupplyTable::new().with_fleet_supply(RED, [home]);

    Galaxy {
        universe: u,
        empires,
        species,
        supply,
        home,
        frontier,
        red_capital,
        blue_colony,
        green_outpost,
        wild,
    }
}

macro_rules! context {
    ($g:expr, $rng:expr) => {
        ScriptingContext::new(&$g.universe, &$rng)
            .with_empires(&$g.empires)
            .with_species(&$g.species)
            .with_supply(&$g.supply)
    };
}

#[test]
fn affiliations_follow_diplomacy() {
    let g = galaxy();
    let rng = seeded_rng(0);
    let ctx = context!(g, rng);
    let red = Some(RED.raw().into());

    let enemies = Condition::empire_affiliation(red.clone(), Affiliation::EnemyOf);
    assert_eq!(enemies.matching(&ctx), vec![g.blue_colony]);

    let allies = Condition::empire_affiliation(red, Affiliation::AllyOf);
    assert_eq!(allies.matching(&ctx), vec![g.green_outpost]);

    let unowned = Condition::empire_affiliation(None, Affiliation::Unowned);
    let planets = [g.red_capital, g.blue_colony, g.green_outpost, g.wild];
    assert_eq!(unowned.partition(&ctx, &planets).0, vec![g.wild]);

    let owned = Condition::owned_by(RED.raw());
    assert_eq!(owned.matching(&ctx), vec![g.red_capital]);
}

#[test]
fn unknown_empire_owns_nothing() {
    let g = galaxy();
    let rng = seeded_rng(0);
    let ctx = context!(g, rng);
    let enemies_of_nobody = Condition::empire_affiliation(Some(99.into()), Affiliation::EnemyOf);
    assert!(enemies_of_nobody.matching(&ctx).is_empty());
}

#[test]
fn capitals_and_homeworlds() {
    let g = galaxy();
    let rng = seeded_rng(0);
    let ctx = context!(g, rng);

    assert_eq!(Condition::capital(None).matching(&ctx), vec![g.red_capital]);
    assert!(Condition::capital(Some(BLUE.raw().into())).matching(&ctx).is_empty());
    let human_homeworld = Condition::homeworld(vec!["SP_HUMAN".into()]);
    assert_eq!(human_homeworld.matching(&ctx), vec![g.red_capital]);
}

#[test]
fn supply_and_visibility() {
    let g = galaxy();
    let rng = seeded_rng(0);
    let ctx = context!(g, rng);

    let supplied = Condition::fleet_supplyable_by_empire(RED.raw());
    let everything = g.universe.object_ids();
    let (matches, _) = supplied.partition(&ctx, &everything);
    assert!(matches.contains(&g.home));
    assert!(matches.contains(&g.red_capital));
    assert!(!matches.contains(&g.frontier));

    // No supply entry for Blue.
    assert!(Condition::fleet_supplyable_by_empire(BLUE.raw()).matching(&ctx).is_empty());

    let seen = Condition::visible_to_empire(RED.raw());
    assert_eq!(seen.matching(&ctx), vec![g.wild]);
}

#[test]
fn colonizing_species() {
    let g = galaxy();
    let rng = seeded_rng(0);
    let ctx = context!(g, rng);
    let planets = [g.red_capital, g.blue_colony, g.green_outpost];
    // SP_LAEN cannot colonize; the outpost has no species.
    assert_eq!(Condition::can_colonize().partition(&ctx, &planets).0, vec![g.red_capital]);
}

#[test]
fn registries_default_to_empty() {
    let g = galaxy();
    let rng = seeded_rng(0);
    let bare = ScriptingContext::new(&g.universe, &rng);
    assert!(Condition::capital(None).matching(&bare).is_empty());
    assert!(Condition::homeworld(Vec::new()).matching(&bare).is_empty());
}
