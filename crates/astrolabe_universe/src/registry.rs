//! Read-only registries conditions consult besides the object graph.
//!
//! Empire, species and supply bookkeeping live outside the engine. The traits
//! here are the lookups the engine needs; the table types are simple
//! map-backed implementations for embedding and tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use astrolabe_foundation::{DiplomaticStatus, EmpireId, ObjectId};

// =============================================================================
// Empires
// =============================================================================

/// Read-only view of empire state.
pub trait EmpireRegistry {
    /// Returns true if the empire exists.
    fn exists(&self, empire: EmpireId) -> bool;

    /// The empire's capital, if it has one.
    fn capital(&self, empire: EmpireId) -> Option<ObjectId>;

    /// Diplomatic status between two distinct empires.
    fn diplomatic_status(&self, a: EmpireId, b: EmpireId) -> DiplomaticStatus;

    /// Whether the empire has researched the tech.
    fn has_tech(&self, empire: EmpireId, tech: &str) -> bool;

    /// Whether the empire has adopted the policy.
    fn has_adopted_policy(&self, empire: EmpireId, policy: &str) -> bool;

    /// Whether the empire has explored the system.
    fn has_explored(&self, empire: EmpireId, system: ObjectId) -> bool;

    /// A named empire-level meter.
    fn meter(&self, empire: EmpireId, name: &str) -> Option<f64>;

    /// Stockpiled amount of a resource.
    fn stockpile(&self, empire: EmpireId, resource: &str) -> Option<f64>;
}

/// Everything the registry knows about one empire.
#[derive(Clone, Debug, Default)]
pub struct EmpireRecord {
    /// Empire id.
    pub id: Option<EmpireId>,
    /// Display name.
    pub name: String,
    /// Capital planet.
    pub capital: Option<ObjectId>,
    /// Researched techs.
    pub techs: BTreeSet<String>,
    /// Adopted policies.
    pub policies: BTreeSet<String>,
    /// Explored systems.
    pub explored: BTreeSet<ObjectId>,
    /// Empire meters by name.
    pub meters: BTreeMap<String, f64>,
    /// Resource stockpiles by name.
    pub stockpiles: BTreeMap<String, f64>,
}

impl EmpireRecord {
    /// Creates a record for the given empire.
    #[must_use]
    pub fn new(id: EmpireId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the capital.
    #[must_use]
    pub fn with_capital(mut self, capital: ObjectId) -> Self {
        self.capital = Some(capital);
        self
    }

    /// Adds a researched tech.
    #[must_use]
    pub fn with_tech(mut self, tech: impl Into<String>) -> Self {
        self.techs.insert(tech.into());
        self
    }

    /// Adds an adopted policy.
    #[must_use]
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policies.insert(policy.into());
        self
    }

    /// Marks a system explored.
    #[must_use]
    pub fn with_explored(mut self, system: ObjectId) -> Self {
        self.explored.insert(system);
        self
    }

    /// Sets an empire meter.
    #[must_use]
    pub fn with_meter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.meters.insert(name.into(), value);
        self
    }

    /// Sets a stockpile amount.
    #[must_use]
    pub fn with_stockpile(mut self, resource: impl Into<String>, amount: f64) -> Self {
        self.stockpiles.insert(resource.into(), amount);
        self
    }
}

/// Map-backed [`EmpireRegistry`].
///
/// Pairs without a recorded status are at war.
#[derive(Clone, Debug, Default)]
pub struct EmpireTable {
    empires: HashMap<EmpireId, EmpireRecord>,
    diplomacy: HashMap<(EmpireId, EmpireId), DiplomaticStatus>,
}

impl EmpireTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empire.
    ///
    /// Records without an id are ignored.
    #[must_use]
    pub fn with_empire(mut self, record: EmpireRecord) -> Self {
        if let Some(id) = record.id {
            self.empires.insert(id, record);
        }
        self
    }

    /// Records the status between two empires, in both directions.
    #[must_use]
    pub fn with_status(mut self, a: EmpireId, b: EmpireId, status: DiplomaticStatus) -> Self {
        self.diplomacy.insert(Self::pair(a, b), status);
        self
    }

    /// Looks up a record.
    #[must_use]
    pub fn record(&self, empire: EmpireId) -> Option<&EmpireRecord> {
        self.empires.get(&empire)
    }

    fn pair(a: EmpireId, b: EmpireId) -> (EmpireId, EmpireId) {
        if a <= b { (a, b) } else { (b, a) }
    }
}

impl EmpireRegistry for EmpireTable {
    fn exists(&self, empire: EmpireId) -> bool {
        self.empires.contains_key(&empire)
    }

    fn capital(&self, empire: EmpireId) -> Option<ObjectId> {
        self.record(empire).and_then(|r| r.capital)
    }

    fn diplomatic_status(&self, a: EmpireId, b: EmpireId) -> DiplomaticStatus {
        self.diplomacy
            .get(&Self::pair(a, b))
            .copied()
            .unwrap_or(DiplomaticStatus::War)
    }

    fn has_tech(&self, empire: EmpireId, tech: &str) -> bool {
        self.record(empire).is_some_and(|r| r.techs.contains(tech))
    }

    fn has_adopted_policy(&self, empire: EmpireId, policy: &str) -> bool {
        self.record(empire).is_some_and(|r| r.policies.contains(policy))
    }

    fn has_explored(&self, empire: EmpireId, system: ObjectId) -> bool {
        self.record(empire).is_some_and(|r| r.explored.contains(&system))
    }

    fn meter(&self, empire: EmpireId, name: &str) -> Option<f64> {
        self.record(empire).and_then(|r| r.meters.get(name).copied())
    }

    fn stockpile(&self, empire: EmpireId, resource: &str) -> Option<f64> {
        self.record(empire)
            .and_then(|r| r.stockpiles.get(resource).copied())
    }
}

// =============================================================================
// Species
// =============================================================================

/// Read-only view of species definitions.
pub trait SpeciesRegistry {
    /// Returns true if the species exists.
    fn exists(&self, species: &str) -> bool;

    /// Planets that are homeworlds of the species.
    fn homeworlds(&self, species: &str) -> &[ObjectId];

    /// Whether the species can colonize.
    fn can_colonize(&self, species: &str) -> bool;

    /// Whether the species definition carries the tag.
    fn has_tag(&self, species: &str, tag: &str) -> bool;
}

/// Everything the registry knows about one species.
#[derive(Clone, Debug, Default)]
pub struct SpeciesRecord {
    /// Species name.
    pub name: String,
    /// Homeworld planets.
    pub homeworlds: Vec<ObjectId>,
    /// Whether the species can colonize.
    pub can_colonize: bool,
    /// Species tags.
    pub tags: BTreeSet<String>,
}

impl SpeciesRecord {
    /// Creates a record that can colonize and has no homeworlds.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            homeworlds: Vec::new(),
            can_colonize: true,
            tags: BTreeSet::new(),
        }
    }

    /// Adds a homeworld.
    #[must_use]
    pub fn with_homeworld(mut self, planet: ObjectId) -> Self {
        self.homeworlds.push(planet);
        self
    }

    /// Sets whether the species can colonize.
    #[must_use]
    pub fn colonizing(mut self, can_colonize: bool) -> Self {
        self.can_colonize = can_colonize;
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }
}

/// Map-backed [`SpeciesRegistry`].
#[derive(Clone, Debug, Default)]
pub struct SpeciesTable {
    species: HashMap<String, SpeciesRecord>,
}

impl SpeciesTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a species.
    #[must_use]
    pub fn with_species(mut self, record: SpeciesRecord) -> Self {
        self.species.insert(record.name.clone(), record);
        self
    }
}

impl SpeciesRegistry for SpeciesTable {
    fn exists(&self, species: &str) -> bool {
        self.species.contains_key(species)
    }

    fn homeworlds(&self, species: &str) -> &[ObjectId] {
        self.species
            .get(species)
            .map(|r| r.homeworlds.as_slice())
            .unwrap_or(&[])
    }

    fn can_colonize(&self, species: &str) -> bool {
        self.species.get(species).is_some_and(|r| r.can_colonize)
    }

    fn has_tag(&self, species: &str, tag: &str) -> bool {
        self.species.get(species).is_some_and(|r| r.tags.contains(tag))
    }
}

// =============================================================================
// Supply
// =============================================================================

/// Read-only view of supply networks.
pub trait SupplyRegistry {
    /// Systems where the empire can resupply fleets.
    fn fleet_supplyable_systems(&self, empire: EmpireId) -> Option<&BTreeSet<ObjectId>>;

    /// Groups of systems sharing resources for the empire.
    fn resource_supply_groups(&self, empire: EmpireId) -> &[BTreeSet<ObjectId>];
}

/// Map-backed [`SupplyRegistry`].
#[derive(Clone, Debug, Default)]
pub struct SupplyTable {
    fleet_supply: HashMap<EmpireId, BTreeSet<ObjectId>>,
    resource_groups: HashMap<EmpireId, Vec<BTreeSet<ObjectId>>>,
}

impl SupplyTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fleet-supplyable systems of an empire.
    #[must_use]
    pub fn with_fleet_supply(
        mut self,
        empire: EmpireId,
        systems: impl IntoIterator<Item = ObjectId>,
    ) -> Self {
        self.fleet_supply
            .insert(empire, systems.into_iter().collect());
        self
    }

    /// Adds a resource-sharing group for an empire.
    #[must_use]
    pub fn with_resource_group(
        mut self,
        empire: EmpireId,
        systems: impl IntoIterator<Item = ObjectId>,
    ) -> Self {
        self.resource_groups
            .entry(empire)
            .or_default()
            .push(systems.into_iter().collect());
        self
    }
}

impl SupplyRegistry for SupplyTable {
    fn fleet_supplyable_systems(&self, empire: EmpireId) -> Option<&BTreeSet<ObjectId>> {
        self.fleet_supply.get(&empire)
    }

    fn resource_supply_groups(&self, empire: EmpireId) -> &[BTreeSet<ObjectId>] {
        self.resource_groups
            .get(&empire)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
