//! The read-only bundle every evaluation receives.
//!
//! A [`ScriptingContext`] borrows the universe and its collaborators, and
//! carries the four object references value expressions may read. It is
//! `Copy`, so nodes derive nested contexts freely: testing one candidate
//! means copying the context with a new local candidate.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;

use astrolabe_foundation::{DiplomaticStatus, EmpireId, ObjectId, Result};
use astrolabe_universe::{
    EmpireRegistry, LanePathfinder, Pathfinder, SpeciesRegistry, SupplyRegistry, Universe,
    UniverseObject,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::condition::Condition;
use crate::config::EvaluationConfig;
use crate::content::ContentLibrary;
use crate::invariance::Invariance;

/// The random stream shared by every node of one evaluation.
///
/// Callers own the stream; a seeded stream makes `Chance` and random
/// selection reproducible.
pub type SharedRng = RefCell<ChaCha8Rng>;

/// Creates a deterministic random stream.
#[must_use]
pub fn seeded_rng(seed: u64) -> SharedRng {
    RefCell::new(ChaCha8Rng::seed_from_u64(seed))
}

/// Creates the random stream for the configuration's seed.
#[must_use]
pub fn seeded_rng_from(config: &EvaluationConfig) -> SharedRng {
    seeded_rng(config.seed)
}

/// Stand-in for collaborators the caller did not supply.
///
/// Knows no empires, species, supply or content.
struct Unavailable;

impl EmpireRegistry for Unavailable {
    fn exists(&self, _empire: EmpireId) -> bool {
        false
    }

    fn capital(&self, _empire: EmpireId) -> Option<ObjectId> {
        None
    }

    fn diplomatic_status(&self, _a: EmpireId, _b: EmpireId) -> DiplomaticStatus {
        DiplomaticStatus::War
    }

    fn has_tech(&self, _empire: EmpireId, _tech: &str) -> bool {
        false
    }

    fn has_adopted_policy(&self, _empire: EmpireId, _policy: &str) -> bool {
        false
    }

    fn has_explored(&self, _empire: EmpireId, _system: ObjectId) -> bool {
        false
    }

    fn meter(&self, _empire: EmpireId, _name: &str) -> Option<f64> {
        None
    }

    fn stockpile(&self, _empire: EmpireId, _resource: &str) -> Option<f64> {
        None
    }
}

impl SpeciesRegistry for Unavailable {
    fn exists(&self, _species: &str) -> bool {
        false
    }

    fn homeworlds(&self, _species: &str) -> &[ObjectId] {
        &[]
    }

    fn can_colonize(&self, _species: &str) -> bool {
        false
    }

    fn has_tag(&self, _species: &str, _tag: &str) -> bool {
        false
    }
}

impl SupplyRegistry for Unavailable {
    fn fleet_supplyable_systems(&self, _empire: EmpireId) -> Option<&BTreeSet<ObjectId>> {
        None
    }

    fn resource_supply_groups(&self, _empire: EmpireId) -> &[BTreeSet<ObjectId>] {
        &[]
    }
}

impl ContentLibrary for Unavailable {
    fn location(
        &self,
        _content_type: astrolabe_foundation::ContentType,
        _name: &str,
        _name2: &str,
    ) -> Option<&Condition> {
        None
    }

    fn combat_targets(
        &self,
        _content_type: astrolabe_foundation::ContentType,
        _name: &str,
    ) -> Option<&Condition> {
        None
    }
}

static UNAVAILABLE: Unavailable = Unavailable;
static LANE_PATHFINDER: LanePathfinder = LanePathfinder;
static DEFAULT_CONFIG: EvaluationConfig = EvaluationConfig::DEFAULT;

/// Everything a condition may read while evaluating.
#[derive(Clone, Copy)]
pub struct ScriptingContext<'a> {
    universe: &'a Universe,
    empires: &'a dyn EmpireRegistry,
    species: &'a dyn SpeciesRegistry,
    supply: &'a dyn SupplyRegistry,
    pathfinder: &'a dyn Pathfinder,
    content: &'a dyn ContentLibrary,
    config: &'a EvaluationConfig,
    rng: &'a SharedRng,
    source: Option<ObjectId>,
    target: Option<ObjectId>,
    root_candidate: Option<ObjectId>,
    local_candidate: Option<ObjectId>,
    current_turn: i32,
    combat_bout: i32,
    resolution_depth: u8,
}

impl<'a> ScriptingContext<'a> {
    /// Creates a context over a universe with no other collaborators.
    ///
    /// Registries default to empty ones, the pathfinder to
    /// [`LanePathfinder`] and the configuration to its defaults.
    #[must_use]
    pub fn new(universe: &'a Universe, rng: &'a SharedRng) -> Self {
        Self {
            universe,
            empires: &UNAVAILABLE,
            species: &UNAVAILABLE,
            supply: &UNAVAILABLE,
            pathfinder: &LANE_PATHFINDER,
            content: &UNAVAILABLE,
            config: &DEFAULT_CONFIG,
            rng,
            source: None,
            target: None,
            root_candidate: None,
            local_candidate: None,
            current_turn: 0,
            combat_bout: 0,
            resolution_depth: 0,
        }
    }

    /// Builder method to set the empire registry.
    #[must_use]
    pub fn with_empires(mut self, empires: &'a dyn EmpireRegistry) -> Self {
        self.empires = empires;
        self
    }

    /// Builder method to set the species registry.
    #[must_use]
    pub fn with_species(mut self, species: &'a dyn SpeciesRegistry) -> Self {
        self.species = species;
        self
    }

    /// Builder method to set the supply registry.
    #[must_use]
    pub fn with_supply(mut self, supply: &'a dyn SupplyRegistry) -> Self {
        self.supply = supply;
        self
    }

    /// Builder method to set the pathfinder.
    #[must_use]
    pub fn with_pathfinder(mut self, pathfinder: &'a dyn Pathfinder) -> Self {
        self.pathfinder = pathfinder;
        self
    }

    /// Builder method to set the content library.
    #[must_use]
    pub fn with_content(mut self, content: &'a dyn ContentLibrary) -> Self {
        self.content = content;
        self
    }

    /// Builder method to set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: &'a EvaluationConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder method to set the source object.
    #[must_use]
    pub fn with_source(mut self, source: ObjectId) -> Self {
        self.source = Some(source);
        self
    }

    /// Builder method to set the target object.
    #[must_use]
    pub fn with_target(mut self, target: ObjectId) -> Self {
        self.target = Some(target);
        self
    }

    /// Builder method to set the root candidate.
    #[must_use]
    pub fn with_root_candidate(mut self, root: ObjectId) -> Self {
        self.root_candidate = Some(root);
        self
    }

    /// Builder method to set the current turn.
    #[must_use]
    pub fn with_turn(mut self, turn: i32) -> Self {
        self.current_turn = turn;
        self
    }

    /// Builder method to set the combat bout.
    #[must_use]
    pub fn with_combat_bout(mut self, bout: i32) -> Self {
        self.combat_bout = bout;
        self
    }

    /// A nested context testing one candidate.
    ///
    /// The root candidate is kept if already set; otherwise the candidate
    /// becomes the root as well.
    #[must_use]
    pub fn with_local_candidate(mut self, candidate: ObjectId) -> Self {
        self.local_candidate = Some(candidate);
        if self.root_candidate.is_none() {
            self.root_candidate = Some(candidate);
        }
        self
    }

    /// A context one dynamic resolution deeper.
    ///
    /// # Errors
    /// Returns an error when the configured depth limit would be exceeded.
    pub fn deeper(mut self, name: &str) -> Result<Self> {
        if self.resolution_depth >= self.config.max_resolution_depth {
            return Err(astrolabe_foundation::Error::cyclic_resolution(name));
        }
        self.resolution_depth += 1;
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The universe being evaluated.
    #[must_use]
    pub fn universe(&self) -> &'a Universe {
        self.universe
    }

    /// The empire registry.
    #[must_use]
    pub fn empires(&self) -> &'a dyn EmpireRegistry {
        self.empires
    }

    /// The species registry.
    #[must_use]
    pub fn species(&self) -> &'a dyn SpeciesRegistry {
        self.species
    }

    /// The supply registry.
    #[must_use]
    pub fn supply(&self) -> &'a dyn SupplyRegistry {
        self.supply
    }

    /// The jump-distance oracle.
    #[must_use]
    pub fn pathfinder(&self) -> &'a dyn Pathfinder {
        self.pathfinder
    }

    /// The dynamic content library.
    #[must_use]
    pub fn content(&self) -> &'a dyn ContentLibrary {
        self.content
    }

    /// The evaluation configuration.
    #[must_use]
    pub fn config(&self) -> &'a EvaluationConfig {
        self.config
    }

    /// The shared random stream.
    #[must_use]
    pub fn rng(&self) -> &'a SharedRng {
        self.rng
    }

    /// The source object id, if any.
    #[must_use]
    pub fn source(&self) -> Option<ObjectId> {
        self.source
    }

    /// The target object id, if any.
    #[must_use]
    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    /// The root candidate id, if any.
    #[must_use]
    pub fn root_candidate(&self) -> Option<ObjectId> {
        self.root_candidate
    }

    /// The local candidate id, if any.
    #[must_use]
    pub fn local_candidate(&self) -> Option<ObjectId> {
        self.local_candidate
    }

    /// The current turn.
    #[must_use]
    pub fn current_turn(&self) -> i32 {
        self.current_turn
    }

    /// The current combat bout.
    #[must_use]
    pub fn combat_bout(&self) -> i32 {
        self.combat_bout
    }

    /// Looks up an object in the universe.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&'a UniverseObject> {
        self.universe.get(id)
    }

    /// The local candidate object, logging when it is absent.
    #[must_use]
    pub fn local_candidate_object(&self) -> Option<&'a UniverseObject> {
        let Some(id) = self.local_candidate else {
            debug!("no local candidate in context");
            return None;
        };
        let object = self.universe.get(id);
        if object.is_none() {
            debug!(%id, "local candidate missing from universe");
        }
        object
    }

    /// Whether operands with these flags can be evaluated once for all
    /// candidates in this context.
    #[must_use]
    pub fn simple_eval_safe(&self, invariance: Invariance) -> bool {
        invariance.local_candidate && (self.root_candidate.is_some() || invariance.root_candidate)
    }
}

impl fmt::Debug for ScriptingContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptingContext")
            .field("objects", &self.universe.len())
            .field("source", &self.source)
            .field("target", &self.target)
            .field("root_candidate", &self.root_candidate)
            .field("local_candidate", &self.local_candidate)
            .field("current_turn", &self.current_turn)
            .field("combat_bout", &self.combat_bout)
            .field("resolution_depth", &self.resolution_depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn configured_seed_drives_the_stream() {
        let config = EvaluationConfig::default().with_seed(11);
        let a = seeded_rng_from(&config);
        let b = seeded_rng(11);
        let draws_a: Vec<u32> = (0..4).map(|_| a.borrow_mut().r#gen()).collect();
        let draws_b: Vec<u32> = (0..4).map(|_| b.borrow_mut().r#gen()).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn local_candidate_sets_root_once() {
        let universe = Universe::new();
        let rng = seeded_rng(0);
        let ctx = ScriptingContext::new(&universe, &rng);
        let first = ctx.with_local_candidate(ObjectId::new(1));
        assert_eq!(first.root_candidate(), Some(ObjectId::new(1)));

        let second = first.with_local_candidate(ObjectId::new(2));
        assert_eq!(second.local_candidate(), Some(ObjectId::new(2)));
        assert_eq!(second.root_candidate(), Some(ObjectId::new(1)));
        assert_eq!(ctx.local_candidate(), None);
    }

    #[test]
    fn simple_eval_needs_local_invariance() {
        let universe = Universe::new();
        let rng = seeded_rng(0);
        let ctx = ScriptingContext::new(&universe, &rng);

        assert!(ctx.simple_eval_safe(Invariance::ALL));
        let reads_local = Invariance {
            local_candidate: false,
            ..Invariance::ALL
        };
        assert!(!ctx.simple_eval_safe(reads_local));

        let reads_root = Invariance {
            root_candidate: false,
            ..Invariance::ALL
        };
        assert!(!ctx.simple_eval_safe(reads_root));
        assert!(ctx
            .with_root_candidate(ObjectId::new(3))
            .simple_eval_safe(reads_root));
    }

    #[test]
    fn depth_limit() {
        let universe = Universe::new();
        let rng = seeded_rng(0);
        let config = EvaluationConfig::default().with_max_resolution_depth(1);
        let ctx = ScriptingContext::new(&universe, &rng).with_config(&config);
        let once = ctx.deeper("a").unwrap();
        assert!(once.deeper("a").is_err());
    }

    #[test]
    fn seeded_streams_repeat() {
        let a: u32 = seeded_rng(9).borrow_mut().r#gen();
        let b: u32 = seeded_rng(9).borrow_mut().r#gen();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_local_candidate_is_none() {
        let universe = Universe::new();
        let rng = seeded_rng(0);
        let ctx = ScriptingContext::new(&universe, &rng);
        assert!(ctx.local_candidate_object().is_none());
        assert!(ctx.with_local_candidate(ObjectId::new(0)).local_candidate_object().is_none());
    }
}
