//! Named content conditions.
//!
//! Buildings, species, hulls, parts, specials and foci may each carry a
//! location condition (where they can be produced or placed) and a combat
//! targeting condition. `Location` and `CombatTarget` nodes look these up by
//! name at evaluation time.

use std::collections::HashMap;

use astrolabe_foundation::ContentType;

use crate::condition::Condition;

/// String-keyed lookup of content conditions.
pub trait ContentLibrary {
    /// The location condition of a piece of content.
    ///
    /// `name2` disambiguates content whose location depends on a second
    /// name (e.g. a focus on a particular species); it is empty otherwise.
    fn location(&self, content_type: ContentType, name: &str, name2: &str) -> Option<&Condition>;

    /// The combat targeting condition of a piece of content.
    fn combat_targets(&self, content_type: ContentType, name: &str) -> Option<&Condition>;
}

/// A map-backed [`ContentLibrary`].
#[derive(Clone, Debug, Default)]
pub struct StaticContent {
    locations: HashMap<(ContentType, String, String), Condition>,
    combat_targets: HashMap<(ContentType, String), Condition>,
}

impl StaticContent {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a location condition.
    #[must_use]
    pub fn with_location(
        mut self,
        content_type: ContentType,
        name: impl Into<String>,
        name2: impl Into<String>,
        condition: Condition,
    ) -> Self {
        self.locations
            .insert((content_type, name.into(), name2.into()), condition);
        self
    }

    /// Registers a combat targeting condition.
    #[must_use]
    pub fn with_combat_targets(
        mut self,
        content_type: ContentType,
        name: impl Into<String>,
        condition: Condition,
    ) -> Self {
        self.combat_targets
            .insert((content_type, name.into()), condition);
        self
    }
}

impl ContentLibrary for StaticContent {
    fn location(&self, content_type: ContentType, name: &str, name2: &str) -> Option<&Condition> {
        self.locations
            .get(&(content_type, name.to_owned(), name2.to_owned()))
    }

    fn combat_targets(&self, content_type: ContentType, name: &str) -> Option<&Condition> {
        self.combat_targets.get(&(content_type, name.to_owned()))
    }
}
