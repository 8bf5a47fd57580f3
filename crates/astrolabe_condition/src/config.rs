//! Tunable limits and thresholds for condition evaluation.

/// Configuration consulted by condition nodes during evaluation.
///
/// Controls RNG seeding, the small-input cutoff for containment nodes, the
/// starlane geometry thresholds and dynamic content nesting.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationConfig {
    /// Seed for streams created by [`seeded_rng_from`](crate::seeded_rng_from).
    pub seed: u64,

    /// Input size under which `Contains`/`ContainedBy` test each candidate
    /// against its own containers or contents instead of evaluating the
    /// inner condition over the whole universe.
    pub small_input_limit: usize,

    /// Dot product of unit lane vectors above which two lanes from the same
    /// system count as angularly close.
    pub max_lane_dot_product: f64,

    /// Minimum distance a new lane must keep from unrelated systems.
    pub min_lane_object_distance: f64,

    /// Maximum nesting of dynamic content lookups before resolution is
    /// treated as cyclic.
    pub max_resolution_depth: u8,
}

impl EvaluationConfig {
    /// The default configuration, usable in `static` items.
    pub const DEFAULT: Self = Self {
        seed: 0,
        small_input_limit: 16,
        max_lane_dot_product: 0.87,
        min_lane_object_distance: 20.0,
        max_resolution_depth: 8,
    };

    /// Creates a configuration that always takes the whole-set paths of
    /// containment nodes. Useful when comparing evaluation strategies.
    #[must_use]
    pub fn without_small_input_path() -> Self {
        Self {
            small_input_limit: 0,
            ..Self::default()
        }
    }

    /// Creates a configuration with looser lane geometry, for sparse galaxies.
    #[must_use]
    pub fn sparse_galaxy() -> Self {
        Self {
            max_lane_dot_product: 0.95,
            min_lane_object_distance: 10.0,
            ..Self::default()
        }
    }

    /// Builder method to set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method to set the small-input cutoff.
    #[must_use]
    pub fn with_small_input_limit(mut self, limit: usize) -> Self {
        self.small_input_limit = limit;
        self
    }

    /// Builder method to set the angular-closeness threshold.
    #[must_use]
    pub fn with_max_lane_dot_product(mut self, max_dot: f64) -> Self {
        self.max_lane_dot_product = max_dot;
        self
    }

    /// Builder method to set the lane/object proximity threshold.
    #[must_use]
    pub fn with_min_lane_object_distance(mut self, distance: f64) -> Self {
        self.min_lane_object_distance = distance;
        self
    }

    /// Builder method to set the dynamic resolution depth limit.
    #[must_use]
    pub fn with_max_resolution_depth(mut self, depth: u8) -> Self {
        self.max_resolution_depth = depth;
        self
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
