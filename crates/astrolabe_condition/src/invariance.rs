//! Invariance flags.
//!
//! A node or value reference is *invariant* with respect to a reference
//! (local candidate, root candidate, source, target) when its operands never
//! read that reference. Invariance decides whether operands can be evaluated
//! once per call instead of once per candidate.
//!
//! Flags are conservative: `false` is always safe, `true` is a promise.

/// Which context references an expression does *not* depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Invariance {
    /// Does not read the local candidate.
    pub local_candidate: bool,
    /// Does not read the root candidate.
    pub root_candidate: bool,
    /// Does not read the source object.
    pub source: bool,
    /// Does not read the target object.
    pub target: bool,
}

impl Invariance {
    /// Depends on nothing.
    pub const ALL: Self = Self {
        local_candidate: true,
        root_candidate: true,
        source: true,
        target: true,
    };

    /// May depend on anything.
    pub const NONE: Self = Self {
        local_candidate: false,
        root_candidate: false,
        source: false,
        target: false,
    };

    /// Invariant only where both are invariant.
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        Self {
            local_candidate: self.local_candidate && other.local_candidate,
            root_candidate: self.root_candidate && other.root_candidate,
            source: self.source && other.source,
            target: self.target && other.target,
        }
    }

    /// Flags of a subcondition or sampling condition as seen by its parent.
    ///
    /// The inner expression's local candidate is one of its own candidates,
    /// never the parent's, so local-candidate reads do not propagate.
    #[must_use]
    pub const fn nested(self) -> Self {
        Self {
            local_candidate: true,
            ..self
        }
    }
}

impl Default for Invariance {
    fn default() -> Self {
        Self::ALL
    }
}

/// Anything that can report its invariance.
pub trait Invariant {
    /// Recomputes the flags from the current operands.
    fn invariance(&self) -> Invariance;
}

impl<T: Invariant + ?Sized> Invariant for Box<T> {
    fn invariance(&self) -> Invariance {
        (**self).invariance()
    }
}

impl<T: Invariant> Invariant for Option<T> {
    fn invariance(&self) -> Invariance {
        self.as_ref().map_or(Invariance::ALL, Invariant::invariance)
    }
}

impl<T: Invariant> Invariant for [T] {
    fn invariance(&self) -> Invariance {
        self.iter()
            .fold(Invariance::ALL, |acc, item| acc.and(item.invariance()))
    }
}

impl<T: Invariant> Invariant for Vec<T> {
    fn invariance(&self) -> Invariance {
        self.as_slice().invariance()
    }
}
