//! Object and empire identifiers.
//!
//! Both identifiers are plain copyable handles into registries owned by the
//! caller. The engine never allocates or frees the objects they refer to.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle to an object in a caller-owned universe.
///
/// Ordering follows the raw id, which is what selection uses to break ties.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectId(i32);

impl ObjectId {
    /// Raw value of the invalid sentinel.
    pub const INVALID_RAW: i32 = -1;

    /// Creates an object id from its raw value.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns a sentinel value representing "no object".
    #[must_use]
    pub const fn invalid() -> Self {
        Self(Self::INVALID_RAW)
    }

    /// Returns true unless this is the invalid sentinel (or any negative id).
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Converts a raw id into a handle, rejecting negative values.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        if raw >= 0 { Some(Self(raw)) } else { None }
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "ObjectId({})", self.0)
        } else {
            write!(f, "ObjectId(invalid)")
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to an empire in a caller-owned empire registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EmpireId(i32);

impl EmpireId {
    /// Creates an empire id from its raw value.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Converts a raw id into a handle, rejecting negative values.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        if raw >= 0 { Some(Self(raw)) } else { None }
    }
}

impl fmt::Debug for EmpireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmpireId({})", self.0)
    }
}

impl fmt::Display for EmpireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_equality() {
        let a = ObjectId::new(1);
        let b = ObjectId::new(1);
        let c = ObjectId::new(2);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
    }

    #[test]
    fn object_id_invalid() {
        let invalid = ObjectId::invalid();
        assert!(!invalid.is_valid());
        assert!(ObjectId::new(0).is_valid());
        assert_eq!(ObjectId::from_raw(-5), None);
        assert_eq!(ObjectId::from_raw(7), Some(ObjectId::new(7)));
    }

    #[test]
    fn object_id_debug_format() {
        assert_eq!(format!("{:?}", ObjectId::new(42)), "ObjectId(42)");
        assert_eq!(format!("{:?}", ObjectId::invalid()), "ObjectId(invalid)");
    }

    #[test]
    fn object_id_display_format() {
        assert_eq!(format!("{}", ObjectId::new(42)), "42");
    }

    #[test]
    fn empire_id_round_trip_raw() {
        let e = EmpireId::new(3);
        assert_eq!(e.raw(), 3);
        assert_eq!(EmpireId::from_raw(-1), None);
        assert_eq!(format!("{e:?}"), "EmpireId(3)");
    }
}
