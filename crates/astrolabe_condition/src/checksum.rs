//! Structural checksums.
//!
//! Checksums let callers compare condition trees across processes without
//! shipping the trees. Every node folds a tag for its kind, then each operand
//! in declaration order, into a running sum:
//!
//! ```text
//! sum = (sum * 31 + operand) mod CHECKSUM_MODULUS
//! ```
//!
//! Structurally equal trees always agree; reordering or changing operands
//! changes the result except for rare collisions.

use astrolabe_foundation::{
    Affiliation, ContentType, MeterType, ObjectType, PlanetType, StarType, Visibility,
};
use astrolabe_universe::ObjectProperty;

/// Upper bound (exclusive) of every checksum.
pub const CHECKSUM_MODULUS: u32 = 10_000_000;

/// A value that contributes to a structural checksum.
pub trait CheckSum {
    /// This value's own checksum, below [`CHECKSUM_MODULUS`].
    fn check_sum(&self) -> u32;
}

/// Order-sensitive accumulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Checksummer {
    sum: u32,
}

impl Checksummer {
    /// Starts a checksum for a node or value kind.
    #[must_use]
    pub fn tagged(kind: &str) -> Self {
        Self::default().add(kind)
    }

    /// Folds one operand into the sum.
    #[must_use]
    pub fn add<T: CheckSum + ?Sized>(self, value: &T) -> Self {
        self.add_raw(value.check_sum())
    }

    /// Folds a raw number into the sum.
    #[must_use]
    pub fn add_raw(self, value: u32) -> Self {
        let folded = (u64::from(self.sum) * 31 + u64::from(value)) % u64::from(CHECKSUM_MODULUS);
        // The modulus fits in u32.
        #[allow(clippy::cast_possible_truncation)]
        let sum = folded as u32;
        Self { sum }
    }

    /// The final checksum.
    #[must_use]
    pub fn finish(self) -> u32 {
        self.sum
    }
}

impl CheckSum for u32 {
    fn check_sum(&self) -> u32 {
        self % CHECKSUM_MODULUS
    }
}

impl CheckSum for i32 {
    fn check_sum(&self) -> u32 {
        // Reinterpret the bits; negative values stay distinct.
        #[allow(clippy::cast_sign_loss)]
        let bits = *self as u32;
        bits.check_sum()
    }
}

impl CheckSum for u8 {
    fn check_sum(&self) -> u32 {
        u32::from(*self)
    }
}

impl CheckSum for bool {
    fn check_sum(&self) -> u32 {
        u32::from(*self)
    }
}

impl CheckSum for f64 {
    fn check_sum(&self) -> u32 {
        let bits = self.to_bits();
        // Fold the high half into the low half.
        #[allow(clippy::cast_possible_truncation)]
        let folded = (bits ^ (bits >> 32)) as u32;
        folded.check_sum()
    }
}

impl CheckSum for str {
    fn check_sum(&self) -> u32 {
        self.bytes()
            .fold(Checksummer::default(), |acc, byte| acc.add_raw(u32::from(byte)))
            .add_raw(1)
            .finish()
    }
}

impl CheckSum for String {
    fn check_sum(&self) -> u32 {
        self.as_str().check_sum()
    }
}

impl<T: CheckSum + ?Sized> CheckSum for Box<T> {
    fn check_sum(&self) -> u32 {
        (**self).check_sum()
    }
}

impl<T: CheckSum> CheckSum for Option<T> {
    fn check_sum(&self) -> u32 {
        match self {
            None => 0,
            Some(value) => Checksummer::default().add_raw(1).add(value).finish(),
        }
    }
}

impl<T: CheckSum> CheckSum for [T] {
    fn check_sum(&self) -> u32 {
        let len = u32::try_from(self.len()).unwrap_or(u32::MAX);
        self.iter()
            .fold(Checksummer::default().add_raw(len), Checksummer::add)
            .finish()
    }
}

impl<T: CheckSum> CheckSum for Vec<T> {
    fn check_sum(&self) -> u32 {
        self.as_slice().check_sum()
    }
}

macro_rules! ordinal_check_sum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl CheckSum for $ty {
                fn check_sum(&self) -> u32 {
                    self.ordinal() + 1
                }
            }
        )+
    };
}

ordinal_check_sum!(
    Affiliation,
    ContentType,
    MeterType,
    ObjectType,
    PlanetType,
    StarType,
    Visibility,
);

impl CheckSum for ObjectProperty {
    fn check_sum(&self) -> u32 {
        match self {
            Self::Meter(meter) => Checksummer::tagged("Meter").add(meter).finish(),
            other => other.ordinal() + 1,
        }
    }
}
