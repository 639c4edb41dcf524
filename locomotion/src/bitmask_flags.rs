//! Small bitset over flag enums.
//!
//! Used for the animation layers an ability controls ([`LayerMask`](crate::animation::LayerMask))
//! and for the surface layers a geometry probe may hit
//! ([`SurfaceMask`](crate::geometry::SurfaceMask)).

use num_traits::{One, PrimInt};
use serde::{Deserialize, Serialize};

/// Implemented by flag enums whose discriminant is the bit index.
pub trait FlagBitmask: Copy {
    type Storage: PrimInt;

    fn bit_index(self) -> u8;

    fn mask(self) -> Self::Storage {
        // NOTE: `bit_index()` must stay below the bit width of `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A set of flags packed into a primitive integer.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitmaskFlags<T: PrimInt> {
    bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn empty() -> Self {
        Self { bits: T::zero() }
    }

    pub fn all() -> Self {
        Self { bits: !T::zero() }
    }

    pub fn from_bits(bits: T) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> T {
        self.bits
    }

    /// Builder-style insert.
    pub fn with<U: FlagBitmask<Storage = T>>(mut self, flag: U) -> Self {
        self.insert(flag);
        self
    }

    pub fn insert<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits | flag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits & !flag.mask();
    }

    pub fn contains<U: FlagBitmask<Storage = T>>(&self, flag: U) -> bool {
        (self.bits & flag.mask()) != T::zero()
    }

    pub fn intersects(&self, other: Self) -> bool {
        (self.bits & other.bits) != T::zero()
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }

    pub fn len(&self) -> u32 {
        self.bits.count_ones()
    }
}

impl<T: PrimInt, U: FlagBitmask<Storage = T>> FromIterator<U> for BitmaskFlags<T> {
    fn from_iter<I: IntoIterator<Item = U>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |flags, flag| flags.with(flag))
    }
}
