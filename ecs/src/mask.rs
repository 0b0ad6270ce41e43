//! Per-entity component bitmasks.
//!
//! Each live entity carries one [`Mask`]: bit `i` is set if and only if the
//! component with bit index `i` is currently attached. The mask is the sole
//! source of truth query matching consults. One `u64` word caps a world at 64
//! registered components, which registration enforces.

/// A fixed-width component bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mask(u64);

impl Mask {
    /// The empty mask. Freshly created and destroyed entities hold this.
    pub const EMPTY: Self = Self(0);

    /// Number of component bits a mask can hold.
    pub const BITS: usize = u64::BITS as usize;

    /// A mask with a single bit set.
    #[inline]
    pub const fn single(bit: u8) -> Self {
        Self(1 << bit)
    }

    /// Set `bit`.
    #[inline]
    pub fn insert(&mut self, bit: u8) {
        self.0 |= 1 << bit;
    }

    /// Clear `bit`.
    #[inline]
    pub fn remove(&mut self, bit: u8) {
        self.0 &= !(1 << bit);
    }

    /// Whether `bit` is set.
    #[inline]
    pub const fn contains(&self, bit: u8) -> bool {
        self.0 & (1 << bit) != 0
    }

    /// Whether every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains_all(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `self` and `other` share any set bit.
    #[inline]
    pub const fn intersects(&self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no bits are set.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of set bits.
    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the set bits in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = u8> {
        let word = self.0;
        (0..Self::BITS as u8).filter(move |bit| word & (1 << bit) != 0)
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::ops::BitOr for Mask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Mask {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
