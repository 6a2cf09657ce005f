//! Packed three-lane vector words.
//!
//! A [`Lanes`] value holds three independent 10-bit fixed-point lanes, lane 0
//! at bit 0, lane 1 at bit 10 and lane 2 at bit 20. The top two bits of the
//! word are always clear. Each lane carries one colour channel with two extra
//! bits of headroom, so intermediate results of a blend can exceed 255 before
//! being saturated back into a raw pixel by [`Lanes::pack`].

use crate::constants::{
    Word, CHANNEL_BITS, CHANNEL_MAX, FIXED_POINT_SHIFT, LANES, LANE_MASK, LANE_SHIFTS,
    ROUNDING_THRESHOLD,
};

/// Bits of a word covered by the three lanes
const LANES_MASK: Word =
    (LANE_MASK << LANE_SHIFTS[2]) | (LANE_MASK << LANE_SHIFTS[1]) | (LANE_MASK << LANE_SHIFTS[0]);

/// Offset of the tag byte in a raw pixel
const TAG_SHIFT: u32 = 3 * CHANNEL_BITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Lanes(Word);

impl Lanes {
    /// Reinterpret a word as packed lanes, clearing the bits outside of them
    #[must_use]
    pub const fn from_bits(bits: Word) -> Self {
        Self(bits & LANES_MASK)
    }

    /// Build packed lanes from individual values, each truncated to 10 bits
    #[must_use]
    pub fn new(lanes: [Word; LANES]) -> Self {
        Self(
            lanes
                .iter()
                .zip(LANE_SHIFTS)
                .fold(0, |acc, (&lane, shift)| acc | ((lane & LANE_MASK) << shift)),
        )
    }

    /// Put the same value in every lane
    #[must_use]
    pub fn splat(value: Word) -> Self {
        Self::new([value; LANES])
    }

    #[must_use]
    pub const fn bits(self) -> Word {
        self.0
    }

    /// Value of a single lane, `None` if `index` is not a lane number
    #[must_use]
    pub fn lane(self, index: usize) -> Option<Word> {
        LANE_SHIFTS
            .get(index)
            .map(|&shift| (self.0 >> shift) & LANE_MASK)
    }

    #[must_use]
    pub fn lanes(self) -> [Word; LANES] {
        LANE_SHIFTS.map(|shift| (self.0 >> shift) & LANE_MASK)
    }

    /// Apply `f` to every lane, truncating each result to 10 bits
    #[must_use]
    pub fn map(self, f: impl Fn(Word) -> Word) -> Self {
        Self::new(self.lanes().map(f))
    }

    /// Combine lanes pairwise, truncating each result to 10 bits
    #[must_use]
    pub fn zip_with(self, other: Self, f: impl Fn(Word, Word) -> Word) -> Self {
        let (a, b) = (self.lanes(), other.lanes());
        Self::new([f(a[0], b[0]), f(a[1], b[1]), f(a[2], b[2])])
    }

    /// Spread the three channel bytes of a raw pixel (bits 0-7, 8-15 and
    /// 16-23) into the lanes, without scaling. The top byte is ignored.
    #[must_use]
    pub fn unpack(raw: Word) -> Self {
        let channel = |index: u32| (raw >> (CHANNEL_BITS * index)) & CHANNEL_MAX;
        Self::new([channel(0), channel(1), channel(2)])
    }

    /// Saturate every lane to a channel byte and build a raw pixel, with `tag`
    /// placed in the top byte.
    #[must_use]
    pub fn pack(self, tag: Word) -> Word {
        // Lanes are unsigned 10-bit values, anything above 255 saturates
        let [c0, c1, c2] = self.lanes().map(|lane| lane.min(CHANNEL_MAX));
        (tag << TAG_SHIFT) | (c2 << (2 * CHANNEL_BITS)) | (c1 << CHANNEL_BITS) | c0
    }

    /// Replicate the low byte of `value` in every lane
    #[must_use]
    pub fn broadcast(value: Word) -> Self {
        Self::splat(value & CHANNEL_MAX)
    }

    /// Add the same immediate to every lane, modulo 2^10
    #[must_use]
    pub fn add_immediate(self, immediate: Word) -> Self {
        self.map(|lane| lane.wrapping_add(immediate))
    }
}

/// Multiply two lane values in 8.8 fixed point, rounding half up
fn fixed_point_mul(a: Word, b: Word) -> Word {
    let product = a * b;
    let fraction = product & ((1 << FIXED_POINT_SHIFT) - 1);
    (product >> FIXED_POINT_SHIFT) + Word::from(fraction >= ROUNDING_THRESHOLD)
}

/// Lane-wise addition, modulo 2^10
impl std::ops::Add for Lanes {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.zip_with(other, Word::wrapping_add)
    }
}

/// Lane-wise subtraction, modulo 2^10
impl std::ops::Sub for Lanes {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.zip_with(other, Word::wrapping_sub)
    }
}

/// Lane-wise fixed-point multiplication: each product is divided by 256,
/// rounding half up, then truncated to 10 bits.
impl std::ops::Mul for Lanes {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        self.zip_with(other, fixed_point_mul)
    }
}

impl From<Lanes> for Word {
    fn from(lanes: Lanes) -> Self {
        lanes.bits()
    }
}

impl std::fmt::Display for Lanes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [l0, l1, l2] = self.lanes();
        write!(f, "[{l2:#05x}, {l1:#05x}, {l0:#05x}]")
    }
}
