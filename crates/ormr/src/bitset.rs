//! Packed boolean flags.
//!
//! A [`BitSet`] stores one bit per index, eight per byte, least-significant
//! bit first. It backs the activity flags of a [`Pool`](crate::pool::Pool)
//! and the tile occupancy of each tilemap chunk.
//!
//! Out-of-range indices are programmer errors and panic.

/// A fixed-length packed array of booleans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSet {
    bytes: Vec<u8>,
    bit_count: usize,
}

impl BitSet {
    /// Create a bit set with `bit_count` bits, all inactive.
    pub fn new(bit_count: usize) -> Self {
        assert!(bit_count > 0, "bit set must hold at least one bit");

        Self {
            bytes: vec![0; bit_count.div_ceil(8)],
            bit_count,
        }
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bit_count
    }

    /// True if no bit is active.
    pub fn is_empty(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }

    pub fn activate(&mut self, index: usize) {
        self.check(index);
        self.bytes[index / 8] |= 1 << (index % 8);
    }

    pub fn deactivate(&mut self, index: usize) {
        self.check(index);
        self.bytes[index / 8] &= !(1 << (index % 8));
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.check(index);
        self.bytes[index / 8] & (1 << (index % 8)) != 0
    }

    /// Deactivate every bit.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Lowest active index, or `None` if every bit is inactive.
    pub fn first_active(&self) -> Option<usize> {
        self.first_matching(|byte| byte)
    }

    /// Lowest inactive index, or `None` if every bit is active.
    pub fn first_inactive(&self) -> Option<usize> {
        self.first_matching(|byte| !byte)
    }

    /// Number of active bits.
    pub fn count_active(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Iterate over the active indices in ascending order.
    pub fn iter_active(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.bit_count).filter(move |&i| self.bytes[i / 8] & (1 << (i % 8)) != 0)
    }

    /// Scan whole bytes first and only look at bits inside the first byte
    /// with a candidate. `flip` maps a byte so that wanted bits read as 1.
    fn first_matching(&self, flip: impl Fn(u8) -> u8) -> Option<usize> {
        for (byte_index, &byte) in self.bytes.iter().enumerate() {
            let candidates = flip(byte);
            if candidates == 0 {
                continue;
            }

            let index = byte_index * 8 + candidates.trailing_zeros() as usize;
            // Padding bits in the last byte are never reported.
            return (index < self.bit_count).then_some(index);
        }

        None
    }

    #[inline]
    fn check(&self, index: usize) {
        assert!(
            index < self.bit_count,
            "bit index {index} out of range (bit count {})",
            self.bit_count
        );
    }
}
