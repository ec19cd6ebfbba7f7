//! Fixed-length bit arrays with block-wise set algebra.

use std::fmt;
use std::sync::Arc;

use contracts::*;

use crate::BitArrayError;
use crate::lookup::{BITS_PER_BLOCK, Block, LookupTables, lookups};

/// An ordered, fixed-length sequence of booleans stored in `u64` blocks.
///
/// Bit `i` lives in block `i / 64` at offset `i % 64`. The set algebra
/// operations take an explicit prefix length and work over the blocks that
/// prefix touches, so a caller may combine arrays over fewer bits than they
/// hold. Combining requires both operands to have the same length.
#[derive(Clone)]
pub struct BitArray {
    nr_bits: usize,
    blocks: Vec<Block>,
    lookup: Arc<LookupTables>,
}

impl BitArray {
    /// Creates an array of `nr_bits` bits, all `false`.
    ///
    /// Initialises the shared lookup tables if this is their first use.
    #[debug_ensures(ret.population_count(nr_bits) == 0)]
    pub fn new(nr_bits: usize) -> Self {
        let lookup = lookups();
        let nr_blocks = lookup.nr_blocks(nr_bits);
        Self {
            nr_bits,
            blocks: vec![0; nr_blocks],
            lookup,
        }
    }

    /// Creates an array of `nr_bits` bits with exactly the listed positions set.
    #[debug_requires(positions.iter().all(|&p| p < nr_bits))]
    pub fn from_positions(nr_bits: usize, positions: &[usize]) -> Self {
        let mut array = Self::new(nr_bits);
        for &pos in positions {
            array.set(pos, true);
        }
        array
    }

    /// Length of the array in bits.
    #[must_use]
    pub const fn nr_bits(&self) -> usize {
        self.nr_bits
    }

    /// Number of storage blocks.
    #[must_use]
    pub fn nr_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Sets every block touched by the first `nr_bits` bits to `value`.
    ///
    /// Works at block granularity, so bits past `nr_bits` in the last touched
    /// block change too. Bits past the array length are always kept clear.
    #[debug_requires(nr_bits <= self.nr_bits)]
    pub fn init(&mut self, value: bool, nr_bits: usize) {
        let nr_blocks = self.lookup.nr_blocks(nr_bits);
        let fill = if value { Block::MAX } else { 0 };
        self.blocks[..nr_blocks].fill(fill);
        if value {
            self.clear_tail();
        }
    }

    /// Returns the bit at `pos`.
    #[inline]
    #[debug_requires(pos < self.nr_bits, "bit position out of range")]
    pub fn get(&self, pos: usize) -> bool {
        let mask = self.lookup.mask(self.lookup.remainder(pos));
        self.blocks[self.lookup.quotient(pos)] & mask != 0
    }

    /// Sets the bit at `pos` to `value`.
    #[inline]
    #[debug_requires(pos < self.nr_bits, "bit position out of range")]
    #[debug_ensures(self.get(pos) == value)]
    pub fn set(&mut self, pos: usize, value: bool) {
        let mask = self.lookup.mask(self.lookup.remainder(pos));
        let block = &mut self.blocks[self.lookup.quotient(pos)];
        if value {
            *block |= mask;
        } else {
            *block &= !mask;
        }
    }

    /// Checked [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// [`BitArrayError::OutOfRange`] when `pos` is not below the array length.
    pub fn try_get(&self, pos: usize) -> Result<bool, BitArrayError> {
        self.check_position(pos)?;
        Ok(self.get(pos))
    }

    /// Checked [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// [`BitArrayError::OutOfRange`] when `pos` is not below the array length.
    pub fn try_set(&mut self, pos: usize, value: bool) -> Result<(), BitArrayError> {
        self.check_position(pos)?;
        self.set(pos, value);
        Ok(())
    }

    /// Clears the array, then sets every listed position.
    ///
    /// # Errors
    ///
    /// [`BitArrayError::OutOfRange`] for the first position past the end; the
    /// positions before it stay set.
    pub fn set_from_positions<I>(&mut self, positions: I) -> Result<(), BitArrayError>
    where
        I: IntoIterator<Item = usize>,
    {
        self.init(false, self.nr_bits);
        positions
            .into_iter()
            .try_for_each(|pos| self.try_set(pos, true))
    }

    /// In place: `self &= other` over the first `nr_bits` bits.
    #[inline]
    #[debug_requires(self.is_compatible(other), "bit array shapes differ")]
    #[debug_requires(nr_bits <= self.nr_bits)]
    pub fn intersect_with(&mut self, other: &Self, nr_bits: usize) {
        let nr_blocks = self.lookup.nr_blocks(nr_bits);
        for (a, b) in self.blocks[..nr_blocks].iter_mut().zip(&other.blocks) {
            *a &= *b;
        }
    }

    /// In place: `self |= other` over the first `nr_bits` bits.
    #[inline]
    #[debug_requires(self.is_compatible(other), "bit array shapes differ")]
    #[debug_requires(nr_bits <= self.nr_bits)]
    pub fn union_with(&mut self, other: &Self, nr_bits: usize) {
        let nr_blocks = self.lookup.nr_blocks(nr_bits);
        for (a, b) in self.blocks[..nr_blocks].iter_mut().zip(&other.blocks) {
            *a |= *b;
        }
    }

    /// In place: clears every bit of `self` that is set in `other`, over the
    /// first `nr_bits` bits.
    #[inline]
    #[debug_requires(self.is_compatible(other), "bit array shapes differ")]
    #[debug_requires(nr_bits <= self.nr_bits)]
    pub fn complement_with(&mut self, other: &Self, nr_bits: usize) {
        let nr_blocks = self.lookup.nr_blocks(nr_bits);
        for (a, b) in self.blocks[..nr_blocks].iter_mut().zip(&other.blocks) {
            *a &= !*b;
        }
    }

    /// Overwrites the blocks covering the first `nr_bits` bits with `other`'s.
    #[inline]
    #[debug_requires(self.is_compatible(other), "bit array shapes differ")]
    #[debug_requires(nr_bits <= self.nr_bits)]
    pub fn copy_from(&mut self, other: &Self, nr_bits: usize) {
        let nr_blocks = self.lookup.nr_blocks(nr_bits);
        self.blocks[..nr_blocks].copy_from_slice(&other.blocks[..nr_blocks]);
    }

    /// Number of set bits among the first `nr_bits`.
    #[inline]
    #[debug_requires(nr_bits <= self.nr_bits)]
    pub fn population_count(&self, nr_bits: usize) -> usize {
        let full = self.lookup.quotient(nr_bits);
        let tail = self.lookup.remainder(nr_bits);
        let mut count: usize = self.blocks[..full]
            .iter()
            .map(|block| block.count_ones() as usize)
            .sum();
        if tail != 0 {
            count += (self.blocks[full] & low_mask(tail)).count_ones() as usize;
        }
        count
    }

    /// Whether none of the first `nr_bits` bits is set.
    #[inline]
    #[debug_requires(nr_bits <= self.nr_bits)]
    pub fn is_empty(&self, nr_bits: usize) -> bool {
        let full = self.lookup.quotient(nr_bits);
        let tail = self.lookup.remainder(nr_bits);
        self.blocks[..full].iter().all(|&block| block == 0)
            && (tail == 0 || self.blocks[full] & low_mask(tail) == 0)
    }

    /// Ascending positions of the set bits among the first `nr_bits`.
    #[debug_requires(nr_bits <= self.nr_bits)]
    pub fn iter_ones(&self, nr_bits: usize) -> Ones<'_> {
        Ones {
            blocks: &self.blocks,
            limit: nr_bits,
            block_index: 0,
            current: self.blocks.first().copied().unwrap_or(0),
        }
    }

    /// Whether `other` can be combined with `self`.
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.nr_bits == other.nr_bits && self.blocks.len() == other.blocks.len()
    }

    /// Checks that `other` can be combined with `self` over `nr_bits` bits.
    ///
    /// # Errors
    ///
    /// [`BitArrayError::ShapeMismatch`] or [`BitArrayError::PrefixTooLong`].
    pub fn check_compatible(&self, other: &Self, nr_bits: usize) -> Result<(), BitArrayError> {
        if !self.is_compatible(other) {
            return Err(BitArrayError::ShapeMismatch {
                left_bits: self.nr_bits,
                left_blocks: self.blocks.len(),
                right_bits: other.nr_bits,
                right_blocks: other.blocks.len(),
            });
        }
        if nr_bits > self.nr_bits {
            return Err(BitArrayError::PrefixTooLong {
                requested: nr_bits,
                nr_bits: self.nr_bits,
            });
        }
        Ok(())
    }

    fn check_position(&self, pos: usize) -> Result<(), BitArrayError> {
        if pos < self.nr_bits {
            Ok(())
        } else {
            Err(BitArrayError::OutOfRange {
                pos,
                nr_bits: self.nr_bits,
            })
        }
    }

    fn clear_tail(&mut self) {
        let tail = self.lookup.remainder(self.nr_bits);
        if tail != 0 {
            if let Some(last) = self.blocks.last_mut() {
                *last &= low_mask(tail);
            }
        }
    }
}

/// Mask of the lowest `bits` offsets of a block.
#[inline]
const fn low_mask(bits: usize) -> Block {
    if bits >= BITS_PER_BLOCK {
        Block::MAX
    } else {
        (1 << bits) - 1
    }
}

impl PartialEq for BitArray {
    fn eq(&self, other: &Self) -> bool {
        self.nr_bits == other.nr_bits && self.blocks == other.blocks
    }
}

impl Eq for BitArray {}

impl fmt::Debug for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<bit array {{")?;
        for pos in self.iter_ones(self.nr_bits) {
            write!(f, " {pos}")?;
        }
        write!(f, " }}>")
    }
}

/// Iterator over set positions, see [`BitArray::iter_ones`].
#[derive(Clone, Debug)]
pub struct Ones<'a> {
    blocks: &'a [Block],
    limit: usize,
    block_index: usize,
    current: Block,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let offset = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                let pos = self.block_index * BITS_PER_BLOCK + offset;
                return (pos < self.limit).then_some(pos);
            }
            self.block_index += 1;
            if self.block_index * BITS_PER_BLOCK >= self.limit {
                return None;
            }
            self.current = *self.blocks.get(self.block_index)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn new_array_is_empty() {
        let array = BitArray::new(130);
        assert_eq!(array.nr_bits(), 130);
        assert_eq!(array.nr_blocks(), 3);
        assert_eq!(array.population_count(130), 0);
        assert!(array.is_empty(130));
    }

    #[test]
    fn zero_length_array() {
        let array = BitArray::new(0);
        assert_eq!(array.nr_blocks(), 0);
        assert_eq!(array.population_count(0), 0);
        assert_eq!(array.iter_ones(0).count(), 0);
    }

    #[test]
    fn set_then_get() {
        let mut array = BitArray::new(100);
        array.set(0, true);
        array.set(63, true);
        array.set(64, true);
        array.set(99, true);
        array.set(63, false);
        assert!(array.get(0));
        assert!(!array.get(63));
        assert!(array.get(64));
        assert!(array.get(99));
        assert_eq!(array.iter_ones(100).collect::<Vec<_>>(), vec![0, 64, 99]);
    }

    #[rstest]
    #[case(1)]
    #[case(63)]
    #[case(64)]
    #[case(65)]
    #[case(200)]
    fn init_true_counts_exactly_nr_bits(#[case] nr_bits: usize) {
        let mut array = BitArray::new(nr_bits);
        array.init(true, nr_bits);
        assert_eq!(array.population_count(nr_bits), nr_bits);
        array.init(false, nr_bits);
        assert!(array.is_empty(nr_bits));
    }

    #[test]
    fn population_count_respects_prefix() {
        let array = BitArray::from_positions(150, &[1, 5, 70, 149]);
        assert_eq!(array.population_count(0), 0);
        assert_eq!(array.population_count(2), 1);
        assert_eq!(array.population_count(6), 2);
        assert_eq!(array.population_count(70), 2);
        assert_eq!(array.population_count(71), 3);
        assert_eq!(array.population_count(150), 4);
        assert_eq!(array.iter_ones(71).collect::<Vec<_>>(), vec![1, 5, 70]);
    }

    #[test]
    fn set_algebra() {
        let a = BitArray::from_positions(70, &[0, 1, 2, 65]);
        let b = BitArray::from_positions(70, &[1, 2, 3, 69]);

        let mut and = a.clone();
        and.intersect_with(&b, 70);
        assert_eq!(and.iter_ones(70).collect::<Vec<_>>(), vec![1, 2]);

        let mut or = a.clone();
        or.union_with(&b, 70);
        assert_eq!(or.iter_ones(70).collect::<Vec<_>>(), vec![0, 1, 2, 3, 65, 69]);

        let mut diff = a.clone();
        diff.complement_with(&b, 70);
        assert_eq!(diff.iter_ones(70).collect::<Vec<_>>(), vec![0, 65]);

        let mut copy = BitArray::new(70);
        copy.copy_from(&a, 70);
        assert_eq!(copy, a);
    }

    #[test]
    fn checked_access() {
        let mut array = BitArray::new(10);
        assert_eq!(
            array.try_set(10, true),
            Err(BitArrayError::OutOfRange { pos: 10, nr_bits: 10 })
        );
        assert_eq!(array.try_get(3), Ok(false));
        assert!(array.set_from_positions([2, 4]).is_ok());
        assert_eq!(array.try_get(4), Ok(true));
        assert!(array.set_from_positions([7, 12]).is_err());
        assert_eq!(array.iter_ones(10).collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let a = BitArray::new(10);
        let b = BitArray::new(11);
        assert!(matches!(
            a.check_compatible(&b, 10),
            Err(BitArrayError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            a.check_compatible(&a, 11),
            Err(BitArrayError::PrefixTooLong { .. })
        ));
        assert!(a.check_compatible(&a, 10).is_ok());
    }

    #[test]
    fn debug_lists_positions() {
        let array = BitArray::from_positions(8, &[1, 6]);
        assert_eq!(format!("{array:?}"), "<bit array { 1 6 }>");
    }
}
