//! Process-wide lookup tables translating a bit index into its block index,
//! in-block offset and single-bit mask.
//!
//! The tables are immutable once built. Resizing builds a complete new table
//! and swaps it in under the write lock, so a reader holds either the old or
//! the new snapshot and never a partially initialised one. Every
//! [`BitArray`](crate::BitArray) captures the snapshot that was current when
//! it was created.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

/// Storage unit of a bit array.
pub type Block = u64;

/// Number of bits held by one [`Block`].
pub const BITS_PER_BLOCK: usize = Block::BITS as usize;

/// Size of the lookup tables when nobody asked for another one.
pub const DEFAULT_LOOKUP_SIZE: usize = 513;

/// Number of blocks needed to hold `n` bits.
#[inline]
#[must_use]
pub const fn calculate_number_of_blocks(n: usize) -> usize {
    n.div_ceil(BITS_PER_BLOCK)
}

/// Index of the block holding bit `n`.
#[inline]
#[must_use]
pub const fn calculate_quotient(n: usize) -> usize {
    n / BITS_PER_BLOCK
}

/// Offset of bit `n` inside its block.
#[inline]
#[must_use]
pub const fn calculate_remainder(n: usize) -> usize {
    n % BITS_PER_BLOCK
}

/// Mask selecting offset `n` inside a block.
#[inline]
#[must_use]
pub const fn calculate_mask(n: usize) -> Block {
    1 << n
}

/// One immutable generation of the lookup tables.
#[derive(Debug)]
pub struct LookupTables {
    /// Indices below this value are served from the tables.
    size: usize,
    nr_blocks: Vec<usize>,
    quotient: Vec<usize>,
    remainder: Vec<usize>,
    masks: [Block; BITS_PER_BLOCK],
}

impl LookupTables {
    /// Builds every table for indices in `0..size`.
    #[must_use]
    pub fn build(size: usize) -> Self {
        let mut masks = [0; BITS_PER_BLOCK];
        for (offset, mask) in masks.iter_mut().enumerate() {
            *mask = calculate_mask(offset);
        }

        Self {
            size,
            nr_blocks: (0..size).map(calculate_number_of_blocks).collect(),
            quotient: (0..size).map(calculate_quotient).collect(),
            remainder: (0..size).map(calculate_remainder).collect(),
            masks,
        }
    }

    /// Number of indices served from the tables.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Number of blocks needed for `n` bits.
    #[inline]
    #[must_use]
    pub fn nr_blocks(&self, n: usize) -> usize {
        if n < self.size {
            self.nr_blocks[n]
        } else {
            calculate_number_of_blocks(n)
        }
    }

    /// Block holding bit `n`.
    #[inline]
    #[must_use]
    pub fn quotient(&self, n: usize) -> usize {
        if n < self.size {
            self.quotient[n]
        } else {
            calculate_quotient(n)
        }
    }

    /// Offset of bit `n` inside its block.
    #[inline]
    #[must_use]
    pub fn remainder(&self, n: usize) -> usize {
        if n < self.size {
            self.remainder[n]
        } else {
            calculate_remainder(n)
        }
    }

    /// Mask for an in-block offset.
    #[inline]
    #[must_use]
    pub fn mask(&self, offset: usize) -> Block {
        debug_assert!(offset < BITS_PER_BLOCK);
        self.masks[offset]
    }
}

/// Requested size for the next table generation and the current generation, if built.
struct LookupState {
    size: usize,
    tables: Option<Arc<LookupTables>>,
}

lazy_static::lazy_static! {
    static ref LOOKUPS: RwLock<LookupState> = RwLock::new(LookupState {
        size: DEFAULT_LOOKUP_SIZE,
        tables: None,
    });
}

/// Returns the current table generation, building it on first use.
#[must_use]
pub fn lookups() -> Arc<LookupTables> {
    {
        let state = LOOKUPS.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(tables) = &state.tables {
            return Arc::clone(tables);
        }
    }
    initialize_lookups()
}

/// Builds the tables if they are not built yet. Idempotent.
pub fn initialize_lookups() -> Arc<LookupTables> {
    let mut state = LOOKUPS.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(tables) = &state.tables {
        return Arc::clone(tables);
    }
    debug!("building bit array lookup tables of size {}", state.size);
    let tables = Arc::new(LookupTables::build(state.size));
    state.tables = Some(Arc::clone(&tables));
    tables
}

/// Rebuilds the shared tables with `new_size` entries.
///
/// The new generation is fully built before it replaces the old one. Bit
/// arrays created earlier keep using the generation they captured, which
/// remains valid because the tables only accelerate index arithmetic.
pub fn set_lookup_size(new_size: usize) {
    let tables = Arc::new(LookupTables::build(new_size));
    let mut state = LOOKUPS.write().unwrap_or_else(PoisonError::into_inner);
    debug!(
        "resizing bit array lookup tables from {} to {}",
        state.size, new_size
    );
    state.size = new_size;
    state.tables = Some(tables);
}

/// Size the next (or current) table generation is built with.
#[must_use]
pub fn lookup_size() -> usize {
    LOOKUPS.read().unwrap_or_else(PoisonError::into_inner).size
}

/// Whether a table generation is currently installed.
#[must_use]
pub fn lookups_initialized() -> bool {
    LOOKUPS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .tables
        .is_some()
}

/// Drops the installed generation; the next [`lookups`] call rebuilds it.
pub fn free_lookups() {
    LOOKUPS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .tables = None;
}
