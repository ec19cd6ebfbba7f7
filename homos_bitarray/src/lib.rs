//! Compact bit arrays used as candidate sets by the homomorphism search.
//!
//! A [`BitArray`] has a length fixed at creation and supports O(1) single-bit
//! access plus block-wise intersection, union, difference, copy and
//! population count over a caller-chosen prefix. Index arithmetic for small
//! positions is served from a shared [`lookup`] table that can be resized with
//! [`set_lookup_size`].

mod bit_array;
mod error;
pub mod lookup;

pub use crate::bit_array::{BitArray, Ones};
pub use crate::error::BitArrayError;
pub use crate::lookup::{BITS_PER_BLOCK, Block, lookup_size, set_lookup_size};
