//! Error types for checked bit array operations.

use thiserror::Error;

/// Precondition violations reported by the checked bit array API.
///
/// The unchecked operations assert the same conditions in debug builds only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitArrayError {
    /// A position at or beyond the array length was accessed.
    #[error("bit position {pos} is out of range for a bit array of {nr_bits} bits")]
    OutOfRange {
        /// The offending position.
        pos: usize,
        /// Length of the array.
        nr_bits: usize,
    },

    /// Two arrays of different shapes were combined.
    #[error(
        "bit array shapes differ: {left_bits} bits in {left_blocks} blocks vs {right_bits} bits in {right_blocks} blocks"
    )]
    ShapeMismatch {
        /// Length of the left operand.
        left_bits: usize,
        /// Block count of the left operand.
        left_blocks: usize,
        /// Length of the right operand.
        right_bits: usize,
        /// Block count of the right operand.
        right_blocks: usize,
    },

    /// A prefix longer than the array was requested.
    #[error("prefix of {requested} bits exceeds the {nr_bits} bits of the array")]
    PrefixTooLong {
        /// Requested prefix length.
        requested: usize,
        /// Length of the array.
        nr_bits: usize,
    },
}
