//! Merged-mining trailer packed at the tail of a header's extra data.
//!
//! The trailer is only self-describing from the end backward: the uncle count
//! sits just before the final reserved byte, and every other field is located
//! relative to the total size of the fields after it. With `L` the length of
//! the extra data and `E[L-a : L-b]` a slice measured from the end:
//!
//! ```text
//! uncle_count        = u64_le(E[L-9 : L-1])            E[L-1] is reserved
//! uncle_section      = uncle_count + uncle_count * 32
//! min_gas_section    = uncle_section + 32
//! tags_size          = u64_le(E[L-min_gas_section-9 : L-min_gas_section-1])
//! tags_section       = min_gas_section + 8 + tags_size
//!
//! min_gas_price      = E[L-uncle_section-33 : L-uncle_section-1]
//! merged_mining_tags = E[L-tags_size-min_gas_section-1 : L-min_gas_section-1]
//! bitcoin_header     = E[L-tags_section-81 : L-tags_section-1]
//! uncle(i)           = E[L-i*32-41 : L-i*32-9]
//! ```
//!
//! These offsets are a wire format shared with existing chains and must not be
//! normalized. Some fields overlap: the tag slice ends where the tag size word
//! ends, and with fewer than eight uncles the min gas price word runs into the
//! uncle slots or the count.
//!
//! `min_gas_section` is anchored on the whole uncle section. Earlier node
//! releases anchored it on `uncle_count + 32`, so tag and bitcoin header
//! offsets differ from those releases whenever `uncle_count > 0`.

use crate::encoding::read_le_u64;
use thiserror::Error;

/// Length of the embedded bitcoin block header.
pub const BITCOIN_HEADER_SIZE: usize = 80;

/// Length of the minimum gas price field.
pub const MIN_GAS_PRICE_SIZE: usize = 32;

/// Length of one uncle coinbase slot.
pub const UNCLE_SLOT_SIZE: usize = 32;

/// Smallest extra data that carries an uncle count.
pub const MIN_TRAILER_SIZE: usize = 9;

/// Failure to locate a trailer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrailerError {
    /// The requested range does not fit in the extra data.
    #[error("range [L-{start}, L-{end}) out of bounds for {len} bytes")]
    OutOfBounds {
        /// Distance of the range start from the end of the buffer.
        start: usize,
        /// Distance of the range end from the end of the buffer.
        end: usize,
        /// Length of the extra data.
        len: usize,
    },
    /// A decoded size is too large to compute offsets with.
    #[error("size field overflows offset arithmetic")]
    Overflow,
}

/// Read-only view over the trailer of a header's extra data.
///
/// Nothing is decoded up front; each accessor walks the chain of size fields it
/// depends on.
#[derive(Debug, Clone, Copy)]
pub struct MergedMiningTrailer<'a> {
    extra: &'a [u8],
}

impl<'a> MergedMiningTrailer<'a> {
    /// Wraps the extra data of a header.
    pub const fn new(extra: &'a [u8]) -> Self {
        Self { extra }
    }

    /// Number of uncle coinbase slots announced by the trailer.
    pub fn uncle_count(&self) -> Result<u64, TrailerError> {
        let raw = self.tail(MIN_TRAILER_SIZE, 1)?;
        read_le_u64(raw).ok_or(TrailerError::Overflow)
    }

    /// The minimum gas price word.
    pub fn min_gas_price(&self) -> Result<&'a [u8], TrailerError> {
        let section = self.uncle_section_size()?;
        self.tail(add(section, MIN_GAS_PRICE_SIZE + 1)?, add(section, 1)?)
    }

    /// Declared length of the merged mining tags.
    pub fn merged_mining_tags_size(&self) -> Result<usize, TrailerError> {
        let size = self.tail_u64(self.min_gas_section_size()?)?;
        usize::try_from(size).map_err(|_| TrailerError::Overflow)
    }

    /// The merged mining tags.
    pub fn merged_mining_tags(&self) -> Result<&'a [u8], TrailerError> {
        let size = self.merged_mining_tags_size()?;
        let section = self.min_gas_section_size()?;
        self.tail(add(add(size, section)?, 1)?, add(section, 1)?)
    }

    /// The embedded 80-byte bitcoin block header.
    pub fn bitcoin_header(&self) -> Result<&'a [u8], TrailerError> {
        let section = self.tags_section_size()?;
        self.tail(add(section, BITCOIN_HEADER_SIZE + 1)?, add(section, 1)?)
    }

    /// The uncle coinbase slot at `index`.
    ///
    /// The index is not checked against [`Self::uncle_count`]; callers decide
    /// which indices are valid.
    pub fn uncle_coinbase_address(&self, index: u64) -> Result<&'a [u8], TrailerError> {
        let index = usize::try_from(index).map_err(|_| TrailerError::Overflow)?;
        let offset = index
            .checked_mul(UNCLE_SLOT_SIZE)
            .ok_or(TrailerError::Overflow)?;
        self.tail(add(offset, UNCLE_SLOT_SIZE + 9)?, add(offset, 9)?)
    }

    fn uncle_section_size(&self) -> Result<usize, TrailerError> {
        let count = usize::try_from(self.uncle_count()?).map_err(|_| TrailerError::Overflow)?;
        count
            .checked_mul(UNCLE_SLOT_SIZE)
            .and_then(|slots| slots.checked_add(count))
            .ok_or(TrailerError::Overflow)
    }

    fn min_gas_section_size(&self) -> Result<usize, TrailerError> {
        add(self.uncle_section_size()?, MIN_GAS_PRICE_SIZE)
    }

    fn tags_section_size(&self) -> Result<usize, TrailerError> {
        let section = add(self.min_gas_section_size()?, 8)?;
        add(section, self.merged_mining_tags_size()?)
    }

    /// Little-endian `u64` stored at `E[L-offset-9 : L-offset-1]`.
    fn tail_u64(&self, offset: usize) -> Result<u64, TrailerError> {
        let raw = self.tail(add(offset, 9)?, add(offset, 1)?)?;
        read_le_u64(raw).ok_or(TrailerError::Overflow)
    }

    /// `E[L-start : L-end]`.
    fn tail(&self, start: usize, end: usize) -> Result<&'a [u8], TrailerError> {
        let len = self.extra.len();
        let out_of_bounds = TrailerError::OutOfBounds { start, end, len };
        if end > start || start > len {
            return Err(out_of_bounds);
        }
        self.extra.get(len - start..len - end).ok_or(out_of_bounds)
    }
}

fn add(a: usize, b: usize) -> Result<usize, TrailerError> {
    a.checked_add(b).ok_or(TrailerError::Overflow)
}
