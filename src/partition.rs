//! Block partition arithmetic.
//!
//! A file of `file_size` bytes is split into `ceil(file_size / block_size)`
//! blocks. Block `b` covers `[b * block_size, min((b + 1) * block_size, file_size))`,
//! so the blocks are disjoint and together cover the file exactly. Only the
//! last block can be short.

use std::ops::Range;

/// Number of blocks needed to cover `file_size` bytes.
///
/// Returns 0 for an empty file.
///
/// # Panics
///
/// Panics if `block_size` is 0.
#[must_use]
pub fn total_blocks(file_size: u64, block_size: u64) -> u64 {
    file_size.div_ceil(block_size)
}

/// Block layout of one copy job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    file_size: u64,
    block_size: u64,
    total_blocks: u64,
}

impl BlockPlan {
    /// Partition `file_size` bytes into blocks of `block_size` bytes.
    ///
    /// A zero `block_size` is treated as 1 so the plan is always well formed;
    /// callers are expected to have validated it already.
    #[must_use]
    pub fn new(file_size: u64, block_size: usize) -> Self {
        let block_size = (block_size as u64).max(1);
        Self {
            file_size,
            block_size,
            total_blocks: total_blocks(file_size, block_size),
        }
    }

    /// Size of the input captured at job start.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Configured block size in bytes.
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// `ceil(file_size / block_size)`.
    pub fn total_blocks(&self) -> u64 {
        self.total_blocks
    }

    /// Byte range covered by block `index`.
    ///
    /// Indices at or past [`total_blocks`](Self::total_blocks) yield an empty
    /// range at the end of the file.
    pub fn block_range(&self, index: u64) -> Range<u64> {
        let start = index
            .saturating_mul(self.block_size)
            .min(self.file_size);
        let end = start.saturating_add(self.block_size).min(self.file_size);
        start..end
    }

    /// Length of block `index`; equal to the block size except for a short tail.
    pub fn block_len(&self, index: u64) -> u64 {
        let range = self.block_range(index);
        range.end - range.start
    }

    /// Ranges of all blocks in ascending order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        (0..self.total_blocks).map(|index| self.block_range(index))
    }
}
