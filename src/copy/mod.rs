//! Core copy operations.
//!
//! This module provides the block-partitioned copier, the sequential stream
//! copier and the whole-file job that chooses between them.

mod blocks;
mod file;
mod stream;
mod utils;

// Re-export public API
pub use blocks::{BlockCopyStats, copy_blocks};
pub use file::{CopyStats, Strategy, copy_file, copy_file_with_progress};
pub use stream::copy_stream;
