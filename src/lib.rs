//! # pardd
//!
//! Parallel block copying of files, with transparent gzip decompression.
//!
//! ## Core Features
//!
//! - **Block-partitioned copying**: The input is split into fixed-size blocks,
//!   copied by a fixed pool of workers with positioned reads and writes
//! - **Byte-exact output**: Every block lands at its own offset, so the output
//!   is identical to the input whatever order the workers finish in
//! - **Gzip detection**: Inputs starting with the gzip magic are decompressed
//!   through a sequential stream copier (multi-member streams included)
//! - **Bounded memory**: Each worker holds one block; the stream copier holds
//!   one buffer
//! - **Progress reporting**: Blocks for the parallel copier, bytes for the
//!   stream copier
//! - **Cancellable**: A shared token stops workers between blocks
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use pardd::CopyBuilder;
//!
//! let stats = CopyBuilder::new("disk.img", "copy.img")
//!     .block_size(64 * 1024)
//!     .workers(8)
//!     .run()?;
//! println!("Copied {} blocks ({} bytes)", stats.blocks_copied, stats.bytes_copied);
//! # Ok::<(), pardd::Error>(())
//! ```
//!
//! ## Function API
//!
//! For more control, use the function API with [`CopyOptions`]:
//!
//! ```no_run
//! use pardd::{copy_file, CopyMode, CopyOptions};
//! use std::path::Path;
//!
//! let options = CopyOptions::default()
//!     .with_block_size(1024 * 1024)
//!     .with_workers(16)
//!     .with_mode(CopyMode::Blocks)   // copy gzip input verbatim
//!     .with_fsync();
//!
//! let stats = copy_file(Path::new("disk.img.gz"), Path::new("copy.img.gz"), &options)?;
//! println!("{} with {} workers", stats.strategy.as_str(), stats.workers);
//! # Ok::<(), pardd::Error>(())
//! ```
//!
//! ## Failure Semantics
//!
//! A failed block does not stop its siblings. The failure is reported through
//! the warning handler, the other workers finish their blocks, and the job
//! returns [`Error::PartialCopy`] listing every failed block. The output may
//! then hold a mix of copied and unwritten ranges.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `progress` | [`BarReporter`] progress bar with indicatif |
//! | `tracing` | Route warnings and job details through the tracing crate |
//! | `serde` | Serialize/Deserialize for [`CopyOptions`] and [`InputFormat`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod copy;
mod detect;
mod error;
mod format;
mod options;
mod partition;
mod progress;

pub use builder::CopyBuilder;
pub use copy::{
    BlockCopyStats, CopyStats, Strategy, copy_blocks, copy_file, copy_file_with_progress,
    copy_stream,
};
pub use detect::{GZIP_MAGIC, InputFormat, detect_format};
pub use error::{BlockError, Error, ErrorCode, IoOp, Result, is_no_space_error};
pub use format::format_bytes;
pub use options::{
    CopyMode, CopyOptions, DEFAULT_BLOCK_SIZE, DEFAULT_WORKERS, MAX_BLOCK_SIZE, MAX_WORKERS,
    parse_block_size,
};
pub use partition::{BlockPlan, total_blocks};
pub use progress::{NoProgress, ProgressKind, ProgressReporter};

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::BarReporter;
