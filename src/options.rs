//! Configuration options for copy jobs.
//!
//! This module provides [`CopyOptions`] for configuring a job, [`CopyMode`]
//! for choosing between the block-partitioned and sequential copiers, and
//! [`parse_block_size`] for turning user input into a block size.
//!
//! # Example
//!
//! ```
//! use pardd::{CopyMode, CopyOptions};
//!
//! let options = CopyOptions::default()
//!     .with_block_size(64 * 1024)
//!     .with_workers(8)
//!     .with_mode(CopyMode::Blocks);
//! ```

use crate::error::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Block size used when none is given or the given one is unusable.
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Worker pool size used when none is given.
pub const DEFAULT_WORKERS: usize = 4;

/// Largest accepted block size: the positive range of a 32-bit integer.
pub const MAX_BLOCK_SIZE: usize = i32::MAX as usize;

/// Largest accepted worker pool.
pub const MAX_WORKERS: usize = 1024;

/// Which copier handles the job.
///
/// # Default
///
/// The default is [`CopyMode::Auto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CopyMode {
    /// Gzip input is decompressed through the sequential copier; plain
    /// input goes through the block-partitioned copier.
    #[default]
    Auto,
    /// Always use the block-partitioned copier on the raw bytes.
    ///
    /// Gzip input is copied verbatim, not decompressed.
    Blocks,
    /// Always use the sequential copier.
    ///
    /// Gzip input is decompressed; plain input is streamed with a known total.
    Stream,
}

impl CopyMode {
    /// Lowercase name, as accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Blocks => "blocks",
            Self::Stream => "stream",
        }
    }
}

/// Parse a block size given as a decimal string.
///
/// # Errors
///
/// Returns [`Error::InvalidBlockSize`] for non-numeric input, for zero or
/// negative values and for values above [`MAX_BLOCK_SIZE`]. Callers usually
/// fall back to [`DEFAULT_BLOCK_SIZE`] with a warning instead of failing.
///
/// ```
/// use pardd::parse_block_size;
///
/// assert_eq!(parse_block_size("4096").unwrap(), 4096);
/// assert!(parse_block_size("abc").is_err());
/// assert!(parse_block_size("-1").is_err());
/// assert!(parse_block_size("1099511627776").is_err());
/// ```
pub fn parse_block_size(raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|n| usize::try_from(n).ok())
        .filter(|&n| is_valid_block_size(n))
        .ok_or_else(|| Error::InvalidBlockSize(raw.to_owned()))
}

fn is_valid_block_size(bytes: usize) -> bool {
    (1..=MAX_BLOCK_SIZE).contains(&bytes)
}

/// Options for copy jobs.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `block_size` | 512 | Bytes per block |
/// | `workers` | 4 | Worker pool size for the block copier |
/// | `mode` | `Auto` | Pick the copier from the sniffed format |
/// | `fsync` | `false` | Sync the output to disk after the copy |
/// | `cancel_token` | `None` | No cancellation |
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyOptions {
    /// Bytes per block (default: 512)
    ///
    /// Also used as the buffer size of the sequential copier, with a floor
    /// of 8 KiB.
    pub block_size: usize,

    /// Number of concurrently running block workers (default: 4)
    ///
    /// Must be in `1..=MAX_WORKERS` when the block copier runs.
    pub workers: usize,

    /// Which copier handles the job
    pub mode: CopyMode,

    /// Whether to sync the output to disk after writing (default: false)
    pub fsync: bool,

    /// Cancellation token (optional)
    ///
    /// When set to `true`, workers stop taking new blocks and the sequential
    /// copier stops between buffers. The job returns
    /// [`Error::Cancelled`](crate::Error::Cancelled).
    #[cfg_attr(feature = "serde", serde(skip))]
    pub cancel_token: Option<Arc<AtomicBool>>,

    /// Callback for warnings (optional)
    ///
    /// If not set and `tracing` feature is enabled, warnings are logged via tracing.
    /// Otherwise, warnings are silently ignored.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,

    /// Callback for verbose job details (optional)
    #[cfg_attr(feature = "serde", serde(skip))]
    pub verbose_handler: Option<fn(&str)>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            workers: DEFAULT_WORKERS,
            mode: CopyMode::Auto,
            fsync: false,
            cancel_token: None,
            warn_handler: None,
            verbose_handler: None,
        }
    }
}

impl CopyOptions {
    /// Create options with a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Create options with a verbose handler
    #[must_use]
    pub fn with_verbose_handler(mut self, handler: fn(&str)) -> Self {
        self.verbose_handler = Some(handler);
        self
    }

    /// Set the block size in bytes
    ///
    /// Zero and values above [`MAX_BLOCK_SIZE`] are replaced by
    /// [`DEFAULT_BLOCK_SIZE`].
    #[must_use]
    pub fn with_block_size(mut self, bytes: usize) -> Self {
        self.block_size = if is_valid_block_size(bytes) {
            bytes
        } else {
            DEFAULT_BLOCK_SIZE
        };
        self
    }

    /// Set the number of block workers
    ///
    /// Value is clamped to `1..=MAX_WORKERS`.
    #[must_use]
    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n.clamp(1, MAX_WORKERS);
        self
    }

    /// Choose the copier
    #[must_use]
    pub fn with_mode(mut self, mode: CopyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sync the output to disk once the copy finishes
    #[must_use]
    pub fn with_fsync(mut self) -> Self {
        self.fsync = true;
        self
    }

    /// Set a cancellation token
    #[must_use]
    pub fn with_cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Whether the cancellation token has been set.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel_token
            .as_ref()
            .is_some_and(|token| token.load(Ordering::Relaxed))
    }

    /// Block size to use, substituting the default for zero.
    pub(crate) fn effective_block_size(&self) -> usize {
        if is_valid_block_size(self.block_size) {
            self.block_size
        } else {
            self.warn(&format!(
                "Invalid block size: {}. Using default block size of {DEFAULT_BLOCK_SIZE} bytes.",
                self.block_size
            ));
            DEFAULT_BLOCK_SIZE
        }
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}", msg);
        }
    }

    pub(crate) fn verbose(&self, msg: &str) {
        if let Some(handler) = self.verbose_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!("{}", msg);
        }
    }
}
