//! Builder API for ergonomic copy jobs.
//!
//! The builder pattern provides a fluent interface for configuring and executing
//! a copy job. This is often more convenient than manually constructing
//! [`CopyOptions`].
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use pardd::CopyBuilder;
//!
//! // Copy with defaults: 512-byte blocks, 4 workers, gzip auto-detected
//! let stats = CopyBuilder::new("disk.img", "copy.img").run()?;
//! println!("Copied {} blocks", stats.blocks_copied);
//! # Ok::<(), pardd::Error>(())
//! ```
//!
//! ## With Options
//!
//! ```no_run
//! use pardd::CopyBuilder;
//!
//! let stats = CopyBuilder::new("disk.img", "copy.img")
//!     .block_size(1024 * 1024) // 1 MiB blocks
//!     .workers(8)              // 8 concurrent workers
//!     .fsync()                 // Sync the output when done
//!     .run()?;
//! # Ok::<(), pardd::Error>(())
//! ```

use crate::copy::{CopyStats, copy_file, copy_file_with_progress};
use crate::error::Result;
use crate::options::{CopyMode, CopyOptions};
use crate::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// A builder for configuring and executing a copy job.
///
/// `CopyBuilder` provides a fluent interface that is often more ergonomic than
/// constructing [`CopyOptions`] manually.
///
/// # Example
///
/// ```no_run
/// use pardd::{CopyBuilder, CopyMode};
///
/// // Copy a gzip image verbatim instead of decompressing it
/// let stats = CopyBuilder::new("/images/disk.img.gz", "/backup/disk.img.gz")
///     .mode(CopyMode::Blocks)
///     .workers(16)
///     .run()?;
/// # Ok::<(), pardd::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CopyBuilder {
    src: PathBuf,
    dst: PathBuf,
    options: CopyOptions,
}

impl CopyBuilder {
    /// Create a new `CopyBuilder` with the given input and output paths.
    ///
    /// Uses default options (512-byte blocks, 4 workers, auto mode, no fsync).
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        Self {
            src: src.as_ref().to_path_buf(),
            dst: dst.as_ref().to_path_buf(),
            options: CopyOptions::default(),
        }
    }

    /// Set the block size in bytes.
    ///
    /// Zero, or anything above `MAX_BLOCK_SIZE`, falls back to the default of 512.
    #[must_use]
    pub fn block_size(mut self, bytes: usize) -> Self {
        self.options = self.options.with_block_size(bytes);
        self
    }

    /// Set the number of concurrent block workers.
    ///
    /// Default is 4. Values are clamped to `1..=MAX_WORKERS`.
    #[must_use]
    pub fn workers(mut self, n: usize) -> Self {
        self.options = self.options.with_workers(n);
        self
    }

    /// Choose the copier.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pardd::{CopyBuilder, CopyMode};
    ///
    /// let stats = CopyBuilder::new("big.bin", "copy.bin")
    ///     .mode(CopyMode::Stream)
    ///     .run()?;
    /// # Ok::<(), pardd::Error>(())
    /// ```
    #[must_use]
    pub fn mode(mut self, mode: CopyMode) -> Self {
        self.options = self.options.with_mode(mode);
        self
    }

    /// Sync the output to disk once the copy finishes.
    #[must_use]
    pub fn fsync(mut self) -> Self {
        self.options = self.options.with_fsync();
        self
    }

    /// Set a cancellation token for graceful interruption.
    ///
    /// When the token is set to `true`, workers stop taking new blocks and the
    /// job returns [`Error::Cancelled`](crate::Error::Cancelled).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pardd::CopyBuilder;
    /// use std::sync::Arc;
    /// use std::sync::atomic::AtomicBool;
    ///
    /// let cancel = Arc::new(AtomicBool::new(false));
    /// let cancel_clone = cancel.clone();
    ///
    /// // In another thread or signal handler:
    /// // cancel_clone.store(true, std::sync::atomic::Ordering::Relaxed);
    ///
    /// let result = CopyBuilder::new("disk.img", "copy.img")
    ///     .cancel_token(cancel)
    ///     .run();
    /// ```
    #[must_use]
    pub fn cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.options = self.options.with_cancel_token(token);
        self
    }

    /// Set a custom warning handler.
    ///
    /// Warnings include per-block failures and an unusable block size.
    /// If not set and the `tracing` feature is enabled, warnings are logged
    /// via tracing.
    #[must_use]
    pub fn on_warning(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_warn_handler(handler);
        self
    }

    /// Set a handler for job details (format, strategy, per-worker counts).
    #[must_use]
    pub fn verbose(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_verbose_handler(handler);
        self
    }

    /// Get a reference to the current options.
    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Execute the copy job.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be opened, the output cannot be
    /// created, or any block fails. See [`copy_file`] for details.
    pub fn run(self) -> Result<CopyStats> {
        copy_file(&self.src, &self.dst, &self.options)
    }

    /// Execute the copy job, reporting progress to `progress`.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_with_progress(self, progress: &dyn ProgressReporter) -> Result<CopyStats> {
        copy_file_with_progress(&self.src, &self.dst, &self.options, progress)
    }
}
