//! Error types for pardd.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur during a copy job, the per-block [`BlockError`], and the
//! [`Result`] type alias.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Configuration | [`Error::InvalidBlockSize`], [`Error::InvalidWorkerCount`] |
//! | Setup | [`Error::OpenInput`], [`Error::CreateOutput`], [`Error::IsADirectory`], [`Error::SameFile`] |
//! | Detection | [`Error::InsufficientData`], [`Error::Detection`] |
//! | Transfer | [`Error::StreamIo`], [`Error::PartialCopy`], [`Error::Io`] |
//! | Control | [`Error::Cancelled`] |

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pardd operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Whether `error` means the destination ran out of space.
///
/// [`io::ErrorKind::StorageFull`] covers errors std already classified. Errors
/// carrying only a raw OS code are matched against the platform's disk-full
/// codes. A block write that fails this way turns [`Error::PartialCopy`] into
/// [`ErrorCode::NoSpace`].
///
/// ```
/// use std::io;
/// use pardd::is_no_space_error;
///
/// assert!(is_no_space_error(&io::Error::new(io::ErrorKind::StorageFull, "full")));
/// assert!(!is_no_space_error(&io::Error::other("boom")));
/// ```
pub fn is_no_space_error(error: &io::Error) -> bool {
    // ENOSPC
    #[cfg(unix)]
    const DISK_FULL_CODES: &[i32] = &[28];
    // ERROR_HANDLE_DISK_FULL, ERROR_DISK_FULL
    #[cfg(windows)]
    const DISK_FULL_CODES: &[i32] = &[39, 112];
    #[cfg(not(any(unix, windows)))]
    const DISK_FULL_CODES: &[i32] = &[];

    error.kind() == io::ErrorKind::StorageFull
        || error
            .raw_os_error()
            .is_some_and(|code| DISK_FULL_CODES.contains(&code))
}

/// Which half of a block transfer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    /// Reading from the input
    Read,
    /// Writing to the output
    Write,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// A positioned read or write that failed for one block.
#[derive(Error, Debug)]
#[error("block {index} (offset {offset}): {op} failed: {source}")]
pub struct BlockError {
    /// Index of the failed block
    pub index: u64,
    /// Byte offset of the block in both files
    pub offset: u64,
    /// Whether the read or the write failed
    pub op: IoOp,
    /// Underlying error
    pub source: io::Error,
}

/// Stable, machine-readable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Bad configuration or arguments
    InvalidInput,
    /// Input file does not exist
    SourceNotFound,
    /// Permission denied on input or output
    PermissionDenied,
    /// Destination storage is full
    NoSpace,
    /// Any other I/O failure
    IoError,
    /// Some blocks were not copied
    PartialCopy,
    /// Job was cancelled
    Cancelled,
    /// Bug or unexpected internal condition
    Internal,
}

impl ErrorCode {
    /// The snake_case name used in machine-readable output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::SourceNotFound => "source_not_found",
            Self::PermissionDenied => "permission_denied",
            Self::NoSpace => "no_space",
            Self::IoError => "io_error",
            Self::PartialCopy => "partial_copy",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during a copy job.
///
/// Setup errors carry the offending path. Transfer errors carry how far
/// the job got before failing.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error outside of any more specific phase
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Block size string was not an integer in `1..=MAX_BLOCK_SIZE`
    #[error("Invalid block size: {0}")]
    InvalidBlockSize(String),

    /// Worker count outside `1..=MAX_WORKERS`
    #[error(
        "Invalid worker count: {0} (must be between 1 and {max})",
        max = crate::options::MAX_WORKERS
    )]
    InvalidWorkerCount(usize),

    /// Input file could not be opened
    #[error("Failed to open input file {path}: {source}")]
    OpenInput {
        /// Input path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Output file could not be created or truncated
    #[error("Failed to create or clear output file {path}: {source}")]
    CreateOutput {
        /// Output path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Input is a directory
    #[error("Input is a directory: {0}")]
    IsADirectory(PathBuf),

    /// Input and output refer to the same file
    #[error("Input and output are the same file: {0}")]
    SameFile(PathBuf),

    /// Fewer bytes were available than the format sniff needs
    #[error("Insufficient data to detect format: needed {needed} bytes, found {found}")]
    InsufficientData {
        /// Bytes required by the sniff
        needed: usize,
        /// Bytes actually available
        found: usize,
    },

    /// Reading or rewinding the input during format detection failed
    #[error("Failed to detect input format of {path}: {source}")]
    Detection {
        /// Input path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Read or write failure on the sequential path
    #[error("Stream {op} failed after {bytes_copied} bytes: {source}")]
    StreamIo {
        /// Whether reading or writing failed
        op: IoOp,
        /// Bytes written before the failure
        bytes_copied: u64,
        /// Underlying error
        source: io::Error,
    },

    /// One or more blocks failed on the block-partitioned path
    ///
    /// Blocks that did succeed have been written at their offsets; the
    /// destination is incomplete and should not be trusted.
    #[error("Failed to copy {} of {total} blocks", .total - .copied)]
    PartialCopy {
        /// Blocks written successfully
        copied: u64,
        /// Total blocks in the job
        total: u64,
        /// One entry per worker that stopped on an error
        errors: Vec<BlockError>,
    },

    /// Operation was cancelled via cancellation token
    ///
    /// Workers finish the block they are on, then stop taking new ones.
    #[error("Operation cancelled ({blocks_copied} blocks, {bytes_copied} bytes copied)")]
    Cancelled {
        /// Blocks written before cancellation (0 on the stream path)
        blocks_copied: u64,
        /// Bytes written before cancellation
        bytes_copied: u64,
    },
}

impl Error {
    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidBlockSize(_)
            | Self::InvalidWorkerCount(_)
            | Self::IsADirectory(_)
            | Self::SameFile(_) => ErrorCode::InvalidInput,
            Self::OpenInput { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                ErrorCode::SourceNotFound
            }
            Self::Io(source)
            | Self::OpenInput { source, .. }
            | Self::CreateOutput { source, .. }
            | Self::Detection { source, .. }
            | Self::StreamIo { source, .. } => io_error_code(source),
            Self::InsufficientData { .. } => ErrorCode::IoError,
            Self::PartialCopy { errors, .. } => {
                if errors.iter().any(|e| is_no_space_error(&e.source)) {
                    ErrorCode::NoSpace
                } else {
                    ErrorCode::PartialCopy
                }
            }
            Self::Cancelled { .. } => ErrorCode::Cancelled,
        }
    }
}

fn io_error_code(error: &io::Error) -> ErrorCode {
    if is_no_space_error(error) {
        return ErrorCode::NoSpace;
    }
    if error.kind() == io::ErrorKind::PermissionDenied {
        return ErrorCode::PermissionDenied;
    }
    ErrorCode::IoError
}
