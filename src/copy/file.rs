//! Whole-file copy jobs.
//!
//! [`copy_file`] opens the input, sniffs its format, creates or truncates the
//! output and hands the pair to either the block-partitioned copier or the
//! sequential stream copier, depending on [`CopyMode`] and the sniffed
//! [`InputFormat`].

use crate::detect::{InputFormat, detect_format};
use crate::error::{Error, Result};
use crate::options::{CopyMode, CopyOptions};
use crate::progress::{NoProgress, ProgressKind, ProgressReporter};
use flate2::read::MultiGzDecoder;
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::Path;
use std::time::{Duration, Instant};

use super::blocks::copy_blocks;
use super::stream::copy_stream;
use super::utils::is_same_file;

/// How the bytes were moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Block-partitioned, concurrent, raw bytes
    Blocks,
    /// Sequential, raw bytes
    Stream,
    /// Sequential through a gzip decoder
    Decompress,
}

impl Strategy {
    /// Lowercase name, as used in summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::Stream => "stream",
            Self::Decompress => "decompress",
        }
    }

    fn choose(mode: CopyMode, format: InputFormat) -> Self {
        match (mode, format) {
            (CopyMode::Blocks, _) => Self::Blocks,
            (CopyMode::Auto | CopyMode::Stream, InputFormat::Gzip) => Self::Decompress,
            (CopyMode::Auto, InputFormat::Plain) => Self::Blocks,
            (CopyMode::Stream, InputFormat::Plain) => Self::Stream,
        }
    }
}

/// Statistics from a copy job.
///
/// Returned by [`copy_file`] to describe what was copied.
///
/// # Example
///
/// ```no_run
/// use pardd::{copy_file, CopyOptions};
/// use std::path::Path;
///
/// let stats = copy_file(Path::new("disk.img"), Path::new("copy.img"), &CopyOptions::default())?;
/// println!("Copied {} blocks ({} bytes)", stats.blocks_copied, stats.bytes_copied);
/// # Ok::<(), pardd::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyStats {
    /// Sniffed format of the input
    pub format: InputFormat,
    /// Copier that handled the job
    pub strategy: Strategy,
    /// Size of the input file when the job started
    pub input_size: u64,
    /// Bytes written to the output (decompressed size for gzip)
    pub bytes_copied: u64,
    /// Blocks in the job (0 for sequential strategies)
    pub blocks_total: u64,
    /// Blocks written (0 for sequential strategies)
    pub blocks_copied: u64,
    /// Block size in bytes
    pub block_size: u64,
    /// Worker pool size (1 for sequential strategies)
    pub workers: usize,
    /// Duration of the copy job
    pub duration: Duration,
}

/// Copy `src` to `dst`.
///
/// The destination is created if absent and truncated if present. See
/// [`copy_file_with_progress`] for the full contract.
///
/// # Errors
///
/// See [`copy_file_with_progress`].
pub fn copy_file(src: &Path, dst: &Path, options: &CopyOptions) -> Result<CopyStats> {
    copy_file_with_progress(src, dst, options, &NoProgress)
}

/// Copy `src` to `dst`, reporting progress.
///
/// # Steps
///
/// 1. Open `src` and capture its size
/// 2. Sniff the first two bytes for the gzip magic (inputs shorter than two
///    bytes count as plain)
/// 3. Create or truncate `dst`
/// 4. Run the copier chosen from `options.mode` and the format
/// 5. Sync `dst` if `options.fsync` is set
///
/// `progress.finish()` is called once the copier returns, on success and on
/// failure.
///
/// # Errors
///
/// Returns an error if:
/// - `src` cannot be opened ([`Error::OpenInput`])
/// - `src` is a directory ([`Error::IsADirectory`])
/// - `src` cannot be sniffed ([`Error::Detection`])
/// - `dst` is the same file as `src` ([`Error::SameFile`])
/// - `dst` cannot be created or truncated ([`Error::CreateOutput`])
/// - the copy itself fails ([`Error::PartialCopy`], [`Error::StreamIo`],
///   [`Error::Cancelled`])
/// - syncing fails ([`Error::Io`])
pub fn copy_file_with_progress(
    src: &Path,
    dst: &Path,
    options: &CopyOptions,
    progress: &dyn ProgressReporter,
) -> Result<CopyStats> {
    let start_time = Instant::now();

    let open_error = |source| Error::OpenInput {
        path: src.to_path_buf(),
        source,
    };
    let mut input = File::open(src).map_err(open_error)?;
    let src_meta = input.metadata().map_err(open_error)?;

    if src_meta.is_dir() {
        return Err(Error::IsADirectory(src.to_path_buf()));
    }

    let input_size = src_meta.len();
    let format = sniff(&mut input, src, options)?;

    // Truncating the destination would destroy the input
    if is_same_file(&src_meta, src, dst) {
        return Err(Error::SameFile(dst.to_path_buf()));
    }

    let output = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dst)
        .map_err(|source| Error::CreateOutput {
            path: dst.to_path_buf(),
            source,
        })?;

    let strategy = Strategy::choose(options.mode, format);
    options.verbose(&format!(
        "{} input of {} bytes, using {} strategy",
        format.as_str(),
        input_size,
        strategy.as_str()
    ));

    let result = run_strategy(strategy, &input, &output, input_size, options, progress);
    progress.finish();
    let mut stats = result?;

    if options.fsync {
        output.sync_all()?;
    }

    stats.format = format;
    stats.input_size = input_size;
    stats.duration = start_time.elapsed();
    Ok(stats)
}

/// Classify the input, treating inputs too short for the magic as plain.
fn sniff(input: &mut File, src: &Path, options: &CopyOptions) -> Result<InputFormat> {
    match detect_format(input) {
        Ok(format) => Ok(format),
        Err(Error::InsufficientData { found, .. }) => {
            options.verbose(&format!(
                "input has only {found} bytes, too short for gzip; treating as plain"
            ));
            Ok(InputFormat::Plain)
        }
        Err(Error::Io(source)) => Err(Error::Detection {
            path: src.to_path_buf(),
            source,
        }),
        Err(e) => Err(e),
    }
}

fn run_strategy(
    strategy: Strategy,
    input: &File,
    mut output: &File,
    input_size: u64,
    options: &CopyOptions,
    progress: &dyn ProgressReporter,
) -> Result<CopyStats> {
    let mut stats = CopyStats {
        format: InputFormat::Plain,
        strategy,
        input_size,
        bytes_copied: 0,
        blocks_total: 0,
        blocks_copied: 0,
        block_size: options.block_size as u64,
        workers: 1,
        duration: Duration::ZERO,
    };

    match strategy {
        Strategy::Blocks => {
            let block_stats = copy_blocks(input, output, input_size, options, progress)?;
            stats.bytes_copied = block_stats.bytes_copied;
            stats.blocks_total = block_stats.blocks_total;
            stats.blocks_copied = block_stats.blocks_copied;
            stats.block_size = block_stats.block_size;
            stats.workers = block_stats.workers;
        }
        Strategy::Stream => {
            progress.start(ProgressKind::Bytes { total: input_size });
            let mut reader = input;
            stats.bytes_copied = copy_stream(&mut reader, &mut output, options, progress)?;
        }
        Strategy::Decompress => {
            progress.start(ProgressKind::UnknownBytes);
            let mut decoder = MultiGzDecoder::new(BufReader::new(input));
            stats.bytes_copied = copy_stream(&mut decoder, &mut output, options, progress)?;
        }
    }

    Ok(stats)
}

// =============================================================================
// Tests
// =============================================================================
