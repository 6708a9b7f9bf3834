//! Block-partitioned concurrent copy.
//!
//! The input is split into fixed-size blocks (see [`BlockPlan`]). A fixed
//! pool of workers pulls block indices from a closable queue and, for each
//! index, reads the block at its offset and writes it to the same offset in
//! the output. Blocks never overlap, so the handles are shared without locks;
//! the only shared mutable state is the completion counter and the error list.
//!
//! # Strategy
//!
//! 1. Partition the file and announce the block total to the reporter
//! 2. Start `min(workers, total)` tasks on a dedicated rayon pool
//! 3. Feed indices `0..total` in ascending order into a bounded channel from
//!    the calling thread, then close it
//! 4. Wait for every worker to drain the queue and exit
//!
//! A worker that hits a read or write error records it and stops taking
//! blocks. Its siblings carry on. Once everything has been joined, any
//! shortfall is reported as [`Error::PartialCopy`].

use crate::error::{BlockError, Error, IoOp, Result};
use crate::options::{CopyOptions, MAX_WORKERS};
use crate::partition::BlockPlan;
use crate::progress::{ProgressKind, ProgressReporter};
use crossbeam_channel::{Receiver, bounded};
use std::fs::File;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use super::utils::{read_at_most, write_all_at};

/// Queue slots per worker. Keeps the dispatcher a little ahead of the pool
/// without materialising every index up front.
const QUEUE_DEPTH_PER_WORKER: usize = 4;

/// Outcome of a block-partitioned copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockCopyStats {
    /// `ceil(file_size / block_size)`
    pub blocks_total: u64,
    /// Blocks written successfully
    pub blocks_copied: u64,
    /// Bytes written to the output
    pub bytes_copied: u64,
    /// Block size actually used
    pub block_size: u64,
    /// Size of the worker pool
    pub workers: usize,
}

/// Shared state of one running job. Borrowed by every worker.
struct BlockJob<'a> {
    input: &'a File,
    output: &'a File,
    plan: BlockPlan,
    options: &'a CopyOptions,
    progress: &'a dyn ProgressReporter,
    completed: AtomicU64,
    bytes: AtomicU64,
    errors: Mutex<Vec<BlockError>>,
}

impl BlockJob<'_> {
    fn record_success(&self, bytes: u64) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
        self.progress.advance(1);
    }

    fn record_failure(&self, error: BlockError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error);
    }
}

/// Copy `file_size` bytes from `input` to `output` block by block.
///
/// Both handles are only accessed with positioned reads and writes, so their
/// cursors are left untouched. `output` must be open for writing; it is not
/// truncated or extended here.
///
/// `progress` receives [`ProgressKind::Blocks`] and then one unit per
/// completed block, from whichever worker completed it.
///
/// # Errors
///
/// - [`Error::InvalidWorkerCount`] if `options.workers` is 0 or above
///   [`MAX_WORKERS`]
/// - [`Error::PartialCopy`] if any block failed to read or write
/// - [`Error::Cancelled`] if the cancellation token fired before all blocks
///   were written
pub fn copy_blocks(
    input: &File,
    output: &File,
    file_size: u64,
    options: &CopyOptions,
    progress: &dyn ProgressReporter,
) -> Result<BlockCopyStats> {
    let workers = options.workers;
    if workers == 0 || workers > MAX_WORKERS {
        return Err(Error::InvalidWorkerCount(workers));
    }

    let plan = BlockPlan::new(file_size, options.effective_block_size());
    let total = plan.total_blocks();
    progress.start(ProgressKind::Blocks { total });

    let mut stats = BlockCopyStats {
        blocks_total: total,
        block_size: plan.block_size(),
        workers,
        ..BlockCopyStats::default()
    };

    if total == 0 {
        return Ok(stats);
    }

    options.verbose(&format!(
        "copying {} bytes as {} blocks of {} bytes with {} workers",
        file_size,
        total,
        plan.block_size(),
        workers
    ));

    // Workers beyond the block count would only find a closed queue
    let active = usize::try_from(total).map_or(workers, |total| workers.min(total));

    let job = BlockJob {
        input,
        output,
        plan,
        options,
        progress,
        completed: AtomicU64::new(0),
        bytes: AtomicU64::new(0),
        errors: Mutex::new(Vec::new()),
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(active)
        .thread_name(|i| format!("pardd-worker-{i}"))
        .build();

    match pool {
        Ok(pool) => pool.in_place_scope(|scope| run_job(scope, &job, active)),
        Err(e) => {
            options.warn(&format!(
                "Failed to create worker pool ({e}), using global pool"
            ));
            rayon::in_place_scope(|scope| run_job(scope, &job, active));
        }
    }

    stats.blocks_copied = job.completed.load(Ordering::Relaxed);
    stats.bytes_copied = job.bytes.load(Ordering::Relaxed);
    let errors = job
        .errors
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);

    if !errors.is_empty() {
        return Err(Error::PartialCopy {
            copied: stats.blocks_copied,
            total,
            errors,
        });
    }

    if stats.blocks_copied < total {
        if options.is_cancelled() {
            return Err(Error::Cancelled {
                blocks_copied: stats.blocks_copied,
                bytes_copied: stats.bytes_copied,
            });
        }
        return Err(Error::PartialCopy {
            copied: stats.blocks_copied,
            total,
            errors,
        });
    }

    Ok(stats)
}

/// Start the workers, then dispatch every block index from the calling thread.
///
/// The scope does not return until all workers have exited.
fn run_job<'scope>(scope: &rayon::Scope<'scope>, job: &'scope BlockJob<'scope>, workers: usize) {
    let (tx, rx) = bounded::<u64>(workers.saturating_mul(QUEUE_DEPTH_PER_WORKER));

    for id in 0..workers {
        let queue = rx.clone();
        scope.spawn(move |_| run_worker(id, job, queue));
    }
    // Only workers hold the receiving side, so sends fail once they have all stopped
    drop(rx);

    for index in 0..job.plan.total_blocks() {
        if job.options.is_cancelled() || tx.send(index).is_err() {
            break;
        }
    }
    // Close the queue: workers exit once it is drained
    drop(tx);
}

/// Take block indices until the queue is closed and empty.
fn run_worker(id: usize, job: &BlockJob<'_>, queue: Receiver<u64>) {
    // Private buffer, reused for every block this worker copies. No block is
    // longer than the file.
    let buf_len = job.plan.block_size().min(job.plan.file_size());
    let mut buf = vec![0u8; buf_len as usize];

    for index in queue.iter() {
        if job.options.is_cancelled() {
            break;
        }

        match copy_block(job, index, &mut buf) {
            Ok(bytes) => job.record_success(bytes),
            Err(error) => {
                job.options
                    .warn(&format!("worker {id} stopping after error: {error}"));
                job.record_failure(error);
                break;
            }
        }
    }

    job.options.verbose(&format!("worker {id} finished"));
}

/// Read block `index` from the input and write it at the same offset.
///
/// A short read (end of file reached early) writes only what was read.
fn copy_block(
    job: &BlockJob<'_>,
    index: u64,
    buf: &mut [u8],
) -> std::result::Result<u64, BlockError> {
    let range = job.plan.block_range(index);
    let offset = range.start;
    let len = (range.end - range.start) as usize;
    let chunk = &mut buf[..len];

    let read = read_at_most(job.input, chunk, offset).map_err(|source| BlockError {
        index,
        offset,
        op: IoOp::Read,
        source,
    })?;

    write_all_at(job.output, &chunk[..read], offset).map_err(|source| BlockError {
        index,
        offset,
        op: IoOp::Write,
        source,
    })?;

    Ok(read as u64)
}

// =============================================================================
// Tests
// =============================================================================
