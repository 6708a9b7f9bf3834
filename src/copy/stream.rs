//! Sequential stream copy.
//!
//! Used for gzip input, where the decompressed size is unknown until the
//! stream ends, and for plain input when streaming is requested. Data flows
//! through one bounded buffer; nothing is loaded whole into memory.

use crate::error::{Error, IoOp, Result};
use crate::options::CopyOptions;
use crate::progress::ProgressReporter;
use std::io::{self, Read, Write};

/// Smallest buffer the stream copier will use.
pub(crate) const MIN_STREAM_BUFFER: usize = 8 * 1024;

/// Largest buffer the stream copier will use.
pub(crate) const MAX_STREAM_BUFFER: usize = 4 * 1024 * 1024;

/// Copy everything from `src` to `dst` until end of input.
///
/// After each buffer is written, `progress` is advanced by its length, so the
/// reported count only ever grows. The caller is responsible for calling
/// [`ProgressReporter::start`] with the right [`ProgressKind`](crate::ProgressKind)
/// beforehand. `dst` is flushed before returning.
///
/// The buffer holds `options.block_size` bytes, kept between 8 KiB and 4 MiB.
///
/// # Errors
///
/// - [`Error::StreamIo`] on the first read or write failure; bytes already
///   written stay in `dst`
/// - [`Error::Cancelled`] if the cancellation token fires between buffers
pub fn copy_stream<R: Read, W: Write>(
    src: &mut R,
    dst: &mut W,
    options: &CopyOptions,
    progress: &dyn ProgressReporter,
) -> Result<u64> {
    let mut buf = vec![0u8; options.block_size.clamp(MIN_STREAM_BUFFER, MAX_STREAM_BUFFER)];
    let mut copied: u64 = 0;

    loop {
        if options.is_cancelled() {
            return Err(Error::Cancelled {
                blocks_copied: 0,
                bytes_copied: copied,
            });
        }

        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::StreamIo {
                    op: IoOp::Read,
                    bytes_copied: copied,
                    source,
                });
            }
        };

        dst.write_all(&buf[..n]).map_err(|source| Error::StreamIo {
            op: IoOp::Write,
            bytes_copied: copied,
            source,
        })?;

        copied += n as u64;
        progress.advance(n as u64);
    }

    dst.flush().map_err(|source| Error::StreamIo {
        op: IoOp::Write,
        bytes_copied: copied,
        source,
    })?;

    Ok(copied)
}
