//! Utility functions for copy operations.
//!
//! Positioned reads and writes that never touch the shared file cursor, so
//! several workers can use one handle at disjoint offsets, plus a file
//! identity helper for the same-file guard.

use std::fs::{File, Metadata};
use std::io;
use std::path::Path;

// =============================================================================
// Positioned I/O
// =============================================================================

#[cfg(unix)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

#[cfg(unix)]
fn pwrite(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.write_at(buf, offset)
}

#[cfg(windows)]
fn pwrite(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_write(buf, offset)
}

/// Read up to `buf.len()` bytes starting at `offset`.
///
/// Keeps reading until the buffer is full or the file ends, so the only way
/// to get fewer bytes than asked for is end of file. Returns the number of
/// bytes read.
pub(crate) fn read_at_most(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match pread(file, &mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Write all of `buf` starting at `offset`.
pub(crate) fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    while !buf.is_empty() {
        match pwrite(file, buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole block",
                ));
            }
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

// =============================================================================
// File identity
// =============================================================================

/// Whether `path` names the same file as the already-open input.
///
/// On Unix this compares (dev, ino), which also catches hard links and
/// symlinks. Elsewhere it falls back to comparing canonical paths. A
/// destination that does not exist yet is never the same file.
#[cfg(unix)]
pub(crate) fn is_same_file(input_meta: &Metadata, _input_path: &Path, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match std::fs::metadata(path) {
        Ok(meta) => meta.dev() == input_meta.dev() && meta.ino() == input_meta.ino(),
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub(crate) fn is_same_file(_input_meta: &Metadata, input_path: &Path, path: &Path) -> bool {
    match (input_path.canonicalize(), path.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// =============================================================================
// Tests
// =============================================================================
