//! Input format sniffing.
//!
//! [`detect_format`] peeks at the first two bytes of a seekable handle to
//! decide whether the input is gzip. It is a sniff, not a validation: a file
//! that starts with the magic number may still fail to decompress later.

use crate::error::{Error, Result};
use std::io::{self, Read, Seek, SeekFrom};

/// The two-byte gzip magic number (RFC 1952).
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Format of the input as seen by the sniff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InputFormat {
    /// Anything that does not start with the gzip magic
    Plain,
    /// Starts with `1f 8b`
    Gzip,
}

impl InputFormat {
    /// Lowercase name, as used in summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Gzip => "gzip",
        }
    }
}

/// Read two bytes from the current position and classify the input.
///
/// The handle's position is restored to where it was before the call,
/// whether or not the sniff succeeds.
///
/// # Errors
///
/// - [`Error::InsufficientData`] if fewer than two bytes remain
/// - [`Error::Io`] if reading or seeking fails
pub fn detect_format<R: Read + Seek>(reader: &mut R) -> Result<InputFormat> {
    let start = reader.stream_position()?;

    let mut head = [0u8; GZIP_MAGIC.len()];
    let read_result = read_up_to(reader, &mut head);

    // Rewind before looking at the result so every exit path restores it
    reader.seek(SeekFrom::Start(start))?;

    let found = read_result?;
    if found < head.len() {
        return Err(Error::InsufficientData {
            needed: head.len(),
            found,
        });
    }

    if head == GZIP_MAGIC {
        Ok(InputFormat::Gzip)
    } else {
        Ok(InputFormat::Plain)
    }
}

/// Fill as much of `buf` as the reader allows, stopping at end of input.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
