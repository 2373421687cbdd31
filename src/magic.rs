//! Magic number validation, shared by the image and track formats.
use std::io::Read;

use crate::error::{MrtrixError, Result};

/// Magic number of MRtrix image files (`.mif`, `.mih`).
pub const MAGIC_IMAGE: &[u8] = b"mrtrix image\n";
/// Magic number of MRtrix track files (`.tck`).
pub const MAGIC_TRACKS: &[u8] = b"mrtrix tracks\n";

/// Read `expected.len()` bytes from the source and compare them with
/// `expected`. A source which ends early is reported as a mismatch, with
/// whatever bytes could be read.
///
/// The bytes are consumed from the source.
pub fn check_magic<R: Read>(source: R, expected: &[u8]) -> Result<()> {
    let mut actual = Vec::with_capacity(expected.len());
    let _ = source.take(expected.len() as u64).read_to_end(&mut actual)?;
    if actual == expected {
        Ok(())
    } else {
        Err(MrtrixError::MagicNumberMismatch {
            expected: expected.to_vec(),
            actual,
        })
    }
}
