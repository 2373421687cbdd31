//! Utility functions to write MRtrix images and track files.
//!
//! The `file` entry of the given header is ignored: it is always derived
//! from the kind of file being written.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{MrtrixError, Result};
use crate::format::{BaseFormat, FormatVariant, DATA_FILE_EXT};
use crate::header::MrtrixHeader;
use crate::magic::{MAGIC_IMAGE, MAGIC_TRACKS};
use crate::util::replace_ext;

/// Write the `key: value` lines of a header, one line per element of
/// multi-line values. The `file` entry is skipped.
pub fn write_metadata<W: Write>(writer: &mut W, header: &MrtrixHeader) -> Result<()> {
    for (key, value) in header.iter().filter(|(k, _)| *k != "file") {
        for line in value.lines() {
            writeln!(writer, "{}: {}", key, line)?;
        }
    }
    Ok(())
}

/// Write an MRtrix image (`.mif`, `.mih` or `.mif.gz`, chosen by the file
/// name) with the given header and raw voxel data. Returns the paths written.
///
/// A `.mih` header gets its data in a `.dat` file of the same name.
pub fn write_image<P: AsRef<Path>>(path: P, header: &MrtrixHeader, data: &[u8]) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let variant = FormatVariant::from_path(path)?;
    match variant.base() {
        BaseFormat::ImageFormat => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_single_file(&mut writer, MAGIC_IMAGE, header, data)?;
            writer.flush()?;
            Ok(vec![path.to_path_buf()])
        }
        BaseFormat::ImageFormatGz => {
            let writer = BufWriter::new(File::create(path)?);
            let mut e = GzEncoder::new(writer, Compression::default());
            write_single_file(&mut e, MAGIC_IMAGE, header, data)?;
            let mut writer = e.finish()?;
            writer.flush()?;
            Ok(vec![path.to_path_buf()])
        }
        BaseFormat::ImageHeader => {
            let data_path = replace_ext(path, variant.ext(), DATA_FILE_EXT)
                .ok_or_else(|| MrtrixError::UnknownFormat(path.display().to_string()))?;
            let data_name = data_path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| MrtrixError::UnknownFormat(data_path.display().to_string()))?
                .to_owned();

            let mut writer = BufWriter::new(File::create(path)?);
            writer.write_all(MAGIC_IMAGE)?;
            write_metadata(&mut writer, header)?;
            writeln!(writer, "file: {}", data_name)?;
            writer.write_all(b"END\n")?;
            writer.flush()?;

            let mut writer = BufWriter::new(File::create(&data_path)?);
            writer.write_all(data)?;
            writer.flush()?;
            Ok(vec![path.to_path_buf(), data_path])
        }
        _ => Err(MrtrixError::UnknownFormat(path.display().to_string())),
    }
}

/// Write an MRtrix track file with the given metadata and raw streamline data.
pub fn write_tracks<P: AsRef<Path>>(path: P, header: &MrtrixHeader, data: &[u8]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_single_file(&mut writer, MAGIC_TRACKS, header, data)?;
    writer.flush()?;
    Ok(())
}

/// Write magic, metadata, `file: . <offset>` and `END`, followed by the data
/// starting exactly at `offset`.
fn write_single_file<W: Write>(writer: &mut W, magic: &[u8], header: &MrtrixHeader, data: &[u8]) -> Result<()> {
    let mut block = Vec::new();
    block.extend_from_slice(magic);
    write_metadata(&mut block, header)?;
    let offset = self_offset(block.len() + "file: . ".len() + "\nEND\n".len());
    writeln!(block, "file: . {}", offset)?;
    block.extend_from_slice(b"END\n");
    debug_assert_eq!(block.len(), offset);

    writer.write_all(&block)?;
    writer.write_all(data)?;
    Ok(())
}

/// The smallest offset equal to the length of the header block, given the
/// length of the block without the offset's own digits.
fn self_offset(len_without_digits: usize) -> usize {
    let mut offset = len_without_digits + 1;
    loop {
        let next = len_without_digits + offset.to_string().len();
        if next == offset {
            return offset;
        }
        offset = next;
    }
}
