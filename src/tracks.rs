//! MRtrix track files (`.tck`).
//!
//! A track file starts with `mrtrix tracks`, followed by a metadata block
//! with the same `key: value` syntax as image headers and the binary
//! streamline data. Only the signature and the metadata are read here.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::header::{HeaderOptions, MrtrixHeader};
use crate::location::DataLocation;
use crate::magic::{check_magic, MAGIC_TRACKS};

/// A validated MRtrix track file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tracks {
    path: PathBuf,
}

impl Tracks {
    /// Extension of track files.
    pub const EXT: &'static str = ".tck";

    /// Open the file at `path` and check its magic number.
    pub fn from_file<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let file = BufReader::new(File::open(&path)?);
        check_magic(file, MAGIC_TRACKS)?;
        Ok(Tracks { path })
    }

    /// The path of the track file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the metadata block following the magic number.
    pub fn header(&self) -> Result<MrtrixHeader> {
        let file = BufReader::new(File::open(&self.path)?);
        read_tracks_header(file, &HeaderOptions::default())
    }

    /// Where the streamline data starts, according to the `file` entry.
    pub fn data_location(&self) -> Result<DataLocation> {
        self.header()?.data_location(&self.path, &HeaderOptions::default())
    }
}

/// Read a track file's metadata block from a stream positioned at the start
/// of the file.
pub fn read_tracks_header<R: Read>(source: R, options: &HeaderOptions) -> Result<MrtrixHeader> {
    let mut source = BufReader::new(source);
    check_magic(&mut source, MAGIC_TRACKS)?;
    MrtrixHeader::parse_metadata(source, options)
}
