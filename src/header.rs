//! This module defines the `MrtrixHeader` struct, which holds the text
//! metadata block at the start of MRtrix image files (`.mif`, `.mih`,
//! `.mif.gz`).
//!
//! The block is a magic line, then `key: value` lines in any order, then a
//! line containing only `END`:
//!
//! ```text
//! mrtrix image
//! dim: 64,64,10
//! vox: 3.0,3.0,3.0
//! datatype: UInt8
//! file: . 96
//! END
//! ```

use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::datatype::DataType;
use crate::error::{MrtrixError, Result};
use crate::location::{self, DataLocation};
use crate::magic::{check_magic, MAGIC_IMAGE};
use crate::util::open_maybe_gz;
use crate::value::{Scalar, Value};

/// Options for reading headers and resolving their data files.
///
/// The default is strict: the metadata block must end with `END`, and the
/// data file must be given relative to the header, inside its directory.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeaderOptions {
    lenient_end: bool,
    allow_absolute_paths: bool,
    allow_parent_dirs: bool,
}

impl HeaderOptions {
    /// Strict options, same as `HeaderOptions::default()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a metadata block which reaches the end of the stream without
    /// an `END` line. Whatever was read up to that point is kept.
    pub fn lenient_end(mut self, lenient: bool) -> Self {
        self.lenient_end = lenient;
        self
    }

    /// Accept absolute data file paths in the `file` entry.
    pub fn allow_absolute_paths(mut self, allow: bool) -> Self {
        self.allow_absolute_paths = allow;
        self
    }

    /// Accept `..` components in relative data file paths, which may lead
    /// out of the header's directory.
    pub fn allow_parent_dirs(mut self, allow: bool) -> Self {
        self.allow_parent_dirs = allow;
        self
    }

    /// Whether a missing `END` line is tolerated.
    pub fn is_lenient_end(&self) -> bool {
        self.lenient_end
    }

    /// Whether absolute data file paths are accepted.
    pub fn allows_absolute_paths(&self) -> bool {
        self.allow_absolute_paths
    }

    /// Whether `..` components are accepted in data file paths.
    pub fn allows_parent_dirs(&self) -> bool {
        self.allow_parent_dirs
    }
}

/// The metadata of an MRtrix image.
///
/// Keys keep the order of their first appearance. A key appearing on several
/// lines holds a [`Value::MultiLine`] with one element per line.
///
/// # Examples
///
/// ```no_run
/// use mrtrix::MrtrixHeader;
/// # use mrtrix::Result;
///
/// # fn run() -> Result<()> {
/// let hdr = MrtrixHeader::from_file("dwi.mif")?;
/// let dims = hdr.dims()?;
/// let hdr_gz = MrtrixHeader::from_file("dwi.mif.gz")?;
/// # Ok(())
/// # }
/// ```
///
/// [`Value::MultiLine`]: ../value/enum.Value.html#variant.MultiLine
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MrtrixHeader {
    entries: Vec<(String, Value)>,
}

impl MrtrixHeader {
    /// Read the header of an MRtrix image file.
    /// If the file's name ends with ".gz", the file is assumed to need GZip decoding.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<MrtrixHeader> {
        Self::from_file_with_options(path, &HeaderOptions::default())
    }

    /// Read the header of an MRtrix image file with the given options.
    pub fn from_file_with_options<P: AsRef<Path>>(
        path: P,
        options: &HeaderOptions,
    ) -> Result<MrtrixHeader> {
        let source = open_maybe_gz(&path)?;
        let header = Self::from_reader_with_options(source, options)?;
        log::debug!(
            "read {} metadata entries from {}",
            header.len(),
            path.as_ref().display()
        );
        Ok(header)
    }

    /// Read an MRtrix header from the given byte stream, starting with the
    /// magic number line.
    pub fn from_reader<R: Read>(source: R) -> Result<MrtrixHeader> {
        Self::from_reader_with_options(source, &HeaderOptions::default())
    }

    /// Read an MRtrix header from the given byte stream with the given options.
    pub fn from_reader_with_options<R: Read>(
        source: R,
        options: &HeaderOptions,
    ) -> Result<MrtrixHeader> {
        let mut source = BufReader::new(source);
        check_magic(&mut source, MAGIC_IMAGE)?;
        Self::parse_metadata(source, options)
    }

    /// Parse the `key: value` lines of a metadata block. The stream must be
    /// positioned right after the magic number line, and is read up to and
    /// including the `END` line.
    pub fn parse_metadata<R: BufRead>(mut source: R, options: &HeaderOptions) -> Result<MrtrixHeader> {
        let mut header = MrtrixHeader::default();
        let mut buf = Vec::new();
        // the magic number is line 1
        let mut line_no = 1;
        loop {
            buf.clear();
            if source.read_until(b'\n', &mut buf)? == 0 {
                if options.is_lenient_end() {
                    log::warn!("metadata block ended after line {} without `END`", line_no);
                    break;
                }
                return Err(MrtrixError::MissingEndMarker);
            }
            line_no += 1;

            let line = std::str::from_utf8(&buf).map_err(|_| MrtrixError::MalformedHeaderLine {
                line: line_no,
                content: String::from_utf8_lossy(&buf).into_owned(),
            })?;
            let line = trim_line_end(line);
            if line == "END" {
                break;
            }
            let (key, value) = split_line(line).ok_or_else(|| MrtrixError::MalformedHeaderLine {
                line: line_no,
                content: line.to_owned(),
            })?;
            header.push(key, Value::parse(value));
        }
        Ok(header)
    }

    /// Build a header from key/value pairs, accumulating repeated keys the
    /// same way the parser does.
    pub fn from_entries<I, K>(entries: I) -> MrtrixHeader
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut header = MrtrixHeader::default();
        for (key, value) in entries {
            header.push(key.into(), value);
        }
        header
    }

    fn push<K: AsRef<str> + Into<String>>(&mut self, key: K, value: Value) {
        match self.entries.iter().position(|(k, _)| k == key.as_ref()) {
            Some(i) => {
                let previous = std::mem::replace(&mut self.entries[i].1, Value::List(Vec::new()));
                self.entries[i].1 = previous.accumulate(value);
            }
            None => self.entries.push((key.into(), value)),
        }
    }

    /// Get the value of a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over all entries in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the header has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw `file` entry: `.` or a path, optionally followed by an offset.
    pub fn file(&self) -> Result<&str> {
        let value = self
            .get("file")
            .ok_or(MrtrixError::MissingRequiredMetadata("file"))?;
        value
            .as_text()
            .ok_or_else(|| MrtrixError::InvalidFileEntry(value.to_string()))
    }

    /// The image dimensions (`dim`).
    pub fn dims(&self) -> Result<Vec<usize>> {
        let value = self
            .get("dim")
            .ok_or(MrtrixError::MissingRequiredMetadata("dim"))?;
        if value.is_multi_line() {
            return Err(invalid("dim", "repeated over several lines"));
        }
        value
            .elements()
            .into_iter()
            .map(|s| {
                s.as_i64()
                    .and_then(|d| usize::try_from(d).ok())
                    .ok_or_else(|| invalid("dim", format!("{} is not a dimension", s)))
            })
            .collect()
    }

    /// The voxel sizes (`vox`).
    pub fn vox_sizes(&self) -> Result<Vec<f64>> {
        let value = self
            .get("vox")
            .ok_or(MrtrixError::MissingRequiredMetadata("vox"))?;
        if value.is_multi_line() {
            return Err(invalid("vox", "repeated over several lines"));
        }
        value
            .elements()
            .into_iter()
            .map(|s| {
                s.as_f64()
                    .ok_or_else(|| invalid("vox", format!("{} is not a voxel size", s)))
            })
            .collect()
    }

    /// The voxel data type (`datatype`).
    pub fn datatype(&self) -> Result<DataType> {
        let value = self
            .get("datatype")
            .ok_or(MrtrixError::MissingRequiredMetadata("datatype"))?;
        value
            .as_text()
            .ok_or_else(|| invalid("datatype", format!("{} is not a type name", value)))?
            .parse()
    }

    /// The rows of the image-to-scanner `transform`, one per header line.
    pub fn transform(&self) -> Result<Vec<Vec<f64>>> {
        let value = self
            .get("transform")
            .ok_or(MrtrixError::MissingRequiredMetadata("transform"))?;
        value
            .lines()
            .into_iter()
            .map(|row| {
                row.elements()
                    .into_iter()
                    .map(|s: &Scalar| {
                        s.as_f64()
                            .ok_or_else(|| invalid("transform", format!("{} is not a number", s)))
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect()
    }

    /// Resolve where the voxel data of this header is stored. `header_path`
    /// is the path of the file this header was read from.
    pub fn data_location<P: AsRef<Path>>(
        &self,
        header_path: P,
        options: &HeaderOptions,
    ) -> Result<DataLocation> {
        location::resolve(self, header_path, options)
    }
}

impl<K: Into<String>> std::iter::FromIterator<(K, Value)> for MrtrixHeader {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        MrtrixHeader::from_entries(iter)
    }
}

/// Read the header at `path`, then resolve its data location.
pub(crate) fn read_location(path: &Path, options: &HeaderOptions) -> Result<DataLocation> {
    let file = File::open(path)?;
    let header = MrtrixHeader::from_reader_with_options(file, options)?;
    header.data_location(path, options)
}

fn trim_line_end(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn split_line(line: &str) -> Option<(&str, &str)> {
    let idx = line.find(": ")?;
    let key = &line[..idx];
    if key.is_empty() || key.contains(':') {
        return None;
    }
    Some((key, &line[idx + 2..]))
}

fn invalid<S: Into<String>>(key: &'static str, reason: S) -> MrtrixError {
    MrtrixError::InvalidMetadata {
        key,
        reason: reason.into(),
    }
}
