//! MRtrix diffusion gradient encoding files (`.b`).
//!
//! Each non-empty line holds one gradient direction as whitespace separated
//! numbers, usually `x y z b`. Lines starting with `#` are comments.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[cfg(feature = "ndarray_encoding")]
use ndarray::Array2;

use crate::error::{MrtrixError, Result};
use crate::format::ENCODING_EXT;
use crate::util::has_ext;

/// A diffusion encoding file, all directions in one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BFile {
    path: PathBuf,
}

impl BFile {
    /// Wrap an existing `.b` file.
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        if !has_ext(&path, ENCODING_EXT) {
            return Err(MrtrixError::FormatMismatch(format!(
                "{} does not have the {} extension",
                path.display(),
                ENCODING_EXT
            )));
        }
        if !path.is_file() {
            return Err(MrtrixError::MissingCompanionFile(path));
        }
        Ok(BFile { path })
    }

    /// The path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all rows of the table.
    pub fn read_rows(&self) -> Result<Vec<Vec<f64>>> {
        let file = BufReader::new(File::open(&self.path)?);
        parse_rows(file)
    }

    /// Read the table as a 2-D array with one row per gradient direction.
    #[cfg(feature = "ndarray_encoding")]
    pub fn read_array(&self) -> Result<Array2<f64>> {
        rows_to_array(self.read_rows()?)
    }
}

/// Parse an encoding table. All rows must have the same number of columns.
pub fn parse_rows<R: BufRead>(source: R) -> Result<Vec<Vec<f64>>> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (i, line) in source.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|x| {
                x.parse::<f64>().map_err(|_| MrtrixError::InvalidEncoding {
                    line: i + 1,
                    reason: format!("{:?} is not a number", x),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(MrtrixError::InvalidEncoding {
                    line: i + 1,
                    reason: format!("expected {} columns, found {}", first.len(), row.len()),
                });
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(feature = "ndarray_encoding")]
fn rows_to_array(rows: Vec<Vec<f64>>) -> Result<Array2<f64>> {
    let nrows = rows.len();
    let ncols = rows.first().map(Vec::len).unwrap_or(0);
    let data: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), data).map_err(|e| MrtrixError::InvalidEncoding {
        line: 0,
        reason: e.to_string(),
    })
}
