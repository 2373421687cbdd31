//! Rust implementation of the MRtrix3 image, header and track file formats.
//!
//! The main entry points are [`MrtrixHeader`], which reads the text metadata
//! block of `.mif`, `.mih` and `.mif.gz` files, and [`ImageFileSet`], which
//! validates the set of files making up an image (header, data file,
//! diffusion encoding) against one of the [`FormatVariant`]s in the catalog.
//!
//! # Example
//!
//! ```no_run
//! use mrtrix::{HeaderOptions, MrtrixHeader};
//! # use mrtrix::Result;
//!
//! # fn run() -> Result<()> {
//! let header = MrtrixHeader::from_file("dwi.mih")?;
//! println!("dimensions: {:?}", header.dims()?);
//! let location = header.data_location("dwi.mih", &HeaderOptions::default())?;
//! println!("data in {} at byte {}", location.path.display(), location.offset);
//! # Ok(())
//! # }
//! ```
//!
//! [`MrtrixHeader`]: ./header/struct.MrtrixHeader.html
//! [`ImageFileSet`]: ./fileset/struct.ImageFileSet.html
//! [`FormatVariant`]: ./format/struct.FormatVariant.html
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

#[macro_use]
extern crate quick_error;

pub mod convert;
pub mod datatype;
pub mod encoding;
pub mod error;
pub mod fileset;
pub mod format;
pub mod header;
pub mod location;
pub mod magic;
pub mod tracks;
pub mod value;
pub mod writer;
mod util;

pub use crate::datatype::{DataType, ScalarKind};
pub use crate::encoding::BFile;
pub use crate::error::{MrtrixError, Result};
pub use crate::fileset::ImageFileSet;
pub use crate::format::{BaseFormat, FormatVariant};
pub use crate::header::{HeaderOptions, MrtrixHeader};
pub use crate::location::DataLocation;
pub use crate::tracks::Tracks;
pub use crate::value::{Scalar, Value};
