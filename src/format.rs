//! The catalog of image format variants understood by this crate.
//!
//! A variant is a base on-disk format combined with an optional requirement
//! for an adjacent MRtrix diffusion encoding file (`.b`). Variants only
//! describe a format's identity (extension, MIME type, magic number,
//! companion files); validation of actual files is done by
//! [`ImageFileSet`](../fileset/struct.ImageFileSet.html).

use std::fmt;
use std::path::Path;

use crate::error::{MrtrixError, Result};
use crate::magic::MAGIC_IMAGE;
use crate::util::{has_ext, replace_ext, GZIP_MAGIC};

/// Extension of MRtrix diffusion encoding files.
pub const ENCODING_EXT: &str = ".b";
/// Extension of the data file written next to a `.mih` header.
pub const DATA_FILE_EXT: &str = ".dat";
/// Extension of BIDS JSON side cars.
pub const SIDE_CAR_EXT: &str = ".json";

/// The on-disk layout of an image, without any companion encoding file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseFormat {
    /// Header and data in a single `.mif` file.
    ImageFormat,
    /// A `.mif` file compressed with gzip (`.mif.gz`).
    ImageFormatGz,
    /// A `.mih` header pointing to a separate data file.
    ImageHeader,
    /// Single-file NIfTI (`.nii`).
    Nifti1,
    /// Gzipped single-file NIfTI (`.nii.gz`).
    NiftiGz,
    /// NIfTI with a JSON side car (`.nii` + `.json`).
    NiftiX,
    /// Gzipped NIfTI with a JSON side car (`.nii.gz` + `.json`).
    NiftiGzX,
}

impl BaseFormat {
    /// The extension of the primary file, including the leading dot.
    pub fn ext(self) -> &'static str {
        match self {
            BaseFormat::ImageFormat => ".mif",
            BaseFormat::ImageFormatGz => ".mif.gz",
            BaseFormat::ImageHeader => ".mih",
            BaseFormat::Nifti1 | BaseFormat::NiftiX => ".nii",
            BaseFormat::NiftiGz | BaseFormat::NiftiGzX => ".nii.gz",
        }
    }

    /// The MIME type of the format.
    pub fn mime_type(self) -> &'static str {
        match self {
            BaseFormat::ImageFormat => "application/x-mrtrix-image-format",
            BaseFormat::ImageFormatGz => "application/x-mrtrix-image-format-gz",
            BaseFormat::ImageHeader => "application/x-mrtrix-image-header",
            BaseFormat::Nifti1 => "application/x-nifti2",
            BaseFormat::NiftiGz => "application/x-nifti2+gzip",
            BaseFormat::NiftiX => "application/x-nifti2+json",
            BaseFormat::NiftiGzX => "application/x-nifti2+gzip.json",
        }
    }

    /// The bytes every primary file of this format starts with.
    /// NIfTI files keep their magic code at the end of the header, so they
    /// have none here.
    pub fn magic_number(self) -> Option<&'static [u8]> {
        match self {
            BaseFormat::ImageFormat | BaseFormat::ImageHeader => Some(MAGIC_IMAGE),
            BaseFormat::ImageFormatGz => Some(GZIP_MAGIC),
            _ => None,
        }
    }

    /// The extension of a required side car, if any.
    pub fn side_car_ext(self) -> Option<&'static str> {
        match self {
            BaseFormat::NiftiX | BaseFormat::NiftiGzX => Some(SIDE_CAR_EXT),
            _ => None,
        }
    }

    /// Whether this is one of the MRtrix image formats.
    pub fn is_mrtrix(self) -> bool {
        match self {
            BaseFormat::ImageFormat | BaseFormat::ImageFormatGz | BaseFormat::ImageHeader => true,
            _ => false,
        }
    }

    /// Whether the primary file is gzip compressed.
    pub fn is_gzipped(self) -> bool {
        self.ext().ends_with(".gz")
    }

    fn name(self) -> &'static str {
        match self {
            BaseFormat::ImageFormat => "ImageFormat",
            BaseFormat::ImageFormatGz => "ImageFormatGz",
            BaseFormat::ImageHeader => "ImageHeader",
            BaseFormat::Nifti1 => "Nifti1",
            BaseFormat::NiftiGz => "NiftiGz",
            BaseFormat::NiftiX => "NiftiX",
            BaseFormat::NiftiGzX => "NiftiGzX",
        }
    }
}

/// A base format, optionally augmented with a diffusion encoding file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormatVariant {
    base: BaseFormat,
    with_encoding: bool,
}

impl FormatVariant {
    /// MRtrix single-file image (`.mif`).
    pub const IMAGE_FORMAT: FormatVariant = FormatVariant::new(BaseFormat::ImageFormat, false);
    /// Gzipped MRtrix image (`.mif.gz`).
    pub const IMAGE_FORMAT_GZ: FormatVariant = FormatVariant::new(BaseFormat::ImageFormatGz, false);
    /// MRtrix header with separate data file (`.mih`).
    pub const IMAGE_HEADER: FormatVariant = FormatVariant::new(BaseFormat::ImageHeader, false);
    /// `.mif` with `.b` encoding.
    pub const IMAGE_FORMAT_B: FormatVariant = FormatVariant::new(BaseFormat::ImageFormat, true);
    /// `.mif.gz` with `.b` encoding.
    pub const IMAGE_FORMAT_GZ_B: FormatVariant = FormatVariant::new(BaseFormat::ImageFormatGz, true);
    /// `.mih` with `.b` encoding.
    pub const IMAGE_HEADER_B: FormatVariant = FormatVariant::new(BaseFormat::ImageHeader, true);
    /// `.nii`.
    pub const NIFTI1: FormatVariant = FormatVariant::new(BaseFormat::Nifti1, false);
    /// `.nii.gz`.
    pub const NIFTI_GZ: FormatVariant = FormatVariant::new(BaseFormat::NiftiGz, false);
    /// `.nii` + `.json`.
    pub const NIFTI_X: FormatVariant = FormatVariant::new(BaseFormat::NiftiX, false);
    /// `.nii.gz` + `.json`.
    pub const NIFTI_GZ_X: FormatVariant = FormatVariant::new(BaseFormat::NiftiGzX, false);
    /// `.nii` + `.b`.
    pub const NIFTI_B: FormatVariant = FormatVariant::new(BaseFormat::Nifti1, true);
    /// `.nii.gz` + `.b`.
    pub const NIFTI_GZ_B: FormatVariant = FormatVariant::new(BaseFormat::NiftiGz, true);
    /// `.nii` + `.json` + `.b`.
    pub const NIFTI_X_B: FormatVariant = FormatVariant::new(BaseFormat::NiftiX, true);
    /// `.nii.gz` + `.json` + `.b`.
    pub const NIFTI_GZ_X_B: FormatVariant = FormatVariant::new(BaseFormat::NiftiGzX, true);

    /// Every variant in the catalog.
    pub const ALL: [FormatVariant; 14] = [
        FormatVariant::IMAGE_FORMAT,
        FormatVariant::IMAGE_FORMAT_GZ,
        FormatVariant::IMAGE_HEADER,
        FormatVariant::IMAGE_FORMAT_B,
        FormatVariant::IMAGE_FORMAT_GZ_B,
        FormatVariant::IMAGE_HEADER_B,
        FormatVariant::NIFTI1,
        FormatVariant::NIFTI_GZ,
        FormatVariant::NIFTI_X,
        FormatVariant::NIFTI_GZ_X,
        FormatVariant::NIFTI_B,
        FormatVariant::NIFTI_GZ_B,
        FormatVariant::NIFTI_X_B,
        FormatVariant::NIFTI_GZ_X_B,
    ];

    /// Combine a base format with an optional encoding requirement.
    pub const fn new(base: BaseFormat, with_encoding: bool) -> Self {
        FormatVariant {
            base,
            with_encoding,
        }
    }

    /// The underlying base format.
    pub fn base(&self) -> BaseFormat {
        self.base
    }

    /// Whether an adjacent `.b` encoding file is required.
    pub fn requires_encoding(&self) -> bool {
        self.with_encoding
    }

    /// The extension of the primary file.
    pub fn ext(&self) -> &'static str {
        self.base.ext()
    }

    /// The MIME type, with a `b` suffix for encoding-augmented variants.
    pub fn mime_type(&self) -> String {
        let base = self.base.mime_type();
        match (self.with_encoding, base.contains('+')) {
            (false, _) => base.to_owned(),
            (true, true) => format!("{}.b", base),
            (true, false) => format!("{}+b", base),
        }
    }

    /// Look up a variant by MIME type.
    pub fn from_mime(mime: &str) -> Result<FormatVariant> {
        FormatVariant::ALL
            .iter()
            .copied()
            .find(|v| v.mime_type() == mime)
            .ok_or_else(|| MrtrixError::UnknownFormat(mime.to_owned()))
    }

    /// Guess the base variant from the file name alone. Companion files are
    /// not considered, so the result never requires an encoding or side car.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<FormatVariant> {
        let path = path.as_ref();
        // double extensions first
        let base = [
            BaseFormat::ImageFormatGz,
            BaseFormat::NiftiGz,
            BaseFormat::ImageFormat,
            BaseFormat::ImageHeader,
            BaseFormat::Nifti1,
        ]
        .iter()
        .copied()
        .find(|b| has_ext(path, b.ext()))
        .ok_or_else(|| MrtrixError::UnknownFormat(path.display().to_string()))?;
        Ok(FormatVariant::new(base, false))
    }

    /// Guess the variant of the file at `path`, looking for an adjacent
    /// JSON side car (NIfTI only) and `.b` encoding file on disk.
    pub fn detect<P: AsRef<Path>>(path: P) -> Result<FormatVariant> {
        let path = path.as_ref();
        let plain = FormatVariant::from_path(path)?;
        let sibling_exists = |ext: &str| {
            replace_ext(path, plain.ext(), ext)
                .map(|p| p.is_file())
                .unwrap_or(false)
        };
        let base = match plain.base {
            BaseFormat::Nifti1 if sibling_exists(SIDE_CAR_EXT) => BaseFormat::NiftiX,
            BaseFormat::NiftiGz if sibling_exists(SIDE_CAR_EXT) => BaseFormat::NiftiGzX,
            b => b,
        };
        Ok(FormatVariant::new(base, sibling_exists(ENCODING_EXT)))
    }
}

impl fmt::Display for FormatVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.base.name())?;
        if self.with_encoding {
            f.write_str("B")?;
        }
        Ok(())
    }
}

impl From<BaseFormat> for FormatVariant {
    fn from(base: BaseFormat) -> Self {
        FormatVariant::new(base, false)
    }
}
