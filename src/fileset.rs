//! Module for handling sets of files which together make up one image.
//!
//! An MRtrix image may be a single `.mif` file, a `.mih` header with a
//! separate data file, or a gzipped `.mif.gz`. Any of these, as well as the
//! NIfTI family of formats, can be accompanied by a `.b` diffusion encoding
//! file of the same name. `ImageFileSet` validates such a set of paths
//! against a [`FormatVariant`] and keeps track of the role of each path.
//!
//! [`FormatVariant`]: ../format/struct.FormatVariant.html

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use byteordered::ByteOrdered;
use flate2::bufread::GzDecoder;

use crate::encoding::BFile;
use crate::error::{MrtrixError, Result};
use crate::format::{BaseFormat, FormatVariant, ENCODING_EXT};
use crate::header::{read_location, HeaderOptions, MrtrixHeader};
use crate::location::{resolve_entry, DataLocation};
use crate::magic::check_magic;
use crate::util::{has_ext, open_maybe_gz, replace_ext, GZIP_MAGIC};

/// Magic code of single-file NIfTI-1 images (".nii", ".nii.gz").
pub const MAGIC_CODE_NIP1: &[u8] = b"n+1\0";
const NIFTI1_HEADER_SIZE: i32 = 348;
const NIFTI1_MAGIC_OFFSET: usize = 344;

/// A validated set of files making up one image.
///
/// Two file sets are equal when they have the same variant and own the same
/// paths.
///
/// # Example
///
/// ```no_run
/// use mrtrix::{FormatVariant, ImageFileSet};
/// # use mrtrix::Result;
///
/// # fn run() -> Result<()> {
/// // the data file named in the header is added to the set
/// let image = ImageFileSet::new(FormatVariant::IMAGE_HEADER, vec!["scan.mih"])?;
/// assert_eq!(image.paths().count(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ImageFileSet {
    variant: FormatVariant,
    paths: BTreeSet<PathBuf>,
    primary: PathBuf,
    location: Option<DataLocation>,
    encoding: Option<PathBuf>,
    side_car: Option<PathBuf>,
    options: HeaderOptions,
}

impl ImageFileSet {
    /// Validate the given paths as an image of the given variant.
    ///
    /// Exactly one path must carry the variant's extension. Companion files
    /// which were not given (the data file of a `.mih` header, the `.b`
    /// encoding, the JSON side car) are looked up next to it and added.
    ///
    /// # Errors
    ///
    /// - `MrtrixError::FormatMismatch` if the paths do not fit the variant,
    /// e.g. a `.mif` file whose data lives in another file.
    /// - `MrtrixError::MagicNumberMismatch` if a file has the wrong signature.
    /// - `MrtrixError::MissingCompanionFile` if a required companion is absent.
    /// - Any header parsing error of MRtrix images.
    pub fn new<I, P>(variant: FormatVariant, paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::new_with_options(variant, paths, &HeaderOptions::default())
    }

    /// Same as `new`, reading headers with the given options.
    pub fn new_with_options<I, P>(variant: FormatVariant, paths: I, options: &HeaderOptions) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut paths: BTreeSet<PathBuf> = paths.into_iter().map(Into::into).collect();
        let primary = select_primary(&paths, variant.ext())?;

        let location = match variant.base() {
            BaseFormat::ImageFormat => {
                let loc = read_location(&primary, options)?;
                if !loc.is_self || loc.path != primary {
                    return Err(MrtrixError::FormatMismatch(format!(
                        "data file ({}) is not the header file ({})",
                        loc.path.display(),
                        primary.display()
                    )));
                }
                Some(loc)
            }
            BaseFormat::ImageHeader => {
                let loc = read_location(&primary, options)?;
                if !loc.path.is_file() {
                    return Err(MrtrixError::MissingCompanionFile(loc.path));
                }
                if paths.insert(loc.path.clone()) {
                    log::debug!(
                        "added data file {} of header {}",
                        loc.path.display(),
                        primary.display()
                    );
                }
                Some(loc)
            }
            BaseFormat::ImageFormatGz => {
                check_gzipped_image(&primary, options)?;
                None
            }
            BaseFormat::Nifti1 | BaseFormat::NiftiGz | BaseFormat::NiftiX | BaseFormat::NiftiGzX => {
                check_nifti1(&primary)?;
                None
            }
        };

        let side_car = match variant.base().side_car_ext() {
            Some(ext) => Some(find_companion(&mut paths, &primary, variant.ext(), ext)?),
            None => None,
        };
        let encoding = if variant.requires_encoding() {
            Some(find_companion(&mut paths, &primary, variant.ext(), ENCODING_EXT)?)
        } else {
            None
        };

        Ok(ImageFileSet {
            variant,
            paths,
            primary,
            location,
            encoding,
            side_car,
            options: *options,
        })
    }

    /// Validate the image at `path`, guessing its variant from the file name
    /// and the companion files next to it.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let variant = FormatVariant::detect(path)?;
        Self::new(variant, vec![path.to_path_buf()])
    }

    /// The format variant of this image.
    pub fn variant(&self) -> FormatVariant {
        self.variant
    }

    /// The extension of the primary file.
    pub fn ext(&self) -> &'static str {
        self.variant.ext()
    }

    /// All paths owned by this file set, in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Whether the given path belongs to this file set.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// The primary file: the header for MRtrix images, the image file for NIfTI.
    pub fn header_path(&self) -> &Path {
        &self.primary
    }

    /// Where the voxel data lives, for uncompressed MRtrix images.
    pub fn data_location(&self) -> Option<&DataLocation> {
        self.location.as_ref()
    }

    /// The file holding the voxel data, for uncompressed MRtrix images.
    pub fn data_path(&self) -> Option<&Path> {
        self.location.as_ref().map(|loc| loc.path.as_path())
    }

    /// The diffusion encoding file, if the variant requires one.
    pub fn encoding_path(&self) -> Option<&Path> {
        self.encoding.as_deref()
    }

    /// The diffusion encoding of this image.
    pub fn encoding(&self) -> Result<BFile> {
        match &self.encoding {
            Some(path) => BFile::new(path.clone()),
            None => Err(MrtrixError::MissingCompanionFile(
                replace_ext(&self.primary, self.ext(), ENCODING_EXT).unwrap_or_default(),
            )),
        }
    }

    /// The JSON side car, for NIfTI variants which require one.
    pub fn side_car_path(&self) -> Option<&Path> {
        self.side_car.as_deref()
    }

    /// Read the contents of the JSON side car.
    pub fn read_side_car(&self) -> Result<String> {
        match &self.side_car {
            Some(path) => Ok(fs::read_to_string(path)?),
            None => Err(MrtrixError::FormatMismatch(format!(
                "{} images have no side car",
                self.variant
            ))),
        }
    }

    /// Read the MRtrix header of this image, decompressing it if needed.
    pub fn header(&self) -> Result<MrtrixHeader> {
        if !self.variant.base().is_mrtrix() {
            return Err(MrtrixError::FormatMismatch(format!(
                "{} images have no MRtrix header",
                self.variant
            )));
        }
        MrtrixHeader::from_file_with_options(&self.primary, &self.options)
    }

    /// Decompress a `.mif.gz` image into `dest_dir`, returning the resulting
    /// `.mif` image. The encoding file, if any, is copied along.
    pub fn decompress<P: AsRef<Path>>(&self, dest_dir: P) -> Result<ImageFileSet> {
        if self.variant.base() != BaseFormat::ImageFormatGz {
            return Err(MrtrixError::FormatMismatch(format!(
                "{} images are not gzip archives",
                self.variant
            )));
        }
        let mif = dest_dir.as_ref().join(file_name_with_ext(&self.primary, self.ext(), ".mif"));
        let mut decoder = GzDecoder::new(BufReader::new(File::open(&self.primary)?));
        let mut out = File::create(&mif)?;
        let _ = io::copy(&mut decoder, &mut out)?;

        let mut paths = vec![mif];
        if let Some(b) = &self.encoding {
            let dest = dest_dir.as_ref().join(file_name_with_ext(&self.primary, self.ext(), ENCODING_EXT));
            if is_same_file(b, &dest) {
                log::debug!("encoding {} is already in place", dest.display());
            } else {
                let _ = fs::copy(b, &dest)?;
            }
            paths.push(dest);
        }
        log::debug!("decompressed {} into {}", self.primary.display(), dest_dir.as_ref().display());
        let variant = FormatVariant::new(BaseFormat::ImageFormat, self.variant.requires_encoding());
        ImageFileSet::new_with_options(variant, paths, &self.options)
    }
}

impl PartialEq for ImageFileSet {
    fn eq(&self, other: &Self) -> bool {
        self.variant == other.variant && self.paths == other.paths
    }
}

impl Eq for ImageFileSet {}

impl Hash for ImageFileSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.variant.hash(state);
        self.paths.hash(state);
    }
}

fn select_primary(paths: &BTreeSet<PathBuf>, ext: &str) -> Result<PathBuf> {
    let mut candidates = paths.iter().filter(|p| has_ext(p, ext));
    match (candidates.next(), candidates.next()) {
        (Some(p), None) => Ok(p.clone()),
        (None, _) => Err(MrtrixError::FormatMismatch(format!(
            "no file with extension {} among {:?}",
            ext, paths
        ))),
        (Some(_), Some(_)) => Err(MrtrixError::FormatMismatch(format!(
            "more than one file with extension {} among {:?}",
            ext, paths
        ))),
    }
}

/// Find the companion of `primary` with extension `companion_ext`, either
/// among `paths` or next to `primary` on disk, adding it to `paths`.
fn find_companion(
    paths: &mut BTreeSet<PathBuf>,
    primary: &Path,
    primary_ext: &str,
    companion_ext: &str,
) -> Result<PathBuf> {
    let expected = replace_ext(primary, primary_ext, companion_ext)
        .ok_or_else(|| MrtrixError::FormatMismatch(format!("{} has no stem", primary.display())))?;
    let given: Vec<&PathBuf> = paths.iter().filter(|p| has_ext(p, companion_ext)).collect();
    match given.as_slice() {
        [] => {}
        [p] if **p == expected => return Ok(expected),
        [p] => {
            return Err(MrtrixError::FormatMismatch(format!(
                "{} is not adjacent to {}",
                p.display(),
                primary.display()
            )))
        }
        _ => {
            return Err(MrtrixError::FormatMismatch(format!(
                "more than one {} file given for {}",
                companion_ext,
                primary.display()
            )))
        }
    }
    if !expected.is_file() {
        return Err(MrtrixError::MissingCompanionFile(expected));
    }
    log::debug!("found companion file {}", expected.display());
    let _ = paths.insert(expected.clone());
    Ok(expected)
}

/// Whether both paths exist and lead to the same file.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn file_name_with_ext(path: &Path, old_ext: &str, new_ext: &str) -> PathBuf {
    replace_ext(path, old_ext, new_ext)
        .and_then(|p| p.file_name().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(format!("image{}", new_ext)))
}

/// Check the gzip signature, then validate the decompressed stream as a
/// single-file MRtrix image.
fn check_gzipped_image(path: &Path, options: &HeaderOptions) -> Result<()> {
    let mut file = BufReader::new(File::open(path)?);
    check_magic(&mut file, GZIP_MAGIC)?;
    let header = MrtrixHeader::from_file_with_options(path, options)?;
    let inner = replace_ext(path, ".mif.gz", ".mif").unwrap_or_else(|| path.to_path_buf());
    let loc = resolve_entry(header.file()?, &inner, options)?;
    if !loc.is_self {
        return Err(MrtrixError::FormatMismatch(format!(
            "archive {} refers to an external data file ({})",
            path.display(),
            loc.path.display()
        )));
    }
    Ok(())
}

/// Check the header size and magic code of a single-file NIfTI-1 image,
/// gzipped or not.
fn check_nifti1(path: &Path) -> Result<()> {
    let mut source = open_maybe_gz(path)?;
    let mut hdr = [0u8; NIFTI1_HEADER_SIZE as usize];
    source.read_exact(&mut hdr).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => MrtrixError::FormatMismatch(format!(
            "{} is too short for a NIfTI-1 header",
            path.display()
        )),
        _ => MrtrixError::from(e),
    })?;

    let sizeof_le = ByteOrdered::le(&hdr[..4]).read_i32()?;
    let sizeof_be = ByteOrdered::be(&hdr[..4]).read_i32()?;
    if sizeof_le != NIFTI1_HEADER_SIZE && sizeof_be != NIFTI1_HEADER_SIZE {
        return Err(MrtrixError::FormatMismatch(format!(
            "{} does not start with a NIfTI-1 header",
            path.display()
        )));
    }
    check_magic(&hdr[NIFTI1_MAGIC_OFFSET..], MAGIC_CODE_NIP1)
}
