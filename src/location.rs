//! Resolution of the `file` entry of an MRtrix header into the location of
//! the voxel data.
//!
//! The entry is either `.`, meaning the data follows the header in the same
//! file, or the path of a separate data file. Either may be followed by the
//! byte offset of the data: `file: . 328`, `file: scan.dat`.

use std::path::{Component, Path, PathBuf};

use crate::error::{MrtrixError, Result};
use crate::header::{HeaderOptions, MrtrixHeader};

/// Where the voxel data of an image is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataLocation {
    /// The file holding the data.
    pub path: PathBuf,
    /// Byte offset of the first voxel in `path`.
    pub offset: u64,
    /// Whether `path` is the header file itself.
    pub is_self: bool,
}

/// Resolve the data location of `header`, read from the file at `header_path`.
///
/// Data file paths are taken relative to the directory of the header file.
/// Absolute paths, and relative paths with `..` components, are refused
/// unless `options` allow them.
///
/// # Errors
///
/// - `MrtrixError::MissingRequiredMetadata` if there is no `file` entry.
/// - `MrtrixError::InvalidFileEntry` if the entry is not text, is empty, or
///   has more than two tokens.
/// - `MrtrixError::MalformedOffset` if the offset is not a non-negative integer.
/// - `MrtrixError::UntrustedDataPath` for refused absolute or `..` paths.
pub fn resolve<P: AsRef<Path>>(
    header: &MrtrixHeader,
    header_path: P,
    options: &HeaderOptions,
) -> Result<DataLocation> {
    resolve_entry(header.file()?, header_path.as_ref(), options)
}

/// Resolve a raw `file` entry for the header at `header_path`.
pub fn resolve_entry(entry: &str, header_path: &Path, options: &HeaderOptions) -> Result<DataLocation> {
    let mut tokens = entry.split_whitespace();
    let target = tokens
        .next()
        .ok_or_else(|| MrtrixError::InvalidFileEntry(entry.to_owned()))?;
    let offset = match tokens.next() {
        Some(token) => token
            .parse::<u64>()
            .map_err(|_| MrtrixError::MalformedOffset(token.to_owned()))?,
        None => 0,
    };
    if tokens.next().is_some() {
        return Err(MrtrixError::InvalidFileEntry(entry.to_owned()));
    }

    if target == "." {
        return Ok(DataLocation {
            path: header_path.to_path_buf(),
            offset,
            is_self: true,
        });
    }

    let target = Path::new(target);
    if target.is_absolute() && !options.allows_absolute_paths() {
        return Err(MrtrixError::UntrustedDataPath(target.to_path_buf()));
    }
    if !options.allows_parent_dirs() && target.components().any(|c| c == Component::ParentDir) {
        return Err(MrtrixError::UntrustedDataPath(target.to_path_buf()));
    }
    let path = match header_path.parent() {
        Some(dir) => dir.join(target),
        None => target.to_path_buf(),
    };
    let is_self = path == header_path;
    Ok(DataLocation {
        path,
        offset,
        is_self,
    })
}

#[cfg(test)]
mod tests {
    use super::{resolve, resolve_entry, DataLocation};
    use crate::error::MrtrixError;
    use crate::header::{HeaderOptions, MrtrixHeader};
    use crate::value::Value;
    use std::path::{Path, PathBuf};

    fn opts() -> HeaderOptions {
        HeaderOptions::default()
    }

    #[test]
    fn self_reference() {
        let hdr = Path::new("/data/sub-01/dwi.mif");
        let loc = resolve_entry(".", hdr, &opts()).unwrap();
        assert_eq!(
            loc,
            DataLocation {
                path: hdr.to_path_buf(),
                offset: 0,
                is_self: true,
            }
        );
        let loc = resolve_entry(". 328", hdr, &opts()).unwrap();
        assert_eq!(loc.offset, 328);
        assert!(loc.is_self);
    }

    #[test]
    fn sibling_and_nested_data_files() {
        let hdr = Path::new("/data/scan.mih");
        let loc = resolve_entry("scan.dat", hdr, &opts()).unwrap();
        assert_eq!(loc.path, PathBuf::from("/data/scan.dat"));
        assert_eq!(loc.offset, 0);
        assert!(!loc.is_self);

        let loc = resolve_entry("sub/data.dat 64", hdr, &opts()).unwrap();
        assert_eq!(loc.path, PathBuf::from("/data/sub/data.dat"));
        assert_eq!(loc.offset, 64);
    }

    #[test]
    fn bare_header_name() {
        let loc = resolve_entry("scan.dat", Path::new("scan.mih"), &opts()).unwrap();
        assert_eq!(loc.path, PathBuf::from("scan.dat"));
    }

    #[test]
    fn naming_itself_is_self() {
        let loc = resolve_entry("dwi.mif 128", Path::new("/data/dwi.mif"), &opts()).unwrap();
        assert!(loc.is_self);
    }

    #[test]
    fn absolute_paths_need_permission() {
        let hdr = Path::new("/data/scan.mih");
        match resolve_entry("/elsewhere/scan.dat", hdr, &opts()) {
            Err(MrtrixError::UntrustedDataPath(p)) => assert_eq!(p, PathBuf::from("/elsewhere/scan.dat")),
            other => panic!("unexpected result {:?}", other),
        }
        let options = HeaderOptions::new().allow_absolute_paths(true);
        let loc = resolve_entry("/elsewhere/scan.dat", hdr, &options).unwrap();
        assert_eq!(loc.path, PathBuf::from("/elsewhere/scan.dat"));
    }

    #[test]
    fn parent_dirs_need_permission() {
        let hdr = Path::new("/data/sub-01/scan.mih");
        for entry in &["../../secret.dat", "sub/../../scan.dat 16"] {
            match resolve_entry(entry, hdr, &opts()) {
                Err(MrtrixError::UntrustedDataPath(_)) => {}
                other => panic!("unexpected result {:?}", other),
            }
        }
        // absolute paths stay refused on their own
        let options = HeaderOptions::new().allow_parent_dirs(true);
        assert!(resolve_entry("/data/scan.dat", hdr, &options).is_err());

        let loc = resolve_entry("../scan.dat 16", hdr, &options).unwrap();
        assert_eq!(loc.path, PathBuf::from("/data/sub-01/../scan.dat"));
        assert_eq!(loc.offset, 16);
    }

    #[test]
    fn bad_entries() {
        let hdr = Path::new("scan.mih");
        match resolve_entry("scan.dat abc", hdr, &opts()) {
            Err(MrtrixError::MalformedOffset(t)) => assert_eq!(t, "abc"),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(resolve_entry(". -4", hdr, &opts()).is_err());
        assert!(resolve_entry("a.dat 1 2", hdr, &opts()).is_err());
        assert!(resolve_entry("   ", hdr, &opts()).is_err());
    }

    #[test]
    fn missing_file_key() {
        let hdr: MrtrixHeader = vec![("dim", Value::parse("1,1"))].into_iter().collect();
        match resolve(&hdr, "x.mif", &opts()) {
            Err(MrtrixError::MissingRequiredMetadata(key)) => assert_eq!(key, "file"),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
