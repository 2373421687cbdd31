//! Private utility module
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::bufread::GzDecoder;

use crate::error::Result;

/// Magic bytes at the start of every gzip member.
pub const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// Check whether the file name ends with `.gz`.
pub fn is_gz_file<P: AsRef<Path>>(path: P) -> bool {
    has_ext(path, ".gz")
}

/// Check whether the file name ends with the given (possibly double) extension,
/// e.g. `".mif.gz"`. The comparison is case sensitive, as MRtrix3 is.
pub fn has_ext<P: AsRef<Path>>(path: P, ext: &str) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.len() > ext.len() && name.ends_with(ext))
        .unwrap_or(false)
}

/// Replace the extension `old_ext` of the file name with `new_ext`, keeping
/// the parent directory. Returns `None` if the path does not end with `old_ext`.
pub fn replace_ext<P: AsRef<Path>>(path: P, old_ext: &str, new_ext: &str) -> Option<PathBuf> {
    let path = path.as_ref();
    if !has_ext(path, old_ext) {
        return None;
    }
    let name = path.file_name()?.to_str()?;
    let stem = &name[..name.len() - old_ext.len()];
    Some(path.with_file_name(format!("{}{}", stem, new_ext)))
}

/// Open a file for buffered reading, decoding it on the fly if it is gzip
/// compressed (judging by its file name).
pub fn open_maybe_gz<P: AsRef<Path>>(path: P) -> Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(&path)?);
    if is_gz_file(&path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::{has_ext, is_gz_file, replace_ext};
    use std::path::PathBuf;

    #[test]
    fn gz_detection() {
        assert!(is_gz_file("dwi.mif.gz"));
        assert!(is_gz_file("/tmp/a/b.nii.gz"));
        assert!(!is_gz_file("dwi.mif"));
        assert!(!is_gz_file(".gz"));
    }

    #[test]
    fn double_extensions() {
        assert!(has_ext("scan.mif.gz", ".mif.gz"));
        assert!(!has_ext("scan.mif.gz", ".mif"));
        assert!(has_ext("dir/scan.mih", ".mih"));
    }

    #[test]
    fn replace_extension() {
        assert_eq!(
            replace_ext("data/dwi.mif.gz", ".mif.gz", ".b"),
            Some(PathBuf::from("data/dwi.b"))
        );
        assert_eq!(
            replace_ext("dwi.nii", ".nii", ".json"),
            Some(PathBuf::from("dwi.json"))
        );
        assert_eq!(replace_ext("dwi.nii", ".mif", ".b"), None);
    }
}
