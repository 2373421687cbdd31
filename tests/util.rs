use std::path::PathBuf;

use mrtrix::{MrtrixHeader, Scalar, Value};
use tempfile::tempdir;

/// Known meta-data for the "minimal.mif" test file.
#[allow(dead_code)]
pub fn minimal_header_gt() -> MrtrixHeader {
    MrtrixHeader::from_entries(vec![
        ("dim", Value::List(vec![Scalar::Int(2); 3])),
        ("vox", Value::List(vec![Scalar::Float(2.0); 3])),
        ("layout", Value::parse("+0,+1,+2")),
        ("datatype", Value::Scalar("UInt8".into())),
        ("transform", Value::parse("1,0,0,-10.5")),
        ("transform", Value::parse("0,1,0,-20")),
        ("transform", Value::parse("0,0,1,5.25")),
        ("comments", Value::Scalar("first".into())),
        ("comments", Value::Scalar("second".into())),
        ("file", Value::Scalar(". 189".into())),
    ])
}

/// Voxel data of the "minimal.mif" test file.
#[allow(dead_code)]
pub const MINIMAL_DATA: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// A header describing a small 4-D diffusion weighted image.
#[allow(dead_code)]
pub fn dwi_header() -> MrtrixHeader {
    MrtrixHeader::from_entries(vec![
        ("dim", Value::parse("2,2,1,3")),
        ("vox", Value::parse("2.5,2.5,2.5,1")),
        ("datatype", Value::parse("Int16LE")),
    ])
}

/// A fresh directory which is kept around after the test.
#[allow(dead_code)]
pub fn get_temporary_dir() -> PathBuf {
    tempdir().unwrap().into_path()
}
