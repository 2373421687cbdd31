use pretty_assertions::assert_eq;

use byteordered::{ByteOrdered, Endianness};
use mrtrix::tracks::read_tracks_header;
use mrtrix::{writer, HeaderOptions, MrtrixError, MrtrixHeader, ScalarKind, Tracks, Value};
use std::fs;
use std::path::Path;

mod util;

use util::get_temporary_dir;

#[test]
fn tracks_file() {
    const FILE_NAME: &str = "resources/tracks.tck";
    let tracks = Tracks::from_file(FILE_NAME).unwrap();
    assert_eq!(tracks.path(), Path::new(FILE_NAME));

    let h = tracks.header().unwrap();
    let dt = h.datatype().unwrap();
    assert_eq!(dt.kind(), ScalarKind::Float32);
    assert_eq!(dt.endianness(), Endianness::Big);
    assert_eq!(h.get("count").and_then(Value::as_scalar).and_then(|s| s.as_i64()), Some(1));
    assert_eq!(
        h.get("timestamp").and_then(Value::as_scalar).and_then(|s| s.as_f64()),
        Some(1_700_000_000.5)
    );

    let loc = tracks.data_location().unwrap();
    assert!(loc.is_self);
    let bytes = fs::read(FILE_NAME).unwrap();
    let mut data = ByteOrdered::be(&bytes[loc.offset as usize..]);
    let first: Vec<f32> = (0..6).map(|_| data.read_f32().unwrap()).collect();
    assert_eq!(first, vec![0., 0., 0., 1., 1., 1.]);
    assert!(data.read_f32().unwrap().is_nan());
}

#[test]
fn image_is_not_tracks() {
    match Tracks::from_file("resources/minimal.mif") {
        Err(MrtrixError::MagicNumberMismatch { expected, .. }) => {
            assert_eq!(expected, b"mrtrix tracks\n".to_vec())
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn tracks_are_not_image() {
    match MrtrixHeader::from_file("resources/tracks.tck") {
        Err(MrtrixError::MagicNumberMismatch { .. }) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn write_then_read_tracks() {
    let dir = get_temporary_dir();
    let path = dir.join("out.tck");
    let header = MrtrixHeader::from_entries(vec![
        ("datatype", Value::parse("Float32LE")),
        ("count", Value::parse("0")),
    ]);
    writer::write_tracks(&path, &header, &[]).unwrap();

    let bytes = fs::read(&path).unwrap();
    let read = read_tracks_header(&bytes[..], &HeaderOptions::default()).unwrap();
    assert_eq!(read.get("count"), header.get("count"));
    let loc = read.data_location(&path, &HeaderOptions::default()).unwrap();
    assert_eq!(loc.offset as usize, bytes.len());
}
