use pretty_assertions::{assert_eq, assert_ne};

use mrtrix::{writer, DataType, HeaderOptions, MrtrixError, MrtrixHeader, ScalarKind, Value};
use std::path::Path;

mod util;

use util::minimal_header_gt;

#[test]
fn minimal_mif() {
    const FILE_NAME: &str = "resources/minimal.mif";
    let h = MrtrixHeader::from_file(FILE_NAME).unwrap();

    assert_eq!(h, minimal_header_gt());
    assert_eq!(h.dims().unwrap(), vec![2, 2, 2]);
    assert_eq!(h.vox_sizes().unwrap(), vec![2.0, 2.0, 2.0]);
    assert_eq!(h.datatype().unwrap().kind(), ScalarKind::UInt8);
    assert_eq!(
        h.transform().unwrap(),
        vec![
            vec![1., 0., 0., -10.5],
            vec![0., 1., 0., -20.],
            vec![0., 0., 1., 5.25],
        ]
    );
}

#[test]
fn minimal_mif_gz() {
    const FILE_NAME: &str = "resources/minimal.mif.gz";
    let h = MrtrixHeader::from_file(FILE_NAME).unwrap();

    assert_eq!(h, minimal_header_gt());
}

#[test]
fn header_only_image() {
    const FILE_NAME: &str = "resources/scan.mih";
    let h = MrtrixHeader::from_file(FILE_NAME).unwrap();

    assert_eq!(h.dims().unwrap(), vec![4, 4]);
    assert_eq!(h.vox_sizes().unwrap(), vec![1.0, 1.0]);
    assert_eq!(h.file().unwrap(), "scan.dat");

    let dt: DataType = h.datatype().unwrap();
    assert_eq!(dt.kind(), ScalarKind::Float32);
    assert!(dt.has_explicit_endianness());
    assert_eq!(dt.data_len(&h.dims().unwrap()), Some(64));
    let data_len = std::fs::metadata("resources/scan.dat").unwrap().len();
    assert_eq!(data_len, 64);
}

#[test]
fn oversized_dimensions_have_no_data_length() {
    let src: &[u8] = b"mrtrix image\n\
dim: 2147483647,2147483647,2\n\
datatype: Float32LE\n\
END\n";
    let h = MrtrixHeader::from_reader(src).unwrap();
    let dims = h.dims().unwrap();
    assert_eq!(h.datatype().unwrap().data_len(&dims), None);

    let src: &[u8] = b"mrtrix image\ndim: 4,-1\nEND\n";
    match MrtrixHeader::from_reader(src).unwrap().dims() {
        Err(MrtrixError::InvalidMetadata { key: "dim", .. }) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn comments_and_comma_lists() {
    let h = MrtrixHeader::from_file("resources/minimal.mif").unwrap();

    let comments = h.get("comments").unwrap();
    assert!(comments.is_multi_line());
    let lines: Vec<String> = comments.lines().iter().map(|v| v.to_string()).collect();
    assert_eq!(lines, vec!["first", "second"]);

    let dim = h.get("dim").unwrap();
    assert!(!dim.is_multi_line());
    assert_eq!(dim.elements().len(), 3);
}

#[test]
fn malformed_line_in_file() {
    match MrtrixHeader::from_file("resources/malformed.mif") {
        Err(MrtrixError::MalformedHeaderLine { line, content }) => {
            assert_eq!(line, 3);
            assert_eq!(content, "foo bar");
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn wrong_magic_in_file() {
    match MrtrixHeader::from_file("resources/bad_magic.mif") {
        Err(e @ MrtrixError::MagicNumberMismatch { .. }) => {
            assert!(e.is_format_mismatch());
            if let MrtrixError::MagicNumberMismatch { expected, actual } = e {
                assert_eq!(expected, b"mrtrix image\n".to_vec());
                assert_eq!(actual, b"mrtrix imagf\n".to_vec());
            }
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn metadata_round_trip() {
    let h = MrtrixHeader::from_file("resources/minimal.mif").unwrap();

    let mut text = b"mrtrix image\n".to_vec();
    writer::write_metadata(&mut text, &h).unwrap();
    text.extend_from_slice(b"file: . 189\nEND\n");
    let read = MrtrixHeader::from_reader(&text[..]).unwrap();

    assert_eq!(read, h);
    for (key, value) in h.iter() {
        assert_eq!(read.get(key).map(Value::is_multi_line), Some(value.is_multi_line()));
    }
}

#[test]
fn comma_list_and_repeated_key_hold_the_same_values() {
    let one_line: &[u8] = b"mrtrix image\ncomments: first,second\nEND\n";
    let two_lines: &[u8] = b"mrtrix image\ncomments: first\ncomments: second\nEND\n";
    let a = MrtrixHeader::from_reader(one_line).unwrap();
    let b = MrtrixHeader::from_reader(two_lines).unwrap();

    let (a, b) = (a.get("comments").unwrap(), b.get("comments").unwrap());
    assert_ne!(a, b);
    assert_eq!(a.elements(), b.elements());
    assert!(!a.is_multi_line());
    assert!(b.is_multi_line());
}

#[test]
fn truncated_header() {
    match MrtrixHeader::from_file("resources/truncated.mif") {
        Err(MrtrixError::MissingEndMarker) => {}
        other => panic!("unexpected result {:?}", other),
    }

    let options = HeaderOptions::new().lenient_end(true);
    let h = MrtrixHeader::from_file_with_options("resources/truncated.mif", &options).unwrap();
    assert_eq!(h.dims().unwrap(), vec![2, 2]);
    assert!(!h.contains_key("file"));
}

#[test]
fn single_file_location() {
    const FILE_NAME: &str = "resources/minimal.mif";
    let h = MrtrixHeader::from_file(FILE_NAME).unwrap();
    let loc = h.data_location(FILE_NAME, &HeaderOptions::default()).unwrap();

    assert!(loc.is_self);
    assert_eq!(loc.path, Path::new(FILE_NAME));
    assert_eq!(loc.offset, 189);

    let bytes = std::fs::read(FILE_NAME).unwrap();
    assert_eq!(&bytes[loc.offset as usize..], &util::MINIMAL_DATA[..]);
}

#[test]
fn relative_data_file_location() {
    const FILE_NAME: &str = "resources/nested.mih";
    let h = MrtrixHeader::from_file(FILE_NAME).unwrap();
    let loc = h.data_location(FILE_NAME, &HeaderOptions::default()).unwrap();

    assert!(!loc.is_self);
    assert_eq!(loc.path, Path::new("resources").join("sub").join("data.dat"));
    assert_eq!(loc.offset, 4);

    let bytes = std::fs::read(&loc.path).unwrap();
    assert_eq!(&bytes[loc.offset as usize..], &[7, 9]);
}

#[test]
fn absolute_data_file_is_refused() {
    let h = MrtrixHeader::from_entries(vec![("file", Value::parse("/etc/passwd"))]);
    match h.data_location("resources/x.mih", &HeaderOptions::default()) {
        Err(MrtrixError::UntrustedDataPath(p)) => assert_eq!(p, Path::new("/etc/passwd")),
        other => panic!("unexpected result {:?}", other),
    }

    let options = HeaderOptions::new().allow_absolute_paths(true);
    let loc = h.data_location("resources/x.mih", &options).unwrap();
    assert_eq!(loc.path, Path::new("/etc/passwd"));
    assert_eq!(loc.offset, 0);
}

#[test]
fn parent_dir_data_file_is_refused() {
    let h = MrtrixHeader::from_entries(vec![("file", Value::parse("../../secret.dat"))]);
    match h.data_location("resources/sub/x.mih", &HeaderOptions::default()) {
        Err(MrtrixError::UntrustedDataPath(p)) => assert_eq!(p, Path::new("../../secret.dat")),
        other => panic!("unexpected result {:?}", other),
    }

    let options = HeaderOptions::new().allow_parent_dirs(true);
    let loc = h.data_location("resources/sub/x.mih", &options).unwrap();
    assert_eq!(loc.path, Path::new("resources/sub/../../secret.dat"));
    assert!(!loc.is_self);
}
