//! An application for reading MRtrix image and track meta-data.

use std::env;
use std::path::Path;

use mrtrix::{HeaderOptions, ImageFileSet, MrtrixHeader, Tracks};

fn main() {
    let mut args = env::args().skip(1);
    let filename = args.next().expect("Path to MRtrix file is required");
    let path = Path::new(&filename);

    if path.extension().map_or(false, |ext| ext == "tck") {
        let tracks = Tracks::from_file(path).expect("Failed to read track file");
        let header = tracks.header().expect("Failed to read track file");
        print_header(&header);
        return;
    }

    let image = ImageFileSet::from_path(path).expect("Failed to read image");
    println!("format: {} ({})", image.variant(), image.variant().mime_type());
    for p in image.paths() {
        println!("  {}", p.display());
    }
    if let Ok(header) = image.header() {
        print_header(&header);
        if let Ok(loc) = header.data_location(image.header_path(), &HeaderOptions::default()) {
            println!("data: {} at byte {}", loc.path.display(), loc.offset);
        }
    }
}

fn print_header(header: &MrtrixHeader) {
    for (key, value) in header.iter() {
        for line in value.lines() {
            println!("{}: {}", key, line);
        }
    }
    if let Ok(dt) = header.datatype() {
        println!("{:?}, {:?}", dt.kind(), dt.endianness());
    }
}
