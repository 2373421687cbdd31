#![no_main]
use libfuzzer_sys::fuzz_target;
use mrtrix::{HeaderOptions, MrtrixHeader};

fuzz_target!(|data: &[u8]| {
    let options = HeaderOptions::new().lenient_end(true);
    if let Ok(header) = MrtrixHeader::from_reader_with_options(data, &options) {
        let _ = header.dims();
        let _ = header.vox_sizes();
        let _ = header.datatype();
        let _ = header.transform();
        let _ = header.data_location("fuzz.mif", &HeaderOptions::default());
    }
});
