#![no_main]
use libfuzzer_sys::fuzz_target;
use mrtrix::encoding::parse_rows;

fuzz_target!(|data: &[u8]| {
    let _ = parse_rows(data);
});
