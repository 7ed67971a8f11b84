#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate huffpack;
use huffpack::encoding::{compress_with, EncodeOptions};

fuzz_target!(|data: &[u8]| {
    for checksum in [false, true] {
        let encoded = compress_with(data, EncodeOptions { checksum }).unwrap();
        let decoded = huffpack::decode(&encoded).unwrap();
        assert_eq!(data, &decoded);
    }
});
