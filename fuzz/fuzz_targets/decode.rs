#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate huffpack;

fuzz_target!(|data: &[u8]| {
    // arbitrary input may be rejected but must never panic
    _ = huffpack::decode(data);
});
