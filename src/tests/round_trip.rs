use super::{random_data, skewed_data};
use crate::encoding::{ContainerEncoder, EncodeOptions};
use crate::{decode, encode, Container};
use std::vec::Vec;

#[test]
fn empty_input() {
    let encoded = encode(&[]).unwrap();
    assert_eq!(encoded.len(), 7);
    assert_eq!(&encoded[..4], b"HHUF");
    assert_eq!(decode(&encoded).unwrap(), Vec::<u8>::new());
}

#[test]
fn single_byte() {
    let encoder = ContainerEncoder::with_options(EncodeOptions { checksum: false });
    let encoded = encoder.encode(b"A").unwrap().to_bytes();
    // header (7) + tree of two leaves (19 bits -> 3 bytes) + one payload byte
    assert_eq!(encoded.len(), 11);
    assert_eq!(*encoded.last().unwrap(), 0);
    assert_eq!(decode(&encoded).unwrap(), b"A");
}

#[test]
fn single_distinct_symbol() {
    let data = [b'z'; 1000];
    let container = ContainerEncoder::new().encode(&data).unwrap();
    // one bit per symbol, all zero
    assert_eq!(container.payload(), &[0u8; 125][..]);
    let tree = container.header().tree.as_ref().unwrap();
    assert_eq!(tree.leaf_count(), 2);
    assert_eq!(container.decode().unwrap(), data);
}

#[test]
fn known_payload() {
    let encoder = ContainerEncoder::with_options(EncodeOptions { checksum: false });
    let container = encoder.encode(b"aaaabbbccd").unwrap();
    assert_eq!(container.payload().len(), 3);
    assert_eq!(container.decode().unwrap(), b"aaaabbbccd");
}

#[test]
fn random_inputs() {
    for (seed, len) in [(1, 1), (2, 2), (3, 17), (4, 1000), (5, 65_536), (6, 100_000)] {
        for alphabet in [1, 2, 3, 16, 256] {
            let data = random_data(seed, len, alphabet);
            let encoded = encode(&data).unwrap();
            assert_eq!(decode(&encoded).unwrap(), data, "seed {seed} len {len}");
        }
    }
}

#[test]
fn skewed_inputs_compress() {
    let data = skewed_data(42, 50_000);
    let encoded = encode(&data).unwrap();
    // about two bits per symbol
    assert!(encoded.len() < data.len() / 3);
    assert_eq!(decode(&encoded).unwrap(), data);
}

#[test]
fn all_byte_values() {
    let data: Vec<u8> = (0..=255u8).rev().cycle().take(10_000).collect();
    let encoded = encode(&data).unwrap();
    assert_eq!(decode(&encoded).unwrap(), data);
}

#[test]
fn output_is_deterministic() {
    let data = skewed_data(7, 4096);
    let first = encode(&data).unwrap();
    for _ in 0..5 {
        assert_eq!(encode(&data).unwrap(), first);
    }
}

#[test]
fn length_field_width_follows_length() {
    for (len, width) in [(255usize, 1usize), (256, 2), (65_535, 2), (65_536, 4)] {
        let data = random_data(len as u64, len, 4);
        let container = ContainerEncoder::new().encode(&data).unwrap();
        assert_eq!(container.header().descriptor.length_bytes(), width);
        let parsed = Container::parse(&container.to_bytes()).unwrap();
        assert_eq!(parsed.original_len(), len as u64);
    }
}

#[test]
fn shared_encoder_across_threads() {
    let encoder = ContainerEncoder::new();
    let inputs: Vec<Vec<u8>> = (0..8).map(|seed| skewed_data(seed, 10_000)).collect();

    let outputs: Vec<Vec<u8>> = std::thread::scope(|s| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|data| {
                let encoder = &encoder;
                s.spawn(move || encoder.encode(data).unwrap().to_bytes())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (data, encoded) in inputs.iter().zip(&outputs) {
        assert_eq!(encoded, &encode(data).unwrap());
        assert_eq!(&decode(encoded).unwrap(), data);
    }
}
