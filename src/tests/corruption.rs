use super::{random_data, skewed_data};
use crate::decoding::errors::{CorruptContainerError, DecodeError};
use crate::encoding::{compress_with, EncodeOptions};
use crate::{decode, encode};

const NO_CHECKSUM: EncodeOptions = EncodeOptions { checksum: false };

#[test]
fn bad_magic_is_unsupported() {
    let mut encoded = encode(b"hello").unwrap();
    encoded[0] = b'X';
    let err = decode(&encoded).unwrap_err();
    assert!(matches!(err, DecodeError::BadMagicNumber(_)));
    assert!(err.is_unsupported());

    let err = decode(b"\x28\xb5\x2f\xfd\x00\x00\x00").unwrap_err();
    assert_eq!(err, DecodeError::BadMagicNumber(0xFD2F_B528));
}

#[test]
fn unknown_version_is_unsupported() {
    let mut encoded = encode(b"hello").unwrap();
    encoded[4] = 2;
    let err = decode(&encoded).unwrap_err();
    assert_eq!(err, DecodeError::UnsupportedVersion { got: 2 });
    assert!(err.is_unsupported());
}

#[test]
fn reserved_descriptor_bits() {
    let mut encoded = encode(b"hello").unwrap();
    encoded[5] |= 0b1000_0000;
    let err = decode(&encoded).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::CorruptContainer(CorruptContainerError::ReservedBitsSet { .. })
    ));
    assert!(!err.is_unsupported());
}

#[test]
fn every_truncation_fails() {
    let data = skewed_data(3, 300);
    let encoded = compress_with(&data, NO_CHECKSUM).unwrap();
    for len in 0..encoded.len() {
        let err = decode(&encoded[..len]).unwrap_err();
        assert!(
            matches!(err, DecodeError::CorruptContainer(_)),
            "prefix of {len} bytes: {err}"
        );
    }
    assert_eq!(decode(&encoded).unwrap(), data);
}

#[test]
fn truncation_with_checksum_is_corrupt() {
    let data = random_data(9, 500, 40);
    let encoded = encode(&data).unwrap();
    for len in 0..encoded.len() {
        assert!(
            matches!(decode(&encoded[..len]), Err(DecodeError::CorruptContainer(_))),
            "prefix of {len} bytes"
        );
    }
}

#[test]
fn bit_flips_never_panic() {
    let data = skewed_data(11, 200);
    for options in [NO_CHECKSUM, EncodeOptions::default()] {
        let encoded = compress_with(&data, options).unwrap();
        for bit in 0..encoded.len() * 8 {
            let mut flipped = encoded.clone();
            flipped[bit / 8] ^= 1 << (bit % 8);
            let _ = decode(&flipped);
        }
    }
}

#[cfg(feature = "hash")]
#[test]
fn payload_flips_are_caught_by_the_checksum() {
    let data = random_data(13, 64, 8);
    let encoded = encode(&data).unwrap();
    // flipping a bit in the last payload byte either breaks the bitstream or the content
    let last_payload_byte = encoded.len() - 5;
    for bit in 0..8 {
        let mut flipped = encoded.clone();
        flipped[last_payload_byte] ^= 1 << bit;
        assert!(decode(&flipped).is_err());
    }
}

#[test]
fn garbage_after_header_never_panics() {
    let header = &encode(b"abc").unwrap()[..7];
    for seed in 0..200 {
        let mut input = header.to_vec();
        input.extend(random_data(seed, (seed % 40) as usize, 256));
        let _ = decode(&input);
    }
}
