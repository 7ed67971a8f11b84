//! Values and interfaces shared between the encoding side
//! and the decoding side.

// --- CONTAINER ---
/// This magic number is included at the start of every container ("HHUF" in file order)
pub const MAGIC_NUM: u32 = 0x4655_4848;
/// The only container version this implementation reads and writes.
pub const VERSION: u8 = 1;
/// magic number + version + descriptor
pub const FIXED_HEADER_SIZE: usize = 4 + 1 + 1;
/// Size of the optional XXH64-derived content checksum at the end of a container
pub const CHECKSUM_SIZE: usize = 4;

// --- TREES ---
/// Number of distinct symbols a byte oriented coder can see.
pub const MAX_SYMBOLS: usize = 256;
/// Codes are kept in a `u128`, so no leaf may sit deeper than this.
///
/// Trees built from in-memory frequencies never get close: the weight of a
/// subtree grows at least as fast as the fibonacci sequence with its depth.
pub const MAX_CODE_LEN: u8 = 128;

/// Low 32 bits of the XXH64 (seed 0) of the original content
#[cfg(feature = "hash")]
pub fn content_checksum(data: &[u8]) -> u32 {
    use core::hash::Hasher;

    let mut hasher = twox_hash::XxHash64::with_seed(0);
    hasher.write(data);
    hasher.finish() as u32
}
