//! Structures and utilities used for decoding containers

pub mod bit_reader;
mod container_decoder;
pub mod errors;

pub use container_decoder::*;
