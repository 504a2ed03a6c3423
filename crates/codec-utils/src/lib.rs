//! # codec-utils
//!
//! Byte-stream utilities shared by the transaction codec and the key-store:
//! leading-zero trimming, binary/hex conversion with the Ethereum JSON-RPC
//! trim conventions, and host-to-big-endian integer conversion.

pub mod bigend;
pub mod error;
pub mod hex;
pub mod trim;

pub use bigend::{u32_to_be, u64_to_be};
pub use error::CodecError;
pub use hex::{bin_to_hex, hex_to_bin, HexTrimMode};
pub use trim::{trim_left, TrimMode};

/// Upper bound on any variable-length payload handled by the library
/// (RLP fields, key-store containers). Far above any real transaction or
/// key-store, low enough to reject corrupt length fields early.
pub const REASONABLE_MAX_LEN: usize = 8192;
