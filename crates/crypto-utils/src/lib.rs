//! # crypto-utils
//!
//! Key-store encryption primitives and secure random generation for the
//! device wallet: AES-256-CBC with library padding disabled, Keccak-256
//! password-to-key derivation, and the OS random source.

pub mod cipher;
pub mod error;
pub mod kdf;
pub mod random;

pub use error::CryptoError;
