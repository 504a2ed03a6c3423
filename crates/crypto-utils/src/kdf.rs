use sha3::{Digest, Keccak256};

/// Derives the 32-byte AES key from the key-store password.
///
/// The key is `Keccak256(password_bytes)`. The caller decides what the
/// password bytes are — in particular whether a trailing NUL from a C-style
/// string is included. Whatever the choice, it must be made identically when
/// saving and when loading a key-store, or decryption will fail the checksum.
pub fn password_key(password: &[u8]) -> [u8; 32] {
    let digest = Keccak256::digest(password);
    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    key
}
