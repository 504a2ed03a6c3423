use rand::RngCore;
use rand_core::OsRng;

use crate::error::CryptoError;

/// Fills a fixed-size array from the OS cryptographic random source.
///
/// There is no weaker fallback: if the OS source fails, the error propagates
/// to the caller. Key generation must never degrade to a pseudo-random
/// stream.
pub fn random_bytes_fixed<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| CryptoError::Random(e.to_string()))?;
    Ok(buf)
}

/// Draws a random `u32` from the OS source (request-id seeding).
pub fn random_u32() -> Result<u32, CryptoError> {
    let bytes = random_bytes_fixed::<4>()?;
    Ok(u32::from_be_bytes(bytes))
}
