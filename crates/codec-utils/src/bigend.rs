use crate::trim::TrimMode;

/// Converts a host-endian `u32` to big-endian bytes, optionally dropping
/// most-significant zero bytes.
///
/// Unlike [`trim_left`](crate::trim::trim_left), the trimmed form of zero is
/// a single `0x00` byte, never empty: the callers that need a zero quantity
/// to vanish (RLP numeric fields) trim at the call site instead.
pub fn u32_to_be(from: u32, trim_mode: TrimMode) -> Vec<u8> {
    to_be_trimmed(&from.to_be_bytes(), trim_mode)
}

/// 64-bit variant of [`u32_to_be`].
pub fn u64_to_be(from: u64, trim_mode: TrimMode) -> Vec<u8> {
    to_be_trimmed(&from.to_be_bytes(), trim_mode)
}

fn to_be_trimmed(be: &[u8], trim_mode: TrimMode) -> Vec<u8> {
    match trim_mode {
        TrimMode::No => be.to_vec(),
        TrimMode::LeftTrim => {
            let first_nonzero = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
            be[first_nonzero..].to_vec()
        }
    }
}
