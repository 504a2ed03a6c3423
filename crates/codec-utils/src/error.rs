use thiserror::Error;

/// Byte/hex conversion errors.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid hex character {character:?} at position {position}")]
    InvalidHexCharacter { character: char, position: usize },
}
