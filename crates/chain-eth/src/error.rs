use thiserror::Error;

/// RLP encoding errors.
#[derive(Debug, Error)]
pub enum RlpError {
    #[error("field length {0} exceeds the encodable maximum")]
    LengthExceedsMax(usize),

    #[error("encode buffer too small: need {needed} more bytes, {available} available")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Ethereum signing and encoding errors.
#[derive(Debug, Error)]
pub enum EthError {
    #[error("bad secret key: {0}")]
    BadKey(String),

    #[error("signing failure: {0}")]
    Signing(String),

    #[error("quantity is {0} bytes, maximum is 32")]
    QuantityTooLong(usize),

    #[error("chain id {0} does not fit the 4-byte recovery field")]
    ChainIdTooLarge(u32),

    #[error("rlp encoding failure: {0}")]
    Rlp(#[from] RlpError),

    #[error("random source failure: {0}")]
    Random(String),
}
