use chain_eth::EthError;
use codec_utils::CodecError;
use crypto_utils::CryptoError;
use thiserror::Error;

/// Wallet-level errors.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("missing transaction field: {0}")]
    MissingField(&'static str),

    #[error("no account key loaded")]
    NoAccount,

    #[error("rpc transport failure: {0}")]
    Transport(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("malformed rpc response: {0}")]
    JsonParse(String),

    #[error("key-store checksum mismatch (wrong password or corrupt file)")]
    BadChecksum,

    #[error("malformed key-store container: {0}")]
    Keystore(String),

    #[error(transparent)]
    Eth(#[from] EthError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("key-store i/o failure: {0}")]
    Io(#[from] std::io::Error),
}
