//! Ethereum legacy-transaction support for the device wallet.
//!
//! This crate provides:
//! - The RLP field codec used for the nine-field legacy transaction,
//!   including the backward list-header mode that avoids materializing a
//!   nested structure
//! - Secret-key validation, key pair and address derivation
//! - The two-pass EIP-155 transaction encoding and signing algorithm
//! - Call-data construction for read-only contract calls

pub mod abi;
pub mod error;
pub mod keypair;
pub mod rlp;
pub mod transaction;

pub use error::{EthError, RlpError};
pub use keypair::{check_secret_key, Keypair};
pub use rlp::RlpEncoder;
pub use transaction::{sign_transaction, ChainParams, LegacyTx, Quantity, SignedTx};
