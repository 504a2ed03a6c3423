//! Device wallet for EVM chains.
//!
//! This crate ties the lower layers together into the host-facing API:
//! - [`Wallet`]: one account plus its network parameters, with setters,
//!   balance queries, and read-only contract calls
//! - [`TransactionBuilder`]: the nine-field legacy transaction, populated
//!   partly from the node (nonce, gas price), signed and submitted with
//!   receipt polling
//! - [`keystore`]: encrypted persistence of the wallet to a file
//! - [`rpc`]: the JSON-RPC wrapper layer over a pluggable synchronous
//!   transport, plus the blocking HTTP transport
//!
//! The wallet is a plain owned value; hosts that need several wallets create
//! several values. Nothing here is thread-safe and nothing needs to be: the
//! host serializes calls.

pub mod error;
pub mod http;
pub mod keystore;
pub mod rpc;
pub mod wallet;

pub use error::WalletError;
pub use http::HttpRpcClient;
pub use rpc::{JsonRpc, RpcClient};
pub use wallet::{NetworkInfo, SendOutcome, TransactionBuilder, TxStatus, Wallet};
