use std::path::Path;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use chain_eth::abi;
use chain_eth::{sign_transaction, ChainParams, Keypair, LegacyTx, Quantity};
use codec_utils::{bin_to_hex, hex_to_bin, HexTrimMode, TrimMode};

use crate::error::WalletError;
use crate::keystore::{self, KeystoreData};
use crate::rpc::{JsonRpc, RpcClient};

/// Default wait between receipt polls, matched to typical block production.
pub const MINE_INTERVAL: Duration = Duration::from_secs(3);

/// Default wall-clock budget for a pending transaction.
pub const WAIT_PENDING_TIMEOUT: Duration = Duration::from_secs(30);

/// Gas limit supplied with read-only contract calls. `eth_call` burns no gas
/// but the node still wants the fields present.
const CALL_GAS: &str = "0x1fffff";
const CALL_GAS_PRICE: &str = "0x8250de00";

const LATEST: &str = "latest";

/// Network parameters of the wallet. `chain_id` only enters signatures when
/// `eip155` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub chain_id: u32,
    pub eip155: bool,
    pub node_url: String,
}

impl Default for NetworkInfo {
    fn default() -> Self {
        Self {
            chain_id: 1,
            eip155: true,
            node_url: String::new(),
        }
    }
}

/// What became of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// Mined and the receipt reports success.
    Confirmed,
    /// Mined but the receipt reports contract-level failure. The submission
    /// itself succeeded; the caller inspects.
    Failed,
    /// Still pending when the polling budget ran out. Not an error: the
    /// transaction may yet be mined.
    TimedOut,
}

/// Result of a successful submission.
#[derive(Debug, Clone, Copy)]
pub struct SendOutcome {
    pub tx_hash: [u8; 32],
    pub status: TxStatus,
}

/// One account plus its network, bound to an RPC transport.
///
/// A plain owned value: hosts needing several wallets hold several values.
/// No internal locking; the host serializes calls.
pub struct Wallet<C: RpcClient> {
    keypair: Option<Keypair>,
    network: NetworkInfo,
    rpc: JsonRpc<C>,
    mine_interval: Duration,
    pending_timeout: Duration,
}

impl<C: RpcClient> Wallet<C> {
    /// Creates an empty wallet. EIP-155 replay protection is on by default.
    pub fn new(client: C) -> Result<Self, WalletError> {
        Ok(Self {
            keypair: None,
            network: NetworkInfo::default(),
            rpc: JsonRpc::new(client)?,
            mine_interval: MINE_INTERVAL,
            pending_timeout: WAIT_PENDING_TIMEOUT,
        })
    }

    pub fn set_node_url(&mut self, node_url: &str) {
        self.network.node_url = node_url.to_owned();
    }

    pub fn set_chain_id(&mut self, chain_id: u32) {
        self.network.chain_id = chain_id;
    }

    pub fn set_eip155(&mut self, enabled: bool) {
        self.network.eip155 = enabled;
    }

    pub fn network(&self) -> &NetworkInfo {
        &self.network
    }

    /// The JSON-RPC layer, for queries the wallet does not wrap.
    pub fn rpc(&self) -> &JsonRpc<C> {
        &self.rpc
    }

    /// Overrides the receipt-poll interval and pending budget.
    pub fn set_poll_timing(&mut self, mine_interval: Duration, pending_timeout: Duration) {
        self.mine_interval = mine_interval;
        self.pending_timeout = pending_timeout;
    }

    /// Installs a secret key; public key and address are derived from it.
    pub fn set_secret_key(&mut self, secret: &[u8; 32]) -> Result<(), WalletError> {
        self.keypair = Some(Keypair::from_secret_key(secret)?);
        Ok(())
    }

    /// Generates a fresh account key from the OS random source.
    pub fn generate_secret_key(&mut self) -> Result<(), WalletError> {
        self.keypair = Some(Keypair::generate()?);
        Ok(())
    }

    pub fn keypair(&self) -> Option<&Keypair> {
        self.keypair.as_ref()
    }

    /// The account address as a `0x`-prefixed hex string.
    pub fn address_hex(&self) -> Result<String, WalletError> {
        let keypair = self.keypair.as_ref().ok_or(WalletError::NoAccount)?;
        Ok(bin_to_hex(
            keypair.address(),
            HexTrimMode::Unformatted,
            true,
            false,
        ))
    }

    /// `eth_getBalance` of the account, in wei, as a hex quantity string.
    ///
    /// An address the chain has never seen reports zero; that is
    /// indistinguishable from a funded-then-emptied account.
    pub fn balance(&self) -> Result<String, WalletError> {
        let address = self.address_hex()?;
        self.rpc.balance(&self.network.node_url, &address, LATEST)
    }

    /// `eth_getStorageAt` on a contract, at `position`, for the latest block.
    pub fn storage_at(&self, contract: &str, position: &str) -> Result<String, WalletError> {
        self.rpc
            .storage_at(&self.network.node_url, contract, position, LATEST)
    }

    /// Calls a read-only contract function through `eth_call` and returns
    /// the raw hex return value.
    ///
    /// `func_prototype` is the canonical signature, e.g.
    /// `"readListByIndex(uint256)"` (`uint` spelled `uint256`); `params` is
    /// the ABI-encoded parameter stream. State-changing functions go through
    /// [`TransactionBuilder::send`] instead — an `eth_call` to one executes
    /// but commits nothing.
    pub fn call_contract(
        &self,
        contract_addr: &str,
        func_prototype: &str,
        params: &[u8],
    ) -> Result<String, WalletError> {
        let data = abi::call_data(func_prototype, params);
        self.rpc.call(
            &self.network.node_url,
            contract_addr,
            CALL_GAS,
            CALL_GAS_PRICE,
            &data,
        )
    }

    /// Starts building a transaction from this wallet.
    pub fn transaction<'d>(&self) -> TransactionBuilder<'_, 'd, C> {
        TransactionBuilder {
            wallet: self,
            nonce: None,
            gas_price: None,
            gas_limit: None,
            recipient: None,
            value: Quantity::zero(),
            data: &[],
        }
    }

    /// Encrypts the account and network state into a key-store file.
    pub fn save_keystore(&self, password: &[u8], path: &Path) -> Result<(), WalletError> {
        let keypair = self.keypair.as_ref().ok_or(WalletError::NoAccount)?;
        let data = KeystoreData {
            secret_key: *keypair.secret_key(),
            public_key: *keypair.public_key(),
            address: *keypair.address(),
            chain_id: self.network.chain_id,
            eip155: self.network.eip155,
            node_url: self.network.node_url.clone(),
        };
        keystore::save(&data, password, path)
    }

    /// Replaces the account and network state from a key-store file. The
    /// RPC transport is kept.
    pub fn load_keystore(&mut self, password: &[u8], path: &Path) -> Result<(), WalletError> {
        let data = keystore::load(password, path)?;
        self.keypair = Some(Keypair::from_secret_key(&data.secret_key)?);
        self.network = NetworkInfo {
            chain_id: data.chain_id,
            eip155: data.eip155,
            node_url: data.node_url.clone(),
        };
        Ok(())
    }
}

/// The nine-field legacy transaction under construction.
///
/// Setters may run in any order once the wallet has a key. `data` is
/// borrowed: the caller keeps the calldata alive until [`send`](Self::send)
/// returns.
pub struct TransactionBuilder<'w, 'd, C: RpcClient> {
    wallet: &'w Wallet<C>,
    nonce: Option<Quantity>,
    gas_price: Option<Quantity>,
    gas_limit: Option<Quantity>,
    recipient: Option<[u8; 20]>,
    value: Quantity,
    data: &'d [u8],
}

impl<'w, 'd, C: RpcClient> TransactionBuilder<'w, 'd, C> {
    /// Sets the nonce to the account's current transaction count, queried
    /// from the node. Needs the account key: the query is by address.
    pub fn set_nonce(&mut self) -> Result<(), WalletError> {
        let address = self.wallet.address_hex()?;
        let count_hex = self.wallet.rpc.transaction_count(
            &self.wallet.network.node_url,
            &address,
            LATEST,
        )?;
        self.nonce = Some(parse_quantity(&count_hex)?);
        Ok(())
    }

    /// Sets the gas price, or queries the node's current price when `None`.
    pub fn set_gas_price(&mut self, gas_price: Option<Quantity>) -> Result<(), WalletError> {
        let price = match gas_price {
            Some(price) => price,
            None => {
                let price_hex = self.wallet.rpc.gas_price(&self.wallet.network.node_url)?;
                debug!(price = %price_hex, "using gas price from the network");
                parse_quantity(&price_hex)?
            }
        };
        self.gas_price = Some(price);
        Ok(())
    }

    pub fn set_gas_limit(&mut self, gas_limit: Quantity) {
        self.gas_limit = Some(gas_limit);
    }

    pub fn set_recipient(&mut self, address: [u8; 20]) {
        self.recipient = Some(address);
    }

    /// `None` transfers nothing; a zero value encodes identically.
    pub fn set_value(&mut self, value: Option<Quantity>) {
        self.value = value.unwrap_or_default();
    }

    /// `None` sends no calldata.
    pub fn set_data(&mut self, data: Option<&'d [u8]>) {
        self.data = data.unwrap_or(&[]);
    }

    /// Signs, submits, and waits for the transaction to be mined.
    ///
    /// Submission failures are errors. A mined-but-reverted receipt and a
    /// polling timeout are *not* errors; they come back as
    /// [`TxStatus::Failed`] and [`TxStatus::TimedOut`] in the outcome.
    pub fn send(&self) -> Result<SendOutcome, WalletError> {
        let wallet = self.wallet;
        let keypair = wallet.keypair.as_ref().ok_or(WalletError::NoAccount)?;

        let tx = LegacyTx {
            nonce: self.nonce.clone().ok_or(WalletError::MissingField("nonce"))?,
            gas_price: self
                .gas_price
                .clone()
                .ok_or(WalletError::MissingField("gas_price"))?,
            gas_limit: self
                .gas_limit
                .clone()
                .ok_or(WalletError::MissingField("gas_limit"))?,
            recipient: self.recipient.ok_or(WalletError::MissingField("recipient"))?,
            value: self.value.clone(),
            data: self.data,
        };

        info!(
            to = %bin_to_hex(&tx.recipient, HexTrimMode::Unformatted, true, false),
            "submitting transaction"
        );

        let signed = sign_transaction(
            &tx,
            keypair,
            &ChainParams {
                chain_id: wallet.network.chain_id,
                eip155: wallet.network.eip155,
            },
        )?;
        let signed_hex = bin_to_hex(&signed.raw, HexTrimMode::Unformatted, true, false);

        let hash_hex = wallet
            .rpc
            .send_raw_transaction(&wallet.network.node_url, &signed_hex)?;
        let hash_bytes = hex_to_bin(&hash_hex, TrimMode::No, false)?;
        let tx_hash: [u8; 32] = hash_bytes
            .try_into()
            .map_err(|_| WalletError::JsonParse("transaction hash is not 32 bytes".into()))?;

        let mut waited = Duration::ZERO;
        let status = loop {
            thread::sleep(wallet.mine_interval);
            waited += wallet.mine_interval;

            let receipt_status = wallet
                .rpc
                .transaction_receipt_status(&wallet.network.node_url, &hash_hex)?;

            if !receipt_status.is_empty() {
                if receipt_status == "0x1" {
                    info!(tx = %hash_hex, "transaction mined");
                    break TxStatus::Confirmed;
                }
                info!(tx = %hash_hex, "transaction mined but reports failure");
                break TxStatus::Failed;
            }

            if waited >= wallet.pending_timeout {
                warn!(
                    tx = %hash_hex,
                    "gave up waiting for the pending transaction; it may still be mined"
                );
                break TxStatus::TimedOut;
            }
        };

        Ok(SendOutcome { tx_hash, status })
    }
}

/// Parses an RPC hex quantity (`"0x1"`, `"0x4a817c800"`, …) into a trimmed
/// [`Quantity`]; a zero quantity becomes the empty byte string.
fn parse_quantity(hex_quantity: &str) -> Result<Quantity, WalletError> {
    let bytes = hex_to_bin(hex_quantity, TrimMode::LeftTrim, true)?;
    Ok(Quantity::from_be_slice(&bytes)?)
}
