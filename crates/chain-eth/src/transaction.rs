use codec_utils::{trim_left, u32_to_be, TrimMode};
use sha3::{Digest, Keccak256};

use crate::error::EthError;
use crate::keypair::Keypair;
use crate::rlp::RlpEncoder;

/// Maximum width of a numeric transaction field.
pub const MAX_QUANTITY_LEN: usize = 32;

/// A recipient address is always exactly 20 bytes, never trimmed.
pub const RECIPIENT_LEN: usize = 20;

/// Largest chain id whose EIP-155 `v = 2 * chain_id + 36` still fits the
/// 4-byte recovery field.
pub const MAX_CHAIN_ID: u32 = (u32::MAX - 36) / 2;

/// An unsigned big-endian quantity, stored left-trimmed with a 32-byte cap.
///
/// Zero is the empty byte string, which is what the RLP wire format wants
/// for a zero-valued numeric field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quantity(Vec<u8>);

impl Quantity {
    pub fn zero() -> Self {
        Self(Vec::new())
    }

    /// Trims a big-endian byte string into a quantity. Inputs longer than
    /// 32 bytes after trimming are rejected.
    pub fn from_be_slice(bytes: &[u8]) -> Result<Self, EthError> {
        let trimmed = trim_left(bytes, true);
        if trimmed.len() > MAX_QUANTITY_LEN {
            return Err(EthError::QuantityTooLong(trimmed.len()));
        }
        Ok(Self(trimmed))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self(trim_left(&value.to_be_bytes(), true))
    }
}

impl From<u128> for Quantity {
    fn from(value: u128) -> Self {
        Self(trim_left(&value.to_be_bytes(), true))
    }
}

/// Network parameters that enter the signature.
#[derive(Debug, Clone, Copy)]
pub struct ChainParams {
    pub chain_id: u32,
    pub eip155: bool,
}

/// The six caller-supplied fields of a legacy transaction. `v`, `r` and `s`
/// are produced by signing.
///
/// `data` is borrowed: the caller keeps the calldata alive for the duration
/// of the signing/send call and no copy is made.
#[derive(Debug, Clone)]
pub struct LegacyTx<'a> {
    pub nonce: Quantity,
    pub gas_price: Quantity,
    pub gas_limit: Quantity,
    pub recipient: [u8; RECIPIENT_LEN],
    pub value: Quantity,
    pub data: &'a [u8],
}

/// A signed, RLP-encoded transaction ready for hex encoding and submission.
#[derive(Debug, Clone)]
pub struct SignedTx {
    pub raw: Vec<u8>,
}

/// Upper bound for the encoded stream: every field costs at most its own
/// length plus a 9-byte header, and `v`/`r`/`s` are unknown before signing
/// so their maximum widths are assumed.
fn estimate_size(tx: &LegacyTx<'_>) -> usize {
    tx.nonce.as_bytes().len()
        + tx.gas_price.as_bytes().len()
        + tx.gas_limit.as_bytes().len()
        + RECIPIENT_LEN
        + tx.value.as_bytes().len()
        + tx.data.len()
        + 4
        + 32
        + 32
        + 9 * 9
}

/// Encodes and signs a legacy transaction with the EIP-155 two-pass
/// protocol.
///
/// Pass 1 encodes the list `[nonce, gas_price, gas_limit, recipient, value,
/// data]`, extended with `[chain_id, "", ""]` when EIP-155 is in effect, and
/// hashes it with Keccak-256. The digest is ECDSA-signed. Pass 2 rewinds to
/// where `v` started, writes the real `v`/`r`/`s` over the placeholders, and
/// re-wraps the outer list.
///
/// `v` is `2 * chain_id + parity + 35` under EIP-155, `parity + 27`
/// otherwise.
pub fn sign_transaction(
    tx: &LegacyTx<'_>,
    keypair: &Keypair,
    chain: &ChainParams,
) -> Result<SignedTx, EthError> {
    if chain.eip155 && chain.chain_id > MAX_CHAIN_ID {
        return Err(EthError::ChainIdTooLarge(chain.chain_id));
    }

    let mut enc = RlpEncoder::with_capacity(estimate_size(tx))?;
    enc.append(tx.nonce.as_bytes())?;
    enc.append(tx.gas_price.as_bytes())?;
    enc.append(tx.gas_limit.as_bytes())?;
    enc.append(&tx.recipient)?;
    enc.append(tx.value.as_bytes())?;
    enc.append(tx.data)?;

    // Where v starts; pass 2 overwrites from here.
    let vrs_mark = enc.mark();

    if chain.eip155 {
        enc.append(&u32_to_be(chain.chain_id, TrimMode::LeftTrim))?;
        enc.append(&[])?;
        enc.append(&[])?;
    }
    enc.wrap_list()?;

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Keccak256::digest(enc.as_encoded()));

    let (r, s, parity) = keypair.sign_digest(&digest)?;
    let r_trimmed = trim_left(&r, true);
    let s_trimmed = trim_left(&s, true);

    let v: u32 = if chain.eip155 {
        2 * chain.chain_id + u32::from(parity) + 35
    } else {
        u32::from(parity) + 27
    };

    enc.rewind(vrs_mark);
    enc.append(&u32_to_be(v, TrimMode::LeftTrim))?;
    enc.append(&r_trimmed)?;
    enc.append(&s_trimmed)?;
    enc.wrap_list()?;

    Ok(SignedTx {
        raw: enc.into_encoded(),
    })
}
