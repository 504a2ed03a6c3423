//! Encrypted key-store persistence.
//!
//! On-disk container:
//!
//! ```text
//! | Hash32 | Len4BE | ciphertext |
//!            ciphertext = AES-256-CBC( D16 || Body || ZeroPad )
//! Body = secret(32) || public(64) || address(20) || chain_id_be(4)
//!        || eip155(1) || url_len_be(4) || url
//! ```
//!
//! `D16` is a disposable random block: CBC decryption feeds the IV only into
//! the first block, so with a throwaway first block the IV never needs to be
//! stored and any IV decrypts the remainder. `Hash32 = Keccak256(Body)`
//! authenticates the payload (and, indirectly, the password). `Len4BE` is
//! the unpadded plaintext length including `D16`. Padding is zeros, not
//! PKCS#7: PKCS#7 bytes cannot be reliably distinguished from payload bytes
//! when reading back.

use std::fs;
use std::path::Path;

use sha3::{Digest, Keccak256};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use chain_eth::check_secret_key;
use codec_utils::REASONABLE_MAX_LEN;
use crypto_utils::cipher::{cbc_decrypt, cbc_encrypt, AES_BLOCK_SIZE};
use crypto_utils::kdf::password_key;
use crypto_utils::random::random_bytes_fixed;

use crate::error::WalletError;

const HASH_LEN: usize = 32;
const LEN_FIELD_LEN: usize = 4;
const HEADER_LEN: usize = HASH_LEN + LEN_FIELD_LEN;

/// secret(32) + public(64) + address(20) + chain_id(4) + eip155(1) + url_len(4)
const BODY_FIXED_LEN: usize = 32 + 64 + 20 + 4 + 1 + 4;

/// The wallet state a key-store holds. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeystoreData {
    pub secret_key: [u8; 32],
    pub public_key: [u8; 64],
    pub address: [u8; 20],
    pub chain_id: u32,
    pub eip155: bool,
    pub node_url: String,
}

fn round_up_to_block(len: usize) -> usize {
    len.div_ceil(AES_BLOCK_SIZE) * AES_BLOCK_SIZE
}

/// Serializes and encrypts wallet state into a key-store blob.
///
/// `password` is hashed with Keccak-256 into the AES key; whether it carries
/// a trailing NUL is the caller's choice, but the choice must match
/// [`decode`] exactly.
pub fn encode(data: &KeystoreData, password: &[u8]) -> Result<Vec<u8>, WalletError> {
    check_secret_key(&data.secret_key)?;

    let url = data.node_url.as_bytes();
    let body_len = BODY_FIXED_LEN + url.len();
    let unpadded_len = AES_BLOCK_SIZE + body_len;
    if unpadded_len > REASONABLE_MAX_LEN {
        return Err(WalletError::Keystore(format!(
            "wallet state of {unpadded_len} bytes exceeds the container maximum"
        )));
    }

    let mut plain = Zeroizing::new(vec![0u8; round_up_to_block(unpadded_len)]);

    // Disposable first block for IV-independent decryption.
    plain[..AES_BLOCK_SIZE].copy_from_slice(&random_bytes_fixed::<AES_BLOCK_SIZE>()?);

    let mut offset = AES_BLOCK_SIZE;
    let mut put = |bytes: &[u8], plain: &mut [u8]| {
        plain[offset..offset + bytes.len()].copy_from_slice(bytes);
        offset += bytes.len();
    };
    put(&data.secret_key, &mut plain);
    put(&data.public_key, &mut plain);
    put(&data.address, &mut plain);
    put(&data.chain_id.to_be_bytes(), &mut plain);
    put(&[data.eip155 as u8], &mut plain);
    put(&(url.len() as u32).to_be_bytes(), &mut plain);
    put(url, &mut plain);
    debug_assert_eq!(offset, unpadded_len);
    // The remainder of `plain` stays zero: that is the padding.

    let hash = Keccak256::digest(&plain[AES_BLOCK_SIZE..unpadded_len]);

    let mut key = password_key(password);
    let iv = random_bytes_fixed::<AES_BLOCK_SIZE>()?;
    let ciphertext = cbc_encrypt(&key, &iv, &plain);
    key.zeroize();
    let ciphertext = ciphertext?;

    let mut blob = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    blob.extend_from_slice(&hash);
    blob.extend_from_slice(&(unpadded_len as u32).to_be_bytes());
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypts and validates a key-store blob.
///
/// A wrong password and a corrupted container are indistinguishable: both
/// surface as [`WalletError::BadChecksum`]. The secret-key range check is
/// re-applied after decryption.
pub fn decode(blob: &[u8], password: &[u8]) -> Result<KeystoreData, WalletError> {
    if blob.len() < HEADER_LEN {
        return Err(WalletError::Keystore(
            "container shorter than its header".into(),
        ));
    }

    let stored_hash = &blob[..HASH_LEN];
    let mut len_be = [0u8; LEN_FIELD_LEN];
    len_be.copy_from_slice(&blob[HASH_LEN..HEADER_LEN]);
    let unpadded_len = u32::from_be_bytes(len_be) as usize;

    if unpadded_len > REASONABLE_MAX_LEN {
        return Err(WalletError::Keystore(format!(
            "length field {unpadded_len} exceeds the container maximum"
        )));
    }
    if unpadded_len < AES_BLOCK_SIZE + BODY_FIXED_LEN {
        return Err(WalletError::Keystore(
            "length field too small for the fixed fields".into(),
        ));
    }

    let ciphertext_len = round_up_to_block(unpadded_len);
    let ciphertext = blob
        .get(HEADER_LEN..HEADER_LEN + ciphertext_len)
        .ok_or_else(|| WalletError::Keystore("container truncated".into()))?;

    let mut key = password_key(password);
    // Any IV works: the first plaintext block is disposable.
    let plain = cbc_decrypt(&key, &[0u8; AES_BLOCK_SIZE], ciphertext);
    key.zeroize();
    let plain = Zeroizing::new(plain?);

    let body = &plain[AES_BLOCK_SIZE..unpadded_len];
    let hash = Keccak256::digest(body);
    if hash.as_slice() != stored_hash {
        return Err(WalletError::BadChecksum);
    }

    let mut secret_key = [0u8; 32];
    secret_key.copy_from_slice(&body[..32]);
    if let Err(e) = check_secret_key(&secret_key) {
        secret_key.zeroize();
        return Err(e.into());
    }

    let mut public_key = [0u8; 64];
    public_key.copy_from_slice(&body[32..96]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&body[96..116]);

    let mut chain_id_be = [0u8; 4];
    chain_id_be.copy_from_slice(&body[116..120]);
    let chain_id = u32::from_be_bytes(chain_id_be);

    let eip155 = body[120] != 0;

    let mut url_len_be = [0u8; 4];
    url_len_be.copy_from_slice(&body[121..125]);
    let url_len = u32::from_be_bytes(url_len_be) as usize;

    if url_len != body.len() - BODY_FIXED_LEN {
        secret_key.zeroize();
        return Err(WalletError::Keystore(
            "node url length disagrees with the container length".into(),
        ));
    }

    let node_url = match String::from_utf8(body[BODY_FIXED_LEN..].to_vec()) {
        Ok(url) => url,
        Err(_) => {
            secret_key.zeroize();
            return Err(WalletError::Keystore("node url is not valid UTF-8".into()));
        }
    };

    Ok(KeystoreData {
        secret_key,
        public_key,
        address,
        chain_id,
        eip155,
        node_url,
    })
}

/// Encrypts the wallet state and writes it to `path`.
pub fn save(data: &KeystoreData, password: &[u8], path: &Path) -> Result<(), WalletError> {
    let blob = encode(data, password)?;
    fs::write(path, &blob)?;
    debug!(path = %path.display(), bytes = blob.len(), "key-store saved");
    Ok(())
}

/// Reads `path` and decrypts the wallet state.
pub fn load(password: &[u8], path: &Path) -> Result<KeystoreData, WalletError> {
    let blob = fs::read(path)?;
    let data = decode(&blob, password)?;
    debug!(path = %path.display(), "key-store loaded");
    Ok(data)
}
