use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;

use crate::error::CryptoError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size in bytes.
pub const AES_BLOCK_SIZE: usize = 16;

/// Encrypts `plaintext` with AES-256-CBC under `key` and `iv`.
///
/// Library padding is disabled: PKCS#7 bytes cannot be reliably told apart
/// from payload bytes at decryption time, so the key-store layer pads with
/// zeros itself and records the unpadded length out of band. `plaintext`
/// must already be a multiple of the AES block size.
pub fn cbc_encrypt(
    key: &[u8; 32],
    iv: &[u8; AES_BLOCK_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if plaintext.len() % AES_BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidInput(format!(
            "plaintext length {} is not a multiple of the AES block size",
            plaintext.len()
        )));
    }

    let mut buf = plaintext.to_vec();
    let len = plaintext.len();
    Aes256CbcEnc::new(key.into(), iv.into())
        .encrypt_padded_mut::<NoPadding>(&mut buf, len)
        .map_err(|e| CryptoError::Cipher(format!("encrypt: {e}")))?;
    Ok(buf)
}

/// Decrypts AES-256-CBC `ciphertext` under `key` and `iv`, padding disabled.
///
/// CBC decryption only feeds the IV into the first block; when the first
/// plaintext block is disposable (the key-store's IV-independent block), any
/// IV recovers the remainder correctly.
pub fn cbc_decrypt(
    key: &[u8; 32],
    iv: &[u8; AES_BLOCK_SIZE],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidInput(format!(
            "ciphertext length {} is not a positive multiple of the AES block size",
            ciphertext.len()
        )));
    }

    let mut buf = ciphertext.to_vec();
    Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .map_err(|e| CryptoError::Cipher(format!("decrypt: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = test_key();
        let iv = [0x42u8; 16];
        let plaintext = [0xA5u8; 64];

        let ct = cbc_encrypt(&key, &iv, &plaintext).unwrap();
        assert_eq!(ct.len(), plaintext.len());

        let pt = cbc_decrypt(&key, &iv, &ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn no_padding_means_length_preserved() {
        let key = test_key();
        let iv = [0u8; 16];
        let plaintext = [0u8; 16];

        let ct = cbc_encrypt(&key, &iv, &plaintext).unwrap();
        assert_eq!(ct.len(), 16);
    }

    #[test]
    fn unaligned_plaintext_is_rejected() {
        let key = test_key();
        let iv = [0u8; 16];

        let result = cbc_encrypt(&key, &iv, &[0u8; 15]);
        assert!(matches!(result, Err(CryptoError::InvalidInput(_))));
    }

    #[test]
    fn unaligned_or_empty_ciphertext_is_rejected() {
        let key = test_key();
        let iv = [0u8; 16];

        assert!(cbc_decrypt(&key, &iv, &[0u8; 17]).is_err());
        assert!(cbc_decrypt(&key, &iv, &[]).is_err());
    }

    #[test]
    fn wrong_iv_only_garbles_first_block() {
        let key = test_key();
        let iv = [0x11u8; 16];
        let plaintext: Vec<u8> = (0u8..48).collect();

        let ct = cbc_encrypt(&key, &iv, &plaintext).unwrap();

        let other_iv = [0x99u8; 16];
        let pt = cbc_decrypt(&key, &other_iv, &ct).unwrap();

        // First block depends on the IV, the rest does not.
        assert_ne!(&pt[..16], &plaintext[..16]);
        assert_eq!(&pt[16..], &plaintext[16..]);
    }

    #[test]
    fn wrong_key_garbles_everything() {
        let key = test_key();
        let iv = [0u8; 16];
        let plaintext = [0x5Au8; 32];

        let ct = cbc_encrypt(&key, &iv, &plaintext).unwrap();

        let mut wrong_key = key;
        wrong_key[0] ^= 0xff;
        let pt = cbc_decrypt(&wrong_key, &iv, &ct).unwrap();
        assert_ne!(pt, plaintext);
    }

    #[test]
    fn ciphertext_differs_from_plaintext() {
        let key = test_key();
        let iv = [0x07u8; 16];
        let plaintext = [0u8; 32];

        let ct = cbc_encrypt(&key, &iv, &plaintext).unwrap();
        assert_ne!(ct, plaintext);
    }
}
