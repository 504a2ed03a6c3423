use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::EthError;

/// secp256k1 group order `n`, big-endian.
///
/// A valid Ethereum secret key `k` satisfies `1 <= k < n`.
pub const SECP256K1_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36,
    0x41, 0x41,
];

/// Checks that a secret key is in the valid scalar range for secp256k1.
///
/// Big-endian byte comparison is numeric comparison for fixed-width unsigned
/// integers, so no big-integer arithmetic is needed.
pub fn check_secret_key(secret: &[u8; 32]) -> Result<(), EthError> {
    if secret.iter().all(|&b| b == 0) {
        return Err(EthError::BadKey("secret key is zero".into()));
    }
    if *secret >= SECP256K1_ORDER {
        return Err(EthError::BadKey(
            "secret key is not below the secp256k1 group order".into(),
        ));
    }
    Ok(())
}

/// A wallet account key: secret scalar, uncompressed public key (without the
/// 0x04 prefix), and the derived 20-byte address.
///
/// All fields are zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Keypair {
    secret: [u8; 32],
    public: [u8; 64],
    address: [u8; 20],
}

impl Keypair {
    /// Validates the secret key range and derives the public key and
    /// address.
    ///
    /// The address is the low-order 20 bytes of `Keccak256(X || Y)` over the
    /// 64-byte uncompressed public key.
    pub fn from_secret_key(secret: &[u8; 32]) -> Result<Self, EthError> {
        check_secret_key(secret)?;

        let signing_key =
            SigningKey::from_bytes(secret.into()).map_err(|e| EthError::BadKey(e.to_string()))?;
        let point = signing_key.verifying_key().to_encoded_point(false);
        let uncompressed = point.as_bytes();

        // 65 bytes with the 0x04 SEC1 prefix; the prefix is dropped.
        let mut public = [0u8; 64];
        public.copy_from_slice(&uncompressed[1..]);

        let digest = Keccak256::digest(public);
        let mut address = [0u8; 20];
        address.copy_from_slice(&digest[12..]);

        Ok(Self {
            secret: *secret,
            public,
            address,
        })
    }

    /// Draws random secret keys from the OS source until one passes the
    /// range check, up to 100 attempts. Random-source failure propagates.
    pub fn generate() -> Result<Self, EthError> {
        for _ in 0..100 {
            let mut candidate = crypto_utils::random::random_bytes_fixed::<32>()
                .map_err(|e| EthError::Random(e.to_string()))?;
            if check_secret_key(&candidate).is_ok() {
                let keypair = Self::from_secret_key(&candidate);
                candidate.zeroize();
                return keypair;
            }
            candidate.zeroize();
        }
        Err(EthError::BadKey(
            "no acceptable secret key after 100 random draws".into(),
        ))
    }

    pub fn secret_key(&self) -> &[u8; 32] {
        &self.secret
    }

    pub fn public_key(&self) -> &[u8; 64] {
        &self.public
    }

    pub fn address(&self) -> &[u8; 20] {
        &self.address
    }

    /// ECDSA-signs a 32-byte digest, returning `(r, s, parity)`.
    ///
    /// The signature is normalized to low-S form by k256 and the recovery
    /// identifier is adjusted to match.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<([u8; 32], [u8; 32], u8), EthError> {
        let mut secret = self.secret;
        let signing_key = SigningKey::from_bytes((&secret).into())
            .map_err(|e| EthError::BadKey(e.to_string()))?;
        secret.zeroize();

        let (signature, recovery_id): (Signature, RecoveryId) = signing_key
            .sign_prehash(digest)
            .map_err(|e| EthError::Signing(e.to_string()))?;

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&signature.r().to_bytes());
        s.copy_from_slice(&signature.s().to_bytes());

        Ok((r, s, recovery_id.is_y_odd() as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret_one() -> [u8; 32] {
        let mut key = [0u8; 32];
        key[31] = 1;
        key
    }

    #[test]
    fn zero_key_is_rejected() {
        assert!(matches!(
            check_secret_key(&[0u8; 32]),
            Err(EthError::BadKey(_))
        ));
    }

    #[test]
    fn group_order_is_rejected() {
        assert!(check_secret_key(&SECP256K1_ORDER).is_err());
    }

    #[test]
    fn above_group_order_is_rejected() {
        assert!(check_secret_key(&[0xff; 32]).is_err());
    }

    #[test]
    fn order_minus_one_is_accepted() {
        let mut key = SECP256K1_ORDER;
        key[31] -= 1;
        assert!(check_secret_key(&key).is_ok());
    }

    #[test]
    fn one_is_accepted() {
        assert!(check_secret_key(&secret_one()).is_ok());
    }

    #[test]
    fn address_of_secret_one_is_the_base_point_address() {
        // secret = 1 makes the public key the secp256k1 base point; its
        // address is a well-known value.
        let keypair = Keypair::from_secret_key(&secret_one()).unwrap();
        assert_eq!(
            hex::encode(keypair.address()),
            "7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn public_key_has_no_sec1_prefix() {
        let keypair = Keypair::from_secret_key(&secret_one()).unwrap();
        // The base point X coordinate starts 0x79be667e...
        assert_eq!(keypair.public_key()[0], 0x79);
        assert_eq!(keypair.public_key()[1], 0xbe);
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = Keypair::from_secret_key(&secret_one()).unwrap();
        let b = Keypair::from_secret_key(&secret_one()).unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn generate_produces_valid_distinct_keys() {
        let a = Keypair::generate().unwrap();
        let b = Keypair::generate().unwrap();
        assert!(check_secret_key(a.secret_key()).is_ok());
        assert_ne!(a.secret_key(), b.secret_key());
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn sign_digest_parity_is_a_bit() {
        let keypair = Keypair::from_secret_key(&secret_one()).unwrap();
        let (r, s, parity) = keypair.sign_digest(&[0x11; 32]).unwrap();
        assert!(parity <= 1);
        assert!(r.iter().any(|&b| b != 0));
        assert!(s.iter().any(|&b| b != 0));
    }

    #[test]
    fn sign_digest_is_deterministic() {
        // RFC 6979 deterministic nonces: same key + digest, same signature.
        let keypair = Keypair::from_secret_key(&secret_one()).unwrap();
        let first = keypair.sign_digest(&[0x22; 32]).unwrap();
        let second = keypair.sign_digest(&[0x22; 32]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn signature_s_is_low_form() {
        // The signer never emits a high-S signature; s < n/2 always holds.
        let half_order_top = SECP256K1_ORDER[0] / 2;
        let keypair = Keypair::from_secret_key(&secret_one()).unwrap();
        for seed in 0u8..8 {
            let (_, s, _) = keypair.sign_digest(&[seed; 32]).unwrap();
            assert!(s[0] <= half_order_top);
        }
    }
}
