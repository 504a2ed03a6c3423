use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("cipher failure: {0}")]
    Cipher(String),

    #[error("random source failure: {0}")]
    Random(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_cipher() {
        let err = CryptoError::Cipher("block alignment".into());
        assert_eq!(err.to_string(), "cipher failure: block alignment");
    }

    #[test]
    fn display_random() {
        let err = CryptoError::Random("entropy pool".into());
        assert_eq!(err.to_string(), "random source failure: entropy pool");
    }

    #[test]
    fn display_invalid_input() {
        let err = CryptoError::InvalidInput("short ciphertext".into());
        assert_eq!(err.to_string(), "invalid input: short ciphertext");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(CryptoError::Cipher("test".into()));
        assert!(err.to_string().contains("test"));
    }
}
