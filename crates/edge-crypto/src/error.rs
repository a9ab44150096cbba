//! Errors from signing and recovery

use thiserror::Error;

/// Signing or recovery error
#[derive(Debug, Error)]
pub enum CryptoError {
    /// k256 refused to sign the prehash
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// r or s is zero or not below the curve order
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Recovery id derived from v is out of range
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// No public key recovers from this signature and hash
    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),
}
