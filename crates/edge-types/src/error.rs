//! Type-level errors

use thiserror::Error;

/// Errors decoding or verifying transactions
#[derive(Debug, Error)]
pub enum TypesError {
    /// Malformed RLP
    #[error("rlp error: {0}")]
    Rlp(String),

    /// Envelope type byte this crate does not handle
    #[error("unsupported transaction type: 0x{0:02x}")]
    UnsupportedType(u8),

    /// Integer does not fit the field it belongs to
    #[error("field out of range: {0}")]
    OutOfRange(&'static str),

    /// Signature cannot be used for recovery
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

impl From<rlp::DecoderError> for TypesError {
    fn from(err: rlp::DecoderError) -> Self {
        TypesError::Rlp(err.to_string())
    }
}

impl From<edge_crypto::CryptoError> for TypesError {
    fn from(err: edge_crypto::CryptoError) -> Self {
        TypesError::InvalidSignature(err.to_string())
    }
}
