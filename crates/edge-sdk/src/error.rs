//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Debug, Error)]
pub enum SdkError {
    /// Transport/network error
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON-RPC error object returned by the node
    #[error("RPC error: {code} - {message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
        /// Revert data or other payload attached to the error
        data: Option<String>,
    },

    /// Deadline passed while waiting on the node
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// ABI encoding error
    #[error("ABI encoding error: {0}")]
    AbiEncode(String),

    /// ABI decoding error
    #[error("ABI decoding error: {0}")]
    AbiDecode(String),

    /// Function, event or error not present in the ABI
    #[error("Unknown ABI item: {0}")]
    UnknownAbiItem(String),

    /// Artifact could not be read or parsed
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Transaction build error
    #[error("Transaction build error: {0}")]
    TxBuild(String),

    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid chain ID
    #[error("Invalid chain ID: {0}")]
    InvalidChainId(String),
}

impl SdkError {
    /// Revert data carried by an RPC error, decoded from hex.
    pub fn revert_data(&self) -> Option<Vec<u8>> {
        match self {
            SdkError::Rpc {
                data: Some(data), ..
            } => hex::decode(data.strip_prefix("0x").unwrap_or(data)).ok(),
            _ => None,
        }
    }

    /// Whether the node reported an EVM revert.
    pub fn is_revert(&self) -> bool {
        match self {
            SdkError::Rpc { code, message, .. } => {
                *code == 3 || message.to_ascii_lowercase().contains("revert")
            }
            _ => false,
        }
    }
}

impl From<hex::FromHexError> for SdkError {
    fn from(e: hex::FromHexError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<edge_crypto::CryptoError> for SdkError {
    fn from(e: edge_crypto::CryptoError) -> Self {
        SdkError::SigningFailed(e.to_string())
    }
}

impl From<edge_primitives::PrimitiveError> for SdkError {
    fn from(e: edge_primitives::PrimitiveError) -> Self {
        SdkError::InvalidAddress(e.to_string())
    }
}

impl From<edge_primitives::AddressError> for SdkError {
    fn from(e: edge_primitives::AddressError) -> Self {
        SdkError::InvalidAddress(e.to_string())
    }
}

impl From<edge_primitives::HashError> for SdkError {
    fn from(e: edge_primitives::HashError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}

impl From<edge_types::TypesError> for SdkError {
    fn from(e: edge_types::TypesError) -> Self {
        SdkError::TxBuild(e.to_string())
    }
}
