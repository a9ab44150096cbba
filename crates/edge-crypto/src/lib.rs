//! # edge-crypto
//!
//! Cryptography used to build and check transactions:
//!
//! - Keccak-256 hashing
//! - secp256k1 signing (EIP-2 low-s) and public key recovery
//! - Address derivation for externally owned accounts, `CREATE` and `CREATE2`

#![warn(missing_docs)]
#![warn(clippy::all)]

mod derive;
mod error;
mod hash;
mod signature;

pub use derive::{create2_address, create_address};
pub use error::CryptoError;
pub use hash::keccak256;
pub use signature::{
    public_key_to_address, recover_address, recover_public_key, sign, PrivateKey, PublicKey,
    Signature,
};
