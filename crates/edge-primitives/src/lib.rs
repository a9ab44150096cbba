//! # edge-primitives
//!
//! Primitive types shared by the evm-edge crates.
//!
//! - [`Address`]: 20-byte account address, including Hedera "long-zero"
//!   addresses of system accounts
//! - [`H256`]: 32-byte hash
//! - [`U256`]: 256-bit unsigned integer (re-exported from `primitive-types`)
//! - [`units`]: ether/gwei conversions

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;
pub mod units;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Transaction nonce type
pub type Nonce = u64;

/// Gas type
pub type Gas = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_basic() {
        let a = U256::from(100u64);
        let b = U256::from(200u64);
        assert_eq!(a + b, U256::from(300u64));
    }

    #[test]
    fn test_error_conversion() {
        let err: PrimitiveError = AddressError::InvalidLength(3).into();
        assert!(err.to_string().contains("address error"));
    }
}
