//! Common error types for primitives

use crate::address::AddressError;
use crate::hash::HashError;
use crate::units::UnitError;
use thiserror::Error;

/// Primitive operation error
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// Address error
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// Hash error
    #[error("hash error: {0}")]
    Hash(#[from] HashError),

    /// Unit conversion error
    #[error("unit error: {0}")]
    Unit(#[from] UnitError),
}
