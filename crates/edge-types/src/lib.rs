//! # edge-types
//!
//! Transaction and receipt types as they travel over JSON-RPC.
//!
//! - [`SignedTransaction`]: legacy (EIP-155) and EIP-1559 transactions with
//!   their network encoding, hash and signing hash
//! - [`Receipt`]: execution status, gas and logs of a mined transaction

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub mod receipt;
pub mod transaction;

pub use error::TypesError;
pub use receipt::{Log, Receipt, TxStatus};
pub use transaction::{
    DynamicFeeTx, LegacyTx, SignedTransaction, TransactionBody, TxSignature, TxType,
};
