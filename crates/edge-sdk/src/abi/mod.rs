//! Solidity ABI support
//!
//! - encoding call data and constructor arguments
//! - decoding return data, event logs and revert data
//! - parsing the JSON ABI shipped in compiler artifacts
//!
//! # Example
//!
//! ```rust
//! use edge_sdk::abi::{decode, encode, function_selector, ParamType, Token};
//! use edge_primitives::{Address, U256};
//!
//! let selector = function_selector("transfer(address,uint256)");
//! let mut data = selector.to_vec();
//! data.extend(encode(&[Token::Address(Address::ZERO), Token::Uint(U256::from(1000))]));
//!
//! let word = [0u8; 32];
//! let decoded = decode(&[ParamType::Uint(256)], &word).unwrap();
//! assert_eq!(decoded, vec![Token::Uint(U256::zero())]);
//! ```

mod decode;
mod encode;
mod json;
mod revert;
mod types;

pub use decode::decode;
pub use encode::{encode, encode_function_call, encode_params, function_selector, parse_type};
pub use json::{Abi, AbiError, Event, Function, Param, StateMutability};
pub use revert::{panic_description, RevertReason, ERROR_SELECTOR, PANIC_SELECTOR};
pub use types::{ParamType, Token, I256};
