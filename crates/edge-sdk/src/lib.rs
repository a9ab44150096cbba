//! # edge-sdk
//!
//! Client toolkit for EVM JSON-RPC nodes.
//!
//! ## Features
//!
//! - **EthClient**: `eth_*` RPC calls, receipt polling
//! - **Wallet**: secp256k1 keys and signing
//! - **TxBuilder**: fluent API for legacy and EIP-1559 transactions
//! - **ABI**: Solidity ABI encoding, decoding and revert reasons
//! - **Artifacts**: Hardhat artifact loading and [`Contract`] handles
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edge_sdk::{EthClient, Wallet, TxBuilder};
//! use edge_primitives::Address;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EthClient::new_mock();
//!     let wallet = Wallet::new_random();
//!
//!     let balance = client.get_balance(wallet.address(), Default::default()).await?;
//!     println!("{}: {}", wallet.address(), balance);
//!
//!     let tx = TxBuilder::new(client.chain_id().await?)
//!         .nonce(0)
//!         .gas_limit(21000)
//!         .gas_price(1_000_000_000)
//!         .to(Address::from_account_num(800))
//!         .value(1_000_000_000_000_000_000)
//!         .sign_legacy(&wallet)?;
//!     let pending = client.send_transaction(&tx).await?;
//!     println!("sent {}", pending.hash());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Contract Interaction
//!
//! ```rust,no_run
//! use edge_sdk::{abi::Token, ArtifactStore, EthClient};
//! use edge_sdk::types::{BlockId, CallRequest};
//! use edge_primitives::Address;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EthClient::new_mock();
//!     let store = ArtifactStore::new("artifacts");
//!
//!     let token = store
//!         .get("contracts/ERC20Mock.sol:ERC20Mock")?
//!         .at(Address::from_account_num(1001));
//!     let data = token.encode_call("balanceOf", &[Token::Address(Address::from_account_num(1002))])?;
//!
//!     let out = client.call(&CallRequest::new(*token.address(), data), BlockId::Latest).await?;
//!     println!("balance: {}", token.decode_output("balanceOf", &out)?[0]);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod artifact;
mod client;
pub mod contract;
mod error;
mod transport;
mod tx_builder;
pub mod types;
mod wallet;

pub use artifact::{Artifact, ArtifactStore};
pub use client::{parse_hex_bytes, parse_hex_u64, EthClient};
pub use contract::{Contract, DecodedEvent};
pub use error::SdkError;
pub use transport::{MockTransport, RecordedRequest};

/// Re-export Transport trait for custom implementations
pub use transport::Transport;
pub use tx_builder::TxBuilder;
pub use wallet::Wallet;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

pub use edge_primitives::{Address, Gas, Nonce, H256, U256};
pub use edge_types::{Log, Receipt, SignedTransaction, TxStatus};
