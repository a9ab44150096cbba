//! Query commands

use clap::Subcommand;
use edge_primitives::{Address, H256};
use edge_sdk::types::BlockId;
use edge_sdk::EthClient;
use serde_json::json;

use crate::{config::Config, output::Output, CliError};

/// Query subcommands
#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// Query chain ID
    ChainId,
    /// Query current gas price
    GasPrice,
    /// Query current block number
    BlockNumber,
    /// Query an account balance
    Balance {
        /// Account address
        address: String,
    },
    /// Query an account's pending nonce
    Nonce {
        /// Account address
        address: String,
    },
    /// Query the code deployed at an address
    Code {
        /// Contract address
        address: String,
    },
    /// Query transaction receipt
    Receipt {
        /// Transaction hash
        hash: String,
    },
}

fn parse_address(s: &str) -> Result<Address, CliError> {
    Address::from_hex(s).map_err(|e| CliError::InvalidAddress(e.to_string()))
}

async fn connect(config: &Config) -> Result<EthClient, CliError> {
    let profile = config.profile(&config.network)?;
    EthClient::connect(&profile.url, profile.timeout)
        .await
        .map_err(|e| CliError::Unreachable {
            network: profile.name.clone(),
            reason: e.to_string(),
        })
}

impl QueryCommand {
    pub async fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        // Validate input before touching the network.
        let address = match &self {
            QueryCommand::Balance { address }
            | QueryCommand::Nonce { address }
            | QueryCommand::Code { address } => Some(parse_address(address)?),
            _ => None,
        };
        let hash = match &self {
            QueryCommand::Receipt { hash } => {
                Some(H256::from_hex(hash).map_err(|e| CliError::InvalidHex(e.to_string()))?)
            }
            _ => None,
        };

        let client = connect(config).await?;
        let out = Output::new(json);
        let out = match (self, address, hash) {
            (QueryCommand::ChainId, _, _) => {
                let chain_id = client.chain_id().await?;
                out.field("chain_id", chain_id)
                    .line(format!("Chain ID: {}", chain_id))
            }
            (QueryCommand::GasPrice, _, _) => {
                let gas_price = client.gas_price().await?;
                let gwei = gas_price / 1_000_000_000;
                out.field("gas_price_wei", gas_price.to_string())
                    .field("gas_price_gwei", gwei.to_string())
                    .line(format!("Gas Price: {} gwei ({} wei)", gwei, gas_price))
            }
            (QueryCommand::BlockNumber, _, _) => {
                let number = client.block_number().await?;
                out.field("block_number", number)
                    .line(format!("Block Number: {}", number))
            }
            (QueryCommand::Balance { .. }, Some(address), _) => {
                let balance = client.get_balance(&address, BlockId::Latest).await?;
                out.field("address", address.to_hex())
                    .field("balance_wei", balance.to_string())
                    .line(format!("Balance of {}: {} wei", address, balance))
            }
            (QueryCommand::Nonce { .. }, Some(address), _) => {
                let nonce = client.get_nonce(&address, BlockId::Pending).await?;
                out.field("address", address.to_hex())
                    .field("nonce", nonce)
                    .line(format!("Nonce of {}: {}", address, nonce))
            }
            (QueryCommand::Code { .. }, Some(address), _) => {
                let code = client.get_code(&address, BlockId::Latest).await?;
                let code_hex = format!("0x{}", hex::encode(&code));
                out.field("address", address.to_hex())
                    .field("code", code_hex.clone())
                    .field("size", code.len())
                    .line(format!("Code at {} ({} bytes): {}", address, code.len(), code_hex))
            }
            (QueryCommand::Receipt { .. }, _, Some(hash)) => {
                match client.get_receipt(&hash).await? {
                    Some(receipt) => out
                        .field("hash", hash.to_hex())
                        .field("receipt", serde_json::to_value(&receipt)?)
                        .line(format!("Receipt for {}", hash))
                        .line(format!("  block:    {}", receipt.block_number))
                        .line(format!("  success:  {}", receipt.is_success()))
                        .line(format!("  gas used: {}", receipt.gas_used))
                        .line(match receipt.contract_address {
                            Some(address) => format!("  contract: {}", address),
                            None => "  contract: -".to_string(),
                        })
                        .line(format!("  logs:     {}", receipt.logs.len())),
                    None => out
                        .field("hash", hash.to_hex())
                        .field("receipt", json!(null))
                        .line(format!("No receipt for {}", hash)),
                }
            }
            _ => return Err(CliError::InvalidInput("unparsed query argument".to_string())),
        };
        out.print();
        Ok(())
    }
}
