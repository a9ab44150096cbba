//! EthClient - JSON-RPC client for an EVM node

use std::time::Duration;

use bytes::Bytes;
use edge_primitives::{Address, H256, U256};
use edge_types::{Log, Receipt, SignedTransaction, TxStatus};
use serde::Deserialize;
use serde_json::Value;

use crate::transport::{deserialize_response, MockTransport, Transport};
use crate::types::{BlockId, CallRequest, PendingTransaction};
use crate::SdkError;

#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Client for the `eth_*` JSON-RPC namespace
pub struct EthClient {
    transport: Box<dyn Transport>,
    chain_id: Option<u64>,
}

impl EthClient {
    /// Connect over HTTP and cache the node's chain id
    #[cfg(feature = "http")]
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, SdkError> {
        let transport = HttpTransport::new(url, timeout)?;
        let mut client = Self {
            transport: Box::new(transport),
            chain_id: None,
        };

        let chain_id = client.fetch_chain_id().await?;
        tracing::debug!(url, chain_id, "connected");
        client.chain_id = Some(chain_id);

        Ok(client)
    }

    /// Create a client over a fresh [`MockTransport`] reporting chain id 1
    pub fn new_mock() -> Self {
        Self {
            transport: Box::new(MockTransport::new()),
            chain_id: Some(1),
        }
    }

    /// Create a client with a custom transport. The chain id is fetched on
    /// first use.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            chain_id: None,
        }
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, SdkError> {
        let value = self.transport.request_json(method, params).await?;
        deserialize_response(value)
    }

    // ==================== Chain Info ====================

    /// Get the chain ID
    pub async fn chain_id(&self) -> Result<u64, SdkError> {
        if let Some(id) = self.chain_id {
            return Ok(id);
        }
        self.fetch_chain_id().await
    }

    async fn fetch_chain_id(&self) -> Result<u64, SdkError> {
        let result: String = self.request("eth_chainId", vec![]).await?;
        parse_hex_u64(&result)
    }

    /// Get the current gas price
    pub async fn gas_price(&self) -> Result<u128, SdkError> {
        let result: String = self.request("eth_gasPrice", vec![]).await?;
        parse_hex_u128(&result)
    }

    /// Get the current block number
    pub async fn block_number(&self) -> Result<u64, SdkError> {
        let result: String = self.request("eth_blockNumber", vec![]).await?;
        parse_hex_u64(&result)
    }

    // ==================== Account Queries ====================

    /// Get the balance of an address
    pub async fn get_balance(&self, address: &Address, block: BlockId) -> Result<U256, SdkError> {
        let result: String = self
            .request("eth_getBalance", address_at(address, block)?)
            .await?;
        parse_hex_u256(&result)
    }

    /// Get the nonce (transaction count) of an address
    pub async fn get_nonce(&self, address: &Address, block: BlockId) -> Result<u64, SdkError> {
        let result: String = self
            .request("eth_getTransactionCount", address_at(address, block)?)
            .await?;
        parse_hex_u64(&result)
    }

    /// Get the code at an address
    pub async fn get_code(&self, address: &Address, block: BlockId) -> Result<Bytes, SdkError> {
        let result: String = self
            .request("eth_getCode", address_at(address, block)?)
            .await?;
        parse_hex_bytes(&result)
    }

    // ==================== Receipts ====================

    /// Get a transaction receipt; `None` while the transaction is unmined
    pub async fn get_receipt(&self, hash: &H256) -> Result<Option<Receipt>, SdkError> {
        let result: Option<RawReceipt> = self
            .request(
                "eth_getTransactionReceipt",
                vec![Value::String(hash.to_hex())],
            )
            .await?;
        result.map(RawReceipt::into_receipt).transpose()
    }

    /// Poll for a receipt until one appears or `timeout` passes
    pub async fn wait_for_receipt(
        &self,
        hash: &H256,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Receipt, SdkError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(receipt) = self.get_receipt(hash).await? {
                tracing::debug!(
                    tx = %hash,
                    block = receipt.block_number,
                    success = receipt.is_success(),
                    "mined"
                );
                return Ok(receipt);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(SdkError::Timeout(format!(
                    "no receipt for {} after {:?}",
                    hash, timeout
                )));
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    // ==================== Transaction Submission ====================

    /// Send a raw transaction (network-encoded bytes)
    pub async fn send_raw_transaction(&self, tx: &[u8]) -> Result<PendingTransaction, SdkError> {
        let hex = format!("0x{}", hex::encode(tx));
        let result: String = self
            .request("eth_sendRawTransaction", vec![Value::String(hex)])
            .await?;

        let hash = H256::from_hex(&result).map_err(|e| SdkError::InvalidHex(e.to_string()))?;
        tracing::debug!(tx = %hash, "submitted");
        Ok(PendingTransaction::new(hash))
    }

    /// Send a signed transaction
    pub async fn send_transaction(
        &self,
        tx: &SignedTransaction,
    ) -> Result<PendingTransaction, SdkError> {
        self.send_raw_transaction(&tx.encode()).await
    }

    // ==================== Call & Estimation ====================

    /// Execute a call (read-only, does not create transaction)
    pub async fn call(&self, request: &CallRequest, block: BlockId) -> Result<Bytes, SdkError> {
        let result: String = self
            .request(
                "eth_call",
                vec![serde_json::to_value(request)?, serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_bytes(&result)
    }

    /// Estimate gas for a transaction
    pub async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, SdkError> {
        let result: String = self
            .request("eth_estimateGas", vec![serde_json::to_value(request)?])
            .await?;
        parse_hex_u64(&result)
    }
}

// ==================== Helper Functions ====================

fn address_at(address: &Address, block: BlockId) -> Result<Vec<Value>, SdkError> {
    Ok(vec![
        Value::String(address.to_hex()),
        serde_json::to_value(block)?,
    ])
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: H256,
    block_number: Option<String>,
    from: Address,
    to: Option<Address>,
    status: Option<String>,
    gas_used: String,
    #[serde(default)]
    cumulative_gas_used: Option<String>,
    contract_address: Option<Address>,
    #[serde(default)]
    logs: Vec<RawLog>,
}

#[derive(Deserialize)]
struct RawLog {
    address: Address,
    #[serde(default)]
    topics: Vec<H256>,
    #[serde(default)]
    data: String,
}

impl RawReceipt {
    fn into_receipt(self) -> Result<Receipt, SdkError> {
        let status = self
            .status
            .ok_or_else(|| SdkError::MissingField("receipt status".to_string()))?;
        let gas_used = parse_hex_u64(&self.gas_used)?;

        Ok(Receipt {
            transaction_hash: self.transaction_hash,
            block_number: self
                .block_number
                .as_deref()
                .map(parse_hex_u64)
                .transpose()?
                .unwrap_or_default(),
            from: self.from,
            to: self.to,
            status: TxStatus::from(parse_hex_u64(&status)? == 1),
            gas_used,
            cumulative_gas_used: self
                .cumulative_gas_used
                .as_deref()
                .map(parse_hex_u64)
                .transpose()?
                .unwrap_or(gas_used),
            contract_address: self.contract_address,
            logs: self
                .logs
                .into_iter()
                .map(|log| {
                    Ok(Log::new(
                        log.address,
                        log.topics,
                        parse_hex_bytes(&log.data)?,
                    ))
                })
                .collect::<Result<_, SdkError>>()?,
        })
    }
}

/// Parse a `0x`-prefixed quantity as u64
pub fn parse_hex_u64(s: &str) -> Result<u64, SdkError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| SdkError::InvalidHex(format!("{}: {}", s, e)))
}

fn parse_hex_u128(s: &str) -> Result<u128, SdkError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u128::from_str_radix(s, 16).map_err(|e| SdkError::InvalidHex(format!("{}: {}", s, e)))
}

fn parse_hex_u256(s: &str) -> Result<U256, SdkError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    U256::from_str_radix(s, 16).map_err(|e| SdkError::InvalidHex(format!("{}: {}", s, e)))
}

/// Parse `0x`-prefixed data; `0x` is empty
pub fn parse_hex_bytes(s: &str) -> Result<Bytes, SdkError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(Bytes::new());
    }
    let bytes = hex::decode(s)?;
    Ok(Bytes::from(bytes))
}
