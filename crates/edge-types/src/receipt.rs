//! Transaction receipt types

use bytes::Bytes;
use edge_primitives::{Address, H256};

/// Transaction execution status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum TxStatus {
    /// Transaction failed (status 0)
    Failure = 0,
    /// Transaction succeeded (status 1)
    Success = 1,
}

impl From<bool> for TxStatus {
    fn from(success: bool) -> Self {
        if success {
            TxStatus::Success
        } else {
            TxStatus::Failure
        }
    }
}

impl From<TxStatus> for bool {
    fn from(status: TxStatus) -> Self {
        status == TxStatus::Success
    }
}

/// Log entry emitted during transaction execution
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Log {
    /// Contract address that emitted the log
    pub address: Address,
    /// Log topics (indexed parameters)
    pub topics: Vec<H256>,
    /// Log data (non-indexed parameters)
    #[cfg_attr(feature = "serde", serde(serialize_with = "hex_data"))]
    pub data: Bytes,
}

impl Log {
    /// Create a new log entry
    pub fn new(address: Address, topics: Vec<H256>, data: Bytes) -> Self {
        Self {
            address,
            topics,
            data,
        }
    }

    /// The event signature hash for non-anonymous events
    pub fn topic0(&self) -> Option<&H256> {
        self.topics.first()
    }
}

/// Receipt of a mined transaction, as returned by
/// `eth_getTransactionReceipt`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct Receipt {
    /// Transaction hash
    pub transaction_hash: H256,
    /// Block the transaction was mined in
    pub block_number: u64,
    /// Sender
    pub from: Address,
    /// Recipient (None for contract creation)
    pub to: Option<Address>,
    /// Transaction status (success/failure)
    pub status: TxStatus,
    /// Gas used by this transaction
    pub gas_used: u64,
    /// Cumulative gas used in the block up to this transaction
    pub cumulative_gas_used: u64,
    /// Contract address created (if contract creation tx)
    pub contract_address: Option<Address>,
    /// Logs emitted by this transaction
    pub logs: Vec<Log>,
}

#[cfg(feature = "serde")]
fn hex_data<S: serde::Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(data)))
}

impl Receipt {
    /// Check if transaction succeeded
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }

    /// Logs emitted by `address`
    pub fn logs_from<'a>(&'a self, address: &'a Address) -> impl Iterator<Item = &'a Log> + 'a {
        self.logs.iter().filter(move |log| &log.address == address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(status: TxStatus) -> Receipt {
        Receipt {
            transaction_hash: H256::from_bytes([7u8; 32]),
            block_number: 12,
            from: Address::from_account_num(1002),
            to: Some(Address::from_account_num(800)),
            status,
            gas_used: 21000,
            cumulative_gas_used: 21000,
            contract_address: None,
            logs: vec![],
        }
    }

    #[test]
    fn test_tx_status_conversion() {
        assert_eq!(TxStatus::from(true), TxStatus::Success);
        assert_eq!(TxStatus::from(false), TxStatus::Failure);
        assert!(bool::from(TxStatus::Success));
        assert!(!bool::from(TxStatus::Failure));
        assert_eq!(TxStatus::Success as u8, 1);
    }

    #[test]
    fn test_receipt_success() {
        assert!(receipt(TxStatus::Success).is_success());
        assert!(!receipt(TxStatus::Failure).is_success());
    }

    #[test]
    fn test_logs_from_filters_by_emitter() {
        let emitter = Address::from_account_num(1500);
        let other = Address::from_account_num(1501);
        let topic = H256::from_bytes([1u8; 32]);

        let mut r = receipt(TxStatus::Success);
        r.logs = vec![
            Log::new(emitter, vec![topic], Bytes::new()),
            Log::new(other, vec![], Bytes::from_static(&[1, 2])),
            Log::new(emitter, vec![], Bytes::new()),
        ];

        assert_eq!(r.logs_from(&emitter).count(), 2);
        assert_eq!(r.logs_from(&other).count(), 1);
        assert_eq!(r.logs[0].topic0(), Some(&topic));
        assert_eq!(r.logs[2].topic0(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_receipt_json_uses_rpc_field_names() {
        let emitter = Address::from_account_num(1500);
        let mut r = receipt(TxStatus::Failure);
        r.logs = vec![Log::new(emitter, vec![], Bytes::from_static(&[0xab, 0xcd]))];

        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["blockNumber"], 12);
        assert_eq!(json["gasUsed"], 21000);
        assert_eq!(json["to"], Address::from_account_num(800).to_hex());
        assert!(json["contractAddress"].is_null());
        assert_eq!(json["logs"][0]["address"], emitter.to_hex());
        assert_eq!(json["logs"][0]["data"], "0xabcd");
    }
}
