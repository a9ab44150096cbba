//! What came back from the node, and expectations over it
//!
//! Every expectation returns a [`SuiteResult`]; a failed one becomes an
//! [`SuiteError::Assertion`] in the report rather than a panic.

use bytes::Bytes;
use edge_primitives::{Address, H256, U256};
use edge_sdk::abi::{panic_description, RevertReason};
use edge_sdk::{Receipt, TxStatus};

use crate::{SuiteError, SuiteResult};

/// Result of submitting a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    /// Gas estimation or submission was refused; no hash exists
    Rejected {
        /// Node error message
        message: String,
        /// Decoded revert data, when the node returned any
        reason: Option<RevertReason>,
    },
    /// The transaction was mined
    Mined {
        /// Transaction hash
        hash: H256,
        /// Its receipt
        receipt: Receipt,
    },
}

impl TxOutcome {
    /// Hash, when the transaction reached the node
    pub fn hash(&self) -> Option<&H256> {
        match self {
            TxOutcome::Mined { hash, .. } => Some(hash),
            TxOutcome::Rejected { .. } => None,
        }
    }

    /// Receipt, when mined
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            TxOutcome::Mined { receipt, .. } => Some(receipt),
            TxOutcome::Rejected { .. } => None,
        }
    }

    /// The node accepted the transaction; it may still have reverted
    pub fn expect_submitted(&self) -> SuiteResult<&H256> {
        match self {
            TxOutcome::Mined { hash, .. } => Ok(hash),
            TxOutcome::Rejected { message, .. } => Err(SuiteError::assertion(format!(
                "transaction was rejected: {}",
                message
            ))),
        }
    }

    /// Mined with status 1
    pub fn is_success(&self) -> bool {
        self.receipt().is_some_and(Receipt::is_success)
    }

    /// Mined with status 1
    pub fn expect_success(&self) -> SuiteResult<&Receipt> {
        match self {
            TxOutcome::Mined { receipt, .. } if receipt.is_success() => Ok(receipt),
            TxOutcome::Mined { hash, .. } => Err(SuiteError::assertion(format!(
                "expected status 1, transaction {} reverted",
                hash
            ))),
            TxOutcome::Rejected { message, .. } => Err(SuiteError::assertion(format!(
                "expected status 1, transaction was rejected: {}",
                message
            ))),
        }
    }

    /// Reverted: refused with revert data by estimation or submission,
    /// or mined with status 0. A refusal that is not a revert ("nonce too
    /// low", "insufficient funds", fee errors) never executed and fails the
    /// expectation.
    pub fn expect_failure(&self) -> SuiteResult<()> {
        match self {
            TxOutcome::Rejected {
                reason: Some(_), ..
            } => Ok(()),
            TxOutcome::Rejected {
                reason: None,
                message,
            } => Err(SuiteError::assertion(format!(
                "expected a revert, node refused the transaction: {}",
                message
            ))),
            TxOutcome::Mined { receipt, .. } if receipt.status == TxStatus::Failure => Ok(()),
            TxOutcome::Mined { hash, .. } => Err(SuiteError::assertion(format!(
                "expected failure, transaction {} succeeded",
                hash
            ))),
        }
    }

    /// Rejected with the named custom error
    pub fn expect_custom_error(&self, name: &str) -> SuiteResult<&RevertReason> {
        match self {
            TxOutcome::Rejected {
                reason: Some(reason),
                ..
            } => expect_custom(reason, name),
            other => Err(SuiteError::assertion(format!(
                "expected custom error {}, got {}",
                name,
                other.describe()
            ))),
        }
    }

    /// Rejected with `Error(message)`
    pub fn expect_revert_message(&self, message: &str) -> SuiteResult<()> {
        match self {
            TxOutcome::Rejected {
                reason: Some(reason),
                ..
            } => expect_message(reason, message),
            other => Err(SuiteError::assertion(format!(
                "expected revert {:?}, got {}",
                message,
                other.describe()
            ))),
        }
    }

    /// One-line description for logs and messages
    pub fn describe(&self) -> String {
        match self {
            TxOutcome::Rejected {
                reason: Some(reason),
                ..
            } => format!("rejected ({})", reason),
            TxOutcome::Rejected { message, .. } => format!("rejected ({})", message),
            TxOutcome::Mined { hash, receipt } => format!(
                "mined {} with status {}",
                hash,
                u8::from(receipt.is_success())
            ),
        }
    }
}

/// Result of an `eth_call`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// Call returned, possibly with empty data
    Returned(Bytes),
    /// Node reported an EVM revert
    Reverted(RevertReason),
    /// Any other RPC error
    Failed(String),
}

impl CallOutcome {
    /// Returned data
    pub fn expect_returned(&self) -> SuiteResult<&Bytes> {
        match self {
            CallOutcome::Returned(data) => Ok(data),
            other => Err(SuiteError::assertion(format!(
                "expected call to return, {}",
                other.describe()
            ))),
        }
    }

    /// Returned nothing: what calling an account without code gives, and
    /// what ethers reports as "could not decode result data"
    pub fn expect_empty_return(&self) -> SuiteResult<()> {
        match self {
            CallOutcome::Returned(data) if data.is_empty() => Ok(()),
            other => Err(SuiteError::assertion(format!(
                "expected empty return data, {}",
                other.describe()
            ))),
        }
    }

    /// Reverted for any reason
    pub fn expect_revert(&self) -> SuiteResult<&RevertReason> {
        match self {
            CallOutcome::Reverted(reason) => Ok(reason),
            other => Err(SuiteError::assertion(format!(
                "expected revert, {}",
                other.describe()
            ))),
        }
    }

    /// Reverted with the named custom error
    pub fn expect_custom_error(&self, name: &str) -> SuiteResult<&RevertReason> {
        expect_custom(self.expect_revert()?, name)
    }

    /// Reverted with `Error(message)`
    pub fn expect_revert_message(&self, message: &str) -> SuiteResult<()> {
        expect_message(self.expect_revert()?, message)
    }

    /// Reverted with `Panic(code)`
    pub fn expect_panic(&self, code: u64) -> SuiteResult<()> {
        match self.expect_revert()? {
            RevertReason::Panic(got) if *got == U256::from(code) => Ok(()),
            other => Err(SuiteError::assertion(format!(
                "expected panic 0x{:02x} ({}), got {}",
                code,
                panic_description(U256::from(code)),
                other
            ))),
        }
    }

    /// First return word read as an address; empty data is an error
    pub fn expect_address(&self) -> SuiteResult<Address> {
        self.returned_address().ok_or_else(|| {
            SuiteError::assertion(format!("expected an address, {}", self.describe()))
        })
    }

    /// First return word read as an address, `None` when the call
    /// returned less than a word or did not return
    pub fn returned_address(&self) -> Option<Address> {
        match self {
            CallOutcome::Returned(data) if data.len() >= 32 => {
                let mut word = [0u8; 32];
                word.copy_from_slice(&data[..32]);
                Some(Address::from_word(&word))
            }
            _ => None,
        }
    }

    /// First return word read as a bool
    pub fn expect_bool(&self) -> SuiteResult<bool> {
        let data = self.expect_returned()?;
        if data.len() < 32 {
            return Err(SuiteError::assertion(format!(
                "expected a bool, got {} bytes",
                data.len()
            )));
        }
        Ok(data[31] != 0)
    }

    /// One-line description for logs and messages
    pub fn describe(&self) -> String {
        match self {
            CallOutcome::Returned(data) if data.is_empty() => "returned no data".to_string(),
            CallOutcome::Returned(data) => format!("returned 0x{}", hex::encode(data)),
            CallOutcome::Reverted(reason) => format!("reverted ({})", reason),
            CallOutcome::Failed(message) => format!("failed ({})", message),
        }
    }
}

fn expect_custom<'a>(reason: &'a RevertReason, name: &str) -> SuiteResult<&'a RevertReason> {
    match reason.custom_name() {
        Some(got) if got == name => Ok(reason),
        _ => Err(SuiteError::assertion(format!(
            "expected custom error {}, got {}",
            name, reason
        ))),
    }
}

fn expect_message(reason: &RevertReason, message: &str) -> SuiteResult<()> {
    match reason {
        RevertReason::Message(got) if got == message => Ok(()),
        other => Err(SuiteError::assertion(format!(
            "expected revert {:?}, got {}",
            message, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_sdk::abi::Token;
    use edge_sdk::Log;

    fn mined(status: TxStatus) -> TxOutcome {
        TxOutcome::Mined {
            hash: H256::from_bytes([1; 32]),
            receipt: Receipt {
                transaction_hash: H256::from_bytes([1; 32]),
                block_number: 1,
                from: Address::from_account_num(1002),
                to: None,
                status,
                gas_used: 21000,
                cumulative_gas_used: 21000,
                contract_address: None,
                logs: Vec::<Log>::new(),
            },
        }
    }

    fn rejected(reason: Option<RevertReason>) -> TxOutcome {
        TxOutcome::Rejected {
            message: "execution reverted".to_string(),
            reason,
        }
    }

    fn refused(message: &str) -> TxOutcome {
        TxOutcome::Rejected {
            message: message.to_string(),
            reason: None,
        }
    }

    fn word(last: u8) -> Bytes {
        let mut w = vec![0u8; 32];
        w[31] = last;
        Bytes::from(w)
    }

    #[test]
    fn test_tx_success_and_failure() {
        assert!(mined(TxStatus::Success).expect_success().is_ok());
        assert!(mined(TxStatus::Success).expect_failure().is_err());

        assert!(mined(TxStatus::Failure).expect_success().is_err());
        assert!(mined(TxStatus::Failure).expect_failure().is_ok());

        let reverted = rejected(Some(RevertReason::Empty));
        assert!(reverted.expect_success().is_err());
        assert!(reverted.expect_failure().is_ok());
        assert!(reverted.hash().is_none());

        assert!(mined(TxStatus::Failure).expect_submitted().is_ok());
        assert!(reverted.expect_submitted().is_err());
    }

    #[test]
    fn test_refusal_is_not_a_revert() {
        for message in [
            "nonce too low",
            "insufficient funds for gas * price + value",
            "INSUFFICIENT_TX_FEE",
        ] {
            let err = refused(message).expect_failure().unwrap_err();
            assert!(err.to_string().contains(message), "{}", err);
        }
    }

    #[test]
    fn test_tx_custom_error() {
        let custom = RevertReason::Custom {
            name: "InsufficientBalance".to_string(),
            args: vec![Token::uint(1u64), Token::uint(100u64)],
        };
        let outcome = rejected(Some(custom));
        assert!(outcome.expect_custom_error("InsufficientBalance").is_ok());
        assert!(outcome.expect_custom_error("Other").is_err());
        assert!(rejected(None).expect_custom_error("InsufficientBalance").is_err());
        assert!(mined(TxStatus::Failure).expect_custom_error("InsufficientBalance").is_err());
    }

    #[test]
    fn test_tx_describe() {
        assert_eq!(
            rejected(Some(RevertReason::Message("no".to_string()))).describe(),
            "rejected (reverted: \"no\")"
        );
        assert!(mined(TxStatus::Failure).describe().ends_with("with status 0"));
    }

    #[test]
    fn test_call_empty_return() {
        assert!(CallOutcome::Returned(Bytes::new()).expect_empty_return().is_ok());
        assert!(CallOutcome::Returned(word(1)).expect_empty_return().is_err());
        assert!(CallOutcome::Reverted(RevertReason::Empty)
            .expect_empty_return()
            .is_err());
    }

    #[test]
    fn test_call_bool_and_address() {
        assert!(CallOutcome::Returned(word(1)).expect_bool().unwrap());
        assert!(!CallOutcome::Returned(word(0)).expect_bool().unwrap());
        assert!(CallOutcome::Returned(Bytes::new()).expect_bool().is_err());

        let addr = Address::from_account_num(1003);
        let out = CallOutcome::Returned(Bytes::from(addr.to_word().to_vec()));
        assert_eq!(out.expect_address().unwrap(), addr);
        assert_eq!(CallOutcome::Returned(Bytes::new()).returned_address(), None);
        assert!(CallOutcome::Failed("x".to_string()).expect_address().is_err());
    }

    #[test]
    fn test_call_revert_kinds() {
        let panic = CallOutcome::Reverted(RevertReason::Panic(U256::from(0x12)));
        assert!(panic.expect_panic(0x12).is_ok());
        assert!(panic.expect_panic(0x01).is_err());
        assert!(panic.expect_revert_message("x").is_err());

        let msg = CallOutcome::Reverted(RevertReason::Message("revertWithMessage".to_string()));
        assert!(msg.expect_revert_message("revertWithMessage").is_ok());
        assert!(msg.expect_revert().is_ok());

        let refused = CallOutcome::Failed("insufficient funds for gas * price + value".to_string());
        assert!(refused.expect_revert().is_err());
        assert!(CallOutcome::Returned(Bytes::new()).expect_revert().is_err());
    }
}
