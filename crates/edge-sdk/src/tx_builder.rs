//! Transaction builder

use bytes::Bytes;
use edge_primitives::Address;
use edge_types::{DynamicFeeTx, LegacyTx, SignedTransaction, TxSignature};

use crate::{SdkError, Wallet};

/// Transaction builder with fluent API
#[derive(Debug, Clone, Default)]
pub struct TxBuilder {
    chain_id: u64,
    nonce: Option<u64>,
    gas_limit: Option<u64>,
    gas_price: Option<u128>,
    max_fee_per_gas: Option<u128>,
    max_priority_fee_per_gas: Option<u128>,
    to: Option<Address>,
    value: u128,
    data: Bytes,
}

impl TxBuilder {
    /// Create a new transaction builder
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    /// Set the nonce
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Set the gas limit
    pub fn gas_limit(mut self, limit: u64) -> Self {
        self.gas_limit = Some(limit);
        self
    }

    /// Set the gas price (for legacy transactions)
    pub fn gas_price(mut self, price: u128) -> Self {
        self.gas_price = Some(price);
        self
    }

    /// Set max fee per gas (for EIP-1559 transactions)
    pub fn max_fee_per_gas(mut self, fee: u128) -> Self {
        self.max_fee_per_gas = Some(fee);
        self
    }

    /// Set max priority fee per gas (for EIP-1559 transactions)
    pub fn max_priority_fee_per_gas(mut self, fee: u128) -> Self {
        self.max_priority_fee_per_gas = Some(fee);
        self
    }

    /// Set the recipient. Leave unset to deploy.
    pub fn to(mut self, address: Address) -> Self {
        self.to = Some(address);
        self
    }

    /// Set the value to transfer (in wei)
    pub fn value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }

    /// Set the input data (calldata or init code)
    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    /// Build a legacy transaction (unsigned)
    pub fn build_legacy(&self) -> Result<LegacyTx, SdkError> {
        Ok(LegacyTx {
            nonce: required(self.nonce, "nonce")?,
            gas_price: required(self.gas_price, "gas_price")?,
            gas_limit: required(self.gas_limit, "gas_limit")?,
            to: self.to,
            value: self.value,
            data: self.data.clone(),
        })
    }

    /// Build an EIP-1559 transaction (unsigned)
    pub fn build_eip1559(&self) -> Result<DynamicFeeTx, SdkError> {
        Ok(DynamicFeeTx {
            chain_id: self.chain_id,
            nonce: required(self.nonce, "nonce")?,
            max_priority_fee_per_gas: required(
                self.max_priority_fee_per_gas,
                "max_priority_fee_per_gas",
            )?,
            max_fee_per_gas: required(self.max_fee_per_gas, "max_fee_per_gas")?,
            gas_limit: required(self.gas_limit, "gas_limit")?,
            to: self.to,
            value: self.value,
            data: self.data.clone(),
        })
    }

    /// Sign and build an EIP-155 legacy transaction
    pub fn sign_legacy(&self, wallet: &Wallet) -> Result<SignedTransaction, SdkError> {
        self.check_chain_id()?;
        let tx = self.build_legacy()?;
        let signature = wallet.sign_hash(&tx.signing_hash(self.chain_id))?;
        Ok(SignedTransaction::new_legacy(
            tx,
            TxSignature::eip155(&signature, self.chain_id),
        ))
    }

    /// Sign and build an EIP-1559 transaction
    pub fn sign_eip1559(&self, wallet: &Wallet) -> Result<SignedTransaction, SdkError> {
        self.check_chain_id()?;
        let tx = self.build_eip1559()?;
        let signature = wallet.sign_hash(&tx.signing_hash())?;
        Ok(SignedTransaction::new_dynamic_fee(
            tx,
            TxSignature::y_parity(&signature),
        ))
    }

    fn check_chain_id(&self) -> Result<(), SdkError> {
        if self.chain_id == 0 {
            return Err(SdkError::InvalidChainId(
                "chain id 0 gives no replay protection".to_string(),
            ));
        }
        Ok(())
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, SdkError> {
    value.ok_or_else(|| SdkError::MissingField(field.to_string()))
}
