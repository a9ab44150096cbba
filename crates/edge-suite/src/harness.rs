//! Harness for driving a live node
//!
//! Wraps an [`EthClient`] with the signers and artifacts of one network
//! profile. Every send waits for the transaction to be mined, so cases read
//! as a straight sequence of deploy, invoke and inspect.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use edge_crypto::create_address;
use edge_primitives::{Address, H256, U256};
use edge_sdk::abi::{Abi, RevertReason, Token};
use edge_sdk::types::{BlockId, CallRequest};
use edge_sdk::{
    Artifact, ArtifactStore, Contract, EthClient, SdkError, SignedTransaction, TxBuilder, Wallet,
};
use parking_lot::Mutex;

use crate::network::{NetworkProfile, TxKind};
use crate::outcome::{CallOutcome, TxOutcome};
use crate::{SuiteError, SuiteResult};

/// Per-send settings
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    gas_limit: Option<u64>,
    value: U256,
    from: usize,
}

impl Overrides {
    /// Profile defaults, signer 0, no value
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed gas limit, skipping the profile default and estimation
    pub fn gas_limit(mut self, gas: u64) -> Self {
        self.gas_limit = Some(gas);
        self
    }

    /// Value in wei
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Index of the signer to send from
    pub fn from(mut self, signer: usize) -> Self {
        self.from = signer;
        self
    }

    fn value_u128(&self) -> SuiteResult<u128> {
        if self.value.bits() > 128 {
            return Err(SuiteError::Transaction(format!(
                "value {} does not fit a transaction",
                self.value
            )));
        }
        Ok(self.value.low_u128())
    }
}

/// A deployment attempt
#[derive(Debug, Clone)]
pub struct Deployment {
    /// Handle at the created address, or where the contract would have
    /// been created when the deployment failed
    pub contract: Contract,
    /// How the deployment went
    pub outcome: TxOutcome,
}

impl Deployment {
    /// The contract, if the deployment mined with status 1
    pub fn expect_deployed(&self) -> SuiteResult<&Contract> {
        self.outcome.expect_success()?;
        Ok(&self.contract)
    }

    /// Deployed address
    pub fn address(&self) -> &Address {
        self.contract.address()
    }
}

/// Connection, signers and artifacts for one network
pub struct Harness {
    client: EthClient,
    profile: NetworkProfile,
    artifacts: ArtifactStore,
    signers: Vec<Wallet>,
    tx_log: Mutex<Vec<H256>>,
}

impl Harness {
    /// Connect to the profile's endpoint over HTTP
    pub async fn connect(
        profile: NetworkProfile,
        artifacts_root: impl Into<PathBuf>,
    ) -> SuiteResult<Self> {
        let client = EthClient::connect(&profile.url, profile.timeout)
            .await
            .map_err(|e| SuiteError::Setup(format!("cannot reach {}: {}", profile.url, e)))?;
        Self::new(client, profile, ArtifactStore::new(artifacts_root)).await
    }

    /// Build over an existing client. The node must report the profile's
    /// chain id.
    pub async fn new(
        client: EthClient,
        profile: NetworkProfile,
        artifacts: ArtifactStore,
    ) -> SuiteResult<Self> {
        let chain_id = client.chain_id().await?;
        if chain_id != profile.chain_id {
            return Err(SuiteError::Setup(format!(
                "{} reports chain id {}, profile {} expects {}",
                profile.url, chain_id, profile.name, profile.chain_id
            )));
        }
        if profile.private_keys.is_empty() {
            return Err(SuiteError::Setup(format!(
                "profile {} has no signer keys",
                profile.name
            )));
        }

        let signers = profile
            .private_keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                Wallet::from_private_key_hex(key)
                    .map_err(|e| SuiteError::Setup(format!("signer {}: {}", i, e)))
            })
            .collect::<SuiteResult<Vec<_>>>()?;

        tracing::info!(
            network = %profile.name,
            chain_id,
            signers = signers.len(),
            "harness ready"
        );

        Ok(Self {
            client,
            profile,
            artifacts,
            signers,
            tx_log: Mutex::new(Vec::new()),
        })
    }

    /// Underlying client
    pub fn client(&self) -> &EthClient {
        &self.client
    }

    /// Active profile
    pub fn profile(&self) -> &NetworkProfile {
        &self.profile
    }

    /// Chain id
    pub fn chain_id(&self) -> u64 {
        self.profile.chain_id
    }

    /// Signer `index` of the profile
    pub fn signer(&self, index: usize) -> SuiteResult<&Wallet> {
        self.signers.get(index).ok_or_else(|| {
            SuiteError::Setup(format!(
                "signer {} requested, profile {} has {}",
                index,
                self.profile.name,
                self.signers.len()
            ))
        })
    }

    /// A fresh account that does not exist on chain yet
    pub fn random_wallet(&self) -> Wallet {
        Wallet::new_random()
    }

    /// Artifact by fully-qualified name
    pub fn artifact(&self, name: &str) -> SuiteResult<Arc<Artifact>> {
        Ok(self.artifacts.get(name)?)
    }

    /// Bind an artifact's ABI to `address`
    pub fn attach(&self, name: &str, address: Address) -> SuiteResult<Contract> {
        Ok(self.artifact(name)?.at(address))
    }

    // ==================== Transactions ====================

    /// Deploy `name` with constructor `args`
    pub async fn deploy(
        &self,
        name: &str,
        args: &[Token],
        overrides: Overrides,
    ) -> SuiteResult<Deployment> {
        let artifact = self.artifact(name)?;
        let data = artifact.deploy_data(args)?;
        let wallet = self.signer(overrides.from)?;

        let (nonce, outcome) = self
            .submit_with_nonce(
                wallet,
                None,
                Bytes::from(data),
                &overrides,
                Some(artifact.abi.as_ref()),
            )
            .await?;
        let address = outcome
            .receipt()
            .and_then(|r| r.contract_address)
            .unwrap_or_else(|| create_address(wallet.address(), nonce));

        match &outcome {
            TxOutcome::Mined { hash, receipt } if receipt.is_success() => {
                tracing::info!(contract = name, address = %address, tx = %hash, "deployed")
            }
            other => {
                tracing::info!(contract = name, outcome = %other.describe(), "deployment failed")
            }
        }

        Ok(Deployment {
            contract: artifact.at(address),
            outcome,
        })
    }

    /// Invoke `function` on `contract` in a transaction
    pub async fn send(
        &self,
        contract: &Contract,
        function: &str,
        args: &[Token],
        overrides: Overrides,
    ) -> SuiteResult<TxOutcome> {
        let data = contract.encode_call(function, args)?;
        let wallet = self.signer(overrides.from)?;
        let outcome = self
            .submit(wallet, Some(*contract.address()), data, &overrides, Some(contract.abi()))
            .await?;
        tracing::info!(
            function,
            to = %contract.address(),
            outcome = %outcome.describe(),
            "sent"
        );
        Ok(outcome)
    }

    /// Move `value` wei from signer `from` to `to`
    pub async fn transfer(&self, from: usize, to: Address, value: U256) -> SuiteResult<TxOutcome> {
        let overrides = Overrides::new().from(from).value(value);
        let outcome = self
            .submit(self.signer(from)?, Some(to), Bytes::new(), &overrides, None)
            .await?;
        tracing::info!(to = %to, value = %value, outcome = %outcome.describe(), "transfer");
        Ok(outcome)
    }

    /// Sign and submit a transaction from `wallet`, then wait for it.
    /// `overrides.from` is ignored; `abi` decodes custom errors.
    pub async fn submit(
        &self,
        wallet: &Wallet,
        to: Option<Address>,
        data: Bytes,
        overrides: &Overrides,
        abi: Option<&Abi>,
    ) -> SuiteResult<TxOutcome> {
        Ok(self
            .submit_with_nonce(wallet, to, data, overrides, abi)
            .await?
            .1)
    }

    async fn submit_with_nonce(
        &self,
        wallet: &Wallet,
        to: Option<Address>,
        data: Bytes,
        overrides: &Overrides,
        abi: Option<&Abi>,
    ) -> SuiteResult<(u64, TxOutcome)> {
        let sender = *wallet.address();
        let value = overrides.value_u128()?;
        let nonce = self.client.get_nonce(&sender, BlockId::Pending).await?;
        let gas_price = self.client.gas_price().await?;

        let gas_limit = match overrides.gas_limit.or(self.profile.default_gas_limit) {
            Some(gas) => gas,
            None => {
                let request = CallRequest {
                    from: Some(sender),
                    to,
                    value: (!overrides.value.is_zero()).then_some(overrides.value),
                    data: Some(data.clone()),
                    ..Default::default()
                };
                match self.client.estimate_gas(&request).await {
                    Ok(gas) => gas,
                    Err(e) => return Ok((nonce, rejection(e, abi)?)),
                }
            }
        };

        let mut builder = TxBuilder::new(self.profile.chain_id)
            .nonce(nonce)
            .gas_limit(gas_limit)
            .value(value)
            .data(data);
        if let Some(to) = to {
            builder = builder.to(to);
        }
        let tx = match self.profile.tx_kind {
            TxKind::Legacy => builder.gas_price(gas_price).sign_legacy(wallet)?,
            TxKind::Eip1559 => builder
                .max_priority_fee_per_gas(gas_price)
                .max_fee_per_gas(gas_price.saturating_mul(2))
                .sign_eip1559(wallet)?,
        };

        Ok((nonce, self.broadcast(&tx, abi).await?))
    }

    /// Submit an already signed transaction and wait for it
    pub async fn send_raw(&self, tx: &SignedTransaction) -> SuiteResult<TxOutcome> {
        self.broadcast(tx, None).await
    }

    async fn broadcast(&self, tx: &SignedTransaction, abi: Option<&Abi>) -> SuiteResult<TxOutcome> {
        let pending = match self.client.send_transaction(tx).await {
            Ok(pending) => pending,
            Err(e) => return rejection(e, abi),
        };
        let hash = *pending.hash();
        self.tx_log.lock().push(hash);

        let receipt = self
            .client
            .wait_for_receipt(&hash, self.profile.timeout, self.profile.poll_interval)
            .await?;
        Ok(TxOutcome::Mined { hash, receipt })
    }

    // ==================== Calls ====================

    /// Invoke `function` on `contract` with `eth_call`
    pub async fn static_call(
        &self,
        contract: &Contract,
        function: &str,
        args: &[Token],
        overrides: Overrides,
    ) -> SuiteResult<CallOutcome> {
        let data = contract.encode_call(function, args)?;
        let from = *self.signer(overrides.from)?.address();
        self.call_from(from, *contract.address(), data, overrides.value, Some(contract.abi()))
            .await
    }

    /// `eth_call` with arbitrary calldata from signer 0
    pub async fn raw_call(
        &self,
        to: Address,
        data: impl Into<Bytes>,
        value: U256,
    ) -> SuiteResult<CallOutcome> {
        let from = *self.signer(0)?.address();
        self.call_from(from, to, data.into(), value, None).await
    }

    async fn call_from(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        value: U256,
        abi: Option<&Abi>,
    ) -> SuiteResult<CallOutcome> {
        let mut request = CallRequest::new(to, data).from(from);
        if !value.is_zero() {
            request = request.value(value);
        }
        match self.client.call(&request, BlockId::Latest).await {
            Ok(out) => Ok(CallOutcome::Returned(out)),
            Err(e) if e.is_revert() => Ok(CallOutcome::Reverted(RevertReason::decode(
                &e.revert_data().unwrap_or_default(),
                abi,
            ))),
            Err(SdkError::Rpc { message, .. }) => Ok(CallOutcome::Failed(message)),
            Err(e) => Err(e.into()),
        }
    }

    // ==================== State ====================

    /// Runtime code at `address`
    pub async fn code_at(&self, address: &Address) -> SuiteResult<Bytes> {
        Ok(self.client.get_code(address, BlockId::Latest).await?)
    }

    /// Whether `address` has code
    pub async fn is_contract(&self, address: &Address) -> SuiteResult<bool> {
        Ok(!self.code_at(address).await?.is_empty())
    }

    /// Balance of `address` in wei
    pub async fn balance(&self, address: &Address) -> SuiteResult<U256> {
        Ok(self.client.get_balance(address, BlockId::Latest).await?)
    }

    /// Wait the profile's settle delay
    pub async fn settle(&self) {
        if self.profile.settle_delay.is_zero() {
            return;
        }
        tracing::debug!(delay = ?self.profile.settle_delay, "settling");
        tokio::time::sleep(self.profile.settle_delay).await;
    }

    /// Hashes submitted since the last call
    pub fn take_tx_hashes(&self) -> Vec<H256> {
        std::mem::take(&mut *self.tx_log.lock())
    }
}

/// An RPC error before a hash exists is a rejection; anything else is a
/// harness failure
fn rejection(err: SdkError, abi: Option<&Abi>) -> SuiteResult<TxOutcome> {
    let reason = if err.is_revert() {
        Some(RevertReason::decode(&err.revert_data().unwrap_or_default(), abi))
    } else {
        None
    };
    match err {
        SdkError::Rpc { message, .. } => Ok(TxOutcome::Rejected { message, reason }),
        other => Err(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_sdk::abi::ERROR_SELECTOR;
    use edge_sdk::MockTransport;
    use serde_json::{json, Value};
    use std::time::Duration;

    const COUNTER: &str = r#"{
        "contractName": "Counter",
        "sourceName": "contracts/Counter.sol",
        "abi": [
            {"type": "function", "name": "count", "inputs": [],
             "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view"},
            {"type": "function", "name": "bump", "inputs": [], "outputs": [],
             "stateMutability": "nonpayable"},
            {"type": "error", "name": "TooHigh", "inputs": [{"name": "max", "type": "uint256"}]}
        ],
        "bytecode": "0x6080604052",
        "deployedBytecode": "0x6080"
    }"#;

    fn profile() -> NetworkProfile {
        let mut profile = NetworkProfile::builtin("hedera_local").unwrap();
        profile.settle_delay = Duration::ZERO;
        profile.poll_interval = Duration::from_millis(1);
        profile
    }

    fn artifacts() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contracts/Counter.sol");
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("Counter.json"), COUNTER).unwrap();
        let store = ArtifactStore::new(dir.path());
        (dir, store)
    }

    fn receipt(hash: &str, status: &str, contract: Value) -> Value {
        json!({
            "transactionHash": hash,
            "blockNumber": "0x2",
            "from": "0x67d8d32e9bf1a9968a5ff53b87d777aa8ebbee69",
            "to": null,
            "status": status,
            "gasUsed": "0x5208",
            "cumulativeGasUsed": "0x5208",
            "contractAddress": contract,
            "logs": []
        })
    }

    async fn harness(transport: &MockTransport) -> (tempfile::TempDir, Harness) {
        transport.set_response("eth_chainId", json!("0x12a"));
        transport.set_response("eth_getTransactionCount", json!("0x5"));
        transport.set_response("eth_gasPrice", json!("0x1802ba9f400"));
        let (dir, store) = artifacts();
        let client = EthClient::with_transport(transport.clone());
        (dir, Harness::new(client, profile(), store).await.unwrap())
    }

    #[tokio::test]
    async fn test_chain_id_mismatch_is_setup_error() {
        let transport = MockTransport::new();
        transport.set_response("eth_chainId", json!("0x539"));
        let (_dir, store) = artifacts();
        let client = EthClient::with_transport(transport);
        assert!(matches!(
            Harness::new(client, profile(), store).await,
            Err(SuiteError::Setup(_))
        ));
    }

    #[tokio::test]
    async fn test_signers_loaded_from_profile() {
        let transport = MockTransport::new();
        let (_dir, harness) = harness(&transport).await;
        assert_eq!(
            harness.signer(1).unwrap().address().to_hex(),
            "0x05fba803be258049a27b820088bab1cad2058871"
        );
        assert!(harness.signer(2).is_err());
    }

    #[tokio::test]
    async fn test_deploy_uses_receipt_address() {
        let transport = MockTransport::new();
        let (_dir, harness) = harness(&transport).await;
        let hash = H256::from_bytes([0xaa; 32]).to_hex();
        transport.set_response("eth_sendRawTransaction", json!(hash));
        transport.push_response(
            "eth_getTransactionReceipt",
            receipt(&hash, "0x1", json!("0x00000000000000000000000000000000000003e9")),
        );

        let deployment = harness
            .deploy("contracts/Counter.sol:Counter", &[], Overrides::new())
            .await
            .unwrap();
        let contract = deployment.expect_deployed().unwrap();
        assert_eq!(contract.address(), &Address::from_account_num(1001));
        assert_eq!(harness.take_tx_hashes().len(), 1);
        assert!(harness.take_tx_hashes().is_empty());

        // Profile default gas, no estimation.
        assert!(transport.requests_for("eth_estimateGas").is_empty());
        let raw = &transport.requests_for("eth_sendRawTransaction")[0].params[0];
        let bytes = hex::decode(raw.as_str().unwrap().trim_start_matches("0x")).unwrap();
        let tx = SignedTransaction::decode(&bytes).unwrap();
        assert_eq!(tx.gas_limit(), 1_000_000_000);
        assert_eq!(tx.nonce(), 5);
        assert_eq!(tx.chain_id(), Some(298));
        assert!(tx.is_contract_creation());
    }

    #[tokio::test]
    async fn test_failed_deploy_predicts_address() {
        let transport = MockTransport::new();
        let (_dir, harness) = harness(&transport).await;
        let hash = H256::from_bytes([0xbb; 32]).to_hex();
        transport.set_response("eth_sendRawTransaction", json!(hash));
        transport.push_response("eth_getTransactionReceipt", receipt(&hash, "0x0", Value::Null));

        let deployment = harness
            .deploy("contracts/Counter.sol:Counter", &[], Overrides::new())
            .await
            .unwrap();
        assert!(deployment.expect_deployed().is_err());
        let sender = harness.signer(0).unwrap().address();
        assert_eq!(deployment.address(), &create_address(sender, 5));
    }

    #[tokio::test]
    async fn test_estimation_revert_is_rejection_with_custom_error() {
        let transport = MockTransport::new();
        let (_dir, mut harness) = harness(&transport).await;
        harness.profile.default_gas_limit = None;

        let contract = harness
            .attach("contracts/Counter.sol:Counter", Address::from_account_num(1001))
            .unwrap();
        let mut data = edge_sdk::abi::function_selector("TooHigh(uint256)").to_vec();
        data.extend(edge_sdk::abi::encode(&[Token::uint(10u64)]));
        transport.push_error(
            "eth_estimateGas",
            3,
            "execution reverted",
            Some(&format!("0x{}", hex::encode(&data))),
        );

        let outcome = harness
            .send(&contract, "bump", &[], Overrides::new())
            .await
            .unwrap();
        outcome.expect_custom_error("TooHigh").unwrap();
        outcome.expect_failure().unwrap();
        assert!(transport.requests_for("eth_sendRawTransaction").is_empty());
    }

    #[tokio::test]
    async fn test_submission_rejection_without_revert() {
        let transport = MockTransport::new();
        let (_dir, harness) = harness(&transport).await;
        transport.push_error(
            "eth_sendRawTransaction",
            -32000,
            "INSUFFICIENT_TX_FEE",
            None,
        );

        let outcome = harness
            .transfer(0, Address::from_account_num(800), U256::from(1))
            .await
            .unwrap();
        assert!(matches!(
            &outcome,
            TxOutcome::Rejected { reason: None, message } if message == "INSUFFICIENT_TX_FEE"
        ));
        // Never executed, so it is not the failure a reverting case wants.
        assert!(outcome.expect_failure().is_err());
    }

    #[tokio::test]
    async fn test_only_reverts_satisfy_expect_failure() {
        let transport = MockTransport::new();
        let (_dir, harness) = harness(&transport).await;
        let to = Address::from_account_num(0);

        transport.push_error("eth_sendRawTransaction", -32000, "nonce too low", None);
        let refused = harness.transfer(0, to, U256::from(1)).await.unwrap();
        let err = refused.expect_failure().unwrap_err();
        assert!(err.to_string().contains("nonce too low"));

        transport.push_error("eth_sendRawTransaction", 3, "execution reverted", Some("0x"));
        let reverted = harness.transfer(0, to, U256::from(1)).await.unwrap();
        assert_eq!(
            reverted,
            TxOutcome::Rejected {
                message: "execution reverted".to_string(),
                reason: Some(RevertReason::Empty),
            }
        );
        reverted.expect_failure().unwrap();
    }

    #[tokio::test]
    async fn test_eip1559_profile() {
        let transport = MockTransport::new();
        let (_dir, mut harness) = harness(&transport).await;
        harness.profile.tx_kind = TxKind::Eip1559;
        let hash = H256::from_bytes([0xcc; 32]).to_hex();
        transport.set_response("eth_sendRawTransaction", json!(hash));
        transport.push_response("eth_getTransactionReceipt", receipt(&hash, "0x1", Value::Null));

        harness
            .transfer(1, Address::from_account_num(800), U256::from(1))
            .await
            .unwrap()
            .expect_success()
            .unwrap();

        let raw = &transport.requests_for("eth_sendRawTransaction")[0].params[0];
        assert!(raw.as_str().unwrap().starts_with("0x02"));
    }

    #[tokio::test]
    async fn test_static_call_classification() {
        let transport = MockTransport::new();
        let (_dir, harness) = harness(&transport).await;
        let contract = harness
            .attach("contracts/Counter.sol:Counter", Address::from_account_num(1001))
            .unwrap();

        let mut revert = ERROR_SELECTOR.to_vec();
        revert.extend(edge_sdk::abi::encode(&[Token::string("nope")]));
        transport.push_error(
            "eth_call",
            3,
            "execution reverted: nope",
            Some(&format!("0x{}", hex::encode(&revert))),
        );
        transport.push_error("eth_call", -32602, "invalid params", None);
        transport.push_response("eth_call", json!("0x"));

        let first = harness
            .static_call(&contract, "count", &[], Overrides::new())
            .await
            .unwrap();
        first.expect_revert_message("nope").unwrap();

        let second = harness
            .raw_call(Address::from_account_num(2), Vec::new(), U256::zero())
            .await
            .unwrap();
        assert_eq!(second, CallOutcome::Failed("invalid params".to_string()));

        let third = harness
            .raw_call(Address::random(), Vec::new(), U256::from(10))
            .await
            .unwrap();
        third.expect_empty_return().unwrap();
        let sent = &transport.requests_for("eth_call")[2].params[0];
        assert_eq!(sent["value"], json!("0xa"));
    }

    #[tokio::test]
    async fn test_is_contract() {
        let transport = MockTransport::new();
        let (_dir, harness) = harness(&transport).await;
        transport.push_response("eth_getCode", json!("0x6080"));
        transport.push_response("eth_getCode", json!("0x"));
        assert!(harness.is_contract(&Address::from_account_num(1001)).await.unwrap());
        assert!(!harness.is_contract(&Address::random()).await.unwrap());
    }

    #[test]
    fn test_oversized_value_rejected() {
        let overrides = Overrides::new().value(U256::MAX);
        assert!(matches!(overrides.value_u128(), Err(SuiteError::Transaction(_))));
        assert_eq!(Overrides::new().value(U256::from(7)).value_u128().unwrap(), 7);
    }
}
