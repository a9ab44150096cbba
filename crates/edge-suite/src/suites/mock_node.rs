//! Scripted node for running suites against [`MockTransport`]

use std::time::Duration;

use edge_primitives::Address;
use edge_sdk::abi::{encode, Token};
use edge_sdk::{ArtifactStore, EthClient, MockTransport};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::{Harness, NetworkProfile};

fn param(ty: &str) -> Value {
    json!({"name": "", "type": ty})
}

fn params(types: &[&str]) -> Vec<Value> {
    types.iter().map(|ty| param(ty)).collect()
}

/// ABI entry of a function
pub(crate) fn function(name: &str, inputs: &[&str], outputs: &[&str]) -> Value {
    json!({
        "type": "function",
        "name": name,
        "inputs": params(inputs),
        "outputs": params(outputs),
        "stateMutability": "nonpayable"
    })
}

/// ABI entry of a constructor
pub(crate) fn constructor(inputs: &[&str]) -> Value {
    json!({"type": "constructor", "inputs": params(inputs), "stateMutability": "nonpayable"})
}

/// ABI entry of a custom error
pub(crate) fn error(name: &str, inputs: &[&str]) -> Value {
    json!({"type": "error", "name": name, "inputs": params(inputs)})
}

const TX_HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

fn receipt(status: &str, contract: Value) -> Value {
    json!({
        "transactionHash": TX_HASH,
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

/// A harness over a scripted transport. Unscripted transactions mine with
/// status 1 and unscripted calls return no data.
pub(crate) struct MockNode {
    pub transport: MockTransport,
    pub harness: Harness,
    _artifacts: TempDir,
}

impl MockNode {
    /// Node answering as `hedera_local`
    pub async fn new(artifacts: &[(&str, Vec<Value>)]) -> Self {
        Self::on("hedera_local", artifacts).await
    }

    /// Node answering as the built-in profile `network`
    pub async fn on(network: &str, artifacts: &[(&str, Vec<Value>)]) -> Self {
        let mut profile = NetworkProfile::builtin(network).unwrap();
        profile.settle_delay = Duration::ZERO;
        profile.poll_interval = Duration::from_millis(1);
        profile.timeout = Duration::from_secs(5);

        let dir = tempfile::tempdir().unwrap();
        for (name, abi) in artifacts {
            let (source, contract) = name.rsplit_once(':').unwrap();
            let path = dir.path().join(source);
            std::fs::create_dir_all(&path).unwrap();
            let artifact = json!({
                "contractName": contract,
                "sourceName": source,
                "abi": abi,
                "bytecode": "0x6080604052",
                "deployedBytecode": "0x6080"
            });
            std::fs::write(path.join(format!("{}.json", contract)), artifact.to_string())
                .unwrap();
        }

        let transport = MockTransport::new();
        transport.set_response("eth_chainId", json!(format!("0x{:x}", profile.chain_id)));
        transport.set_response("eth_getTransactionReceipt", receipt("0x1", Value::Null));
        let client = EthClient::with_transport(transport.clone());
        let harness = Harness::new(client, profile, ArtifactStore::new(dir.path()))
            .await
            .unwrap();

        Self {
            transport,
            harness,
            _artifacts: dir,
        }
    }

    /// Next submission is accepted, so a scripted refusal lands on the one
    /// after it
    pub fn accepts(&self) {
        self.transport
            .push_response("eth_sendRawTransaction", json!(TX_HASH));
    }

    /// Next transaction mines as a creation of `address`
    pub fn deploys_at(&self, address: Address) {
        self.transport
            .push_response("eth_getTransactionReceipt", receipt("0x1", json!(address.to_hex())));
    }

    /// Next transaction mines with status 1 or 0
    pub fn mines(&self, success: bool) {
        let status = if success { "0x1" } else { "0x0" };
        self.transport
            .push_response("eth_getTransactionReceipt", receipt(status, Value::Null));
    }

    /// Next `eth_call` returns `tokens` encoded
    pub fn returns(&self, tokens: &[Token]) {
        let data = format!("0x{}", hex::encode(encode(tokens)));
        self.transport.push_response("eth_call", json!(data));
    }

    /// Next `eth_call` reverts with `data`
    pub fn call_reverts(&self, data: &[u8]) {
        let data = format!("0x{}", hex::encode(data));
        self.transport
            .push_error("eth_call", 3, "execution reverted", Some(&data));
    }

    /// Next request for `method` is refused without executing
    pub fn refuses(&self, method: &str, message: &str) {
        self.transport.push_error(method, -32000, message, None);
    }

    /// Transactions submitted so far
    pub fn submitted(&self) -> usize {
        self.transport.requests_for("eth_sendRawTransaction").len()
    }
}
