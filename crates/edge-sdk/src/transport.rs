//! Transport layer for RPC communication

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::SdkError;

/// Transport trait for RPC communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an RPC request and get the JSON `result`.
    ///
    /// A JSON `null` result is returned as `Value::Null`, not as an error.
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError>;
}

/// Helper to deserialize response
pub fn deserialize_response<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, SdkError> {
    serde_json::from_value(value).map_err(|e| SdkError::Serialization(e.to_string()))
}

/// A request seen by [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// JSON-RPC method
    pub method: String,
    /// Positional params
    pub params: Vec<Value>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Result(Value),
    Error {
        code: i64,
        message: String,
        data: Option<String>,
    },
}

#[derive(Default)]
struct MockState {
    defaults: HashMap<String, Value>,
    queued: HashMap<String, VecDeque<Scripted>>,
    requests: Vec<RecordedRequest>,
}

/// Scriptable in-memory transport.
///
/// Queued responses are consumed first, one per call; afterwards the
/// method's default answers. Clones share state, so a test can keep a
/// handle after moving one into a client.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a new mock transport with defaults for the common methods
    pub fn new() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert("eth_chainId".to_string(), Value::String("0x1".to_string()));
        defaults.insert("eth_gasPrice".to_string(), Value::String("0x3b9aca00".to_string()));
        defaults.insert("eth_blockNumber".to_string(), Value::String("0x100".to_string()));
        defaults.insert(
            "eth_getBalance".to_string(),
            Value::String("0xde0b6b3a7640000".to_string()),
        );
        defaults.insert("eth_getTransactionCount".to_string(), Value::String("0x0".to_string()));
        defaults.insert("eth_estimateGas".to_string(), Value::String("0x5208".to_string()));
        defaults.insert(
            "eth_sendRawTransaction".to_string(),
            Value::String(
                "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b".to_string(),
            ),
        );
        defaults.insert("eth_call".to_string(), Value::String("0x".to_string()));
        defaults.insert("eth_getCode".to_string(), Value::String("0x".to_string()));
        defaults.insert("eth_getTransactionReceipt".to_string(), Value::Null);

        Self {
            state: Arc::new(Mutex::new(MockState {
                defaults,
                ..Default::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock()
    }

    /// Replace the default response for `method`
    pub fn set_response(&self, method: &str, response: Value) {
        self.state().defaults.insert(method.to_string(), response);
    }

    /// Queue a one-shot response for `method`
    pub fn push_response(&self, method: &str, response: Value) {
        self.state()
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(Scripted::Result(response));
    }

    /// Queue a one-shot JSON-RPC error for `method`
    pub fn push_error(&self, method: &str, code: i64, message: &str, data: Option<&str>) {
        self.state()
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(Scripted::Error {
                code,
                message: message.to_string(),
                data: data.map(str::to_string),
            });
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Requests received for one method
    pub fn requests_for(&self, method: &str) -> Vec<RecordedRequest> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Clear queued responses and the request log
    pub fn clear(&self) {
        let mut state = self.state();
        state.queued.clear();
        state.requests.clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError> {
        let mut state = self.state();
        state.requests.push(RecordedRequest {
            method: method.to_string(),
            params,
        });

        let scripted = state.queued.get_mut(method).and_then(VecDeque::pop_front);
        match scripted {
            Some(Scripted::Result(value)) => Ok(value),
            Some(Scripted::Error {
                code,
                message,
                data,
            }) => Err(SdkError::Rpc {
                code,
                message,
                data,
            }),
            None => state.defaults.get(method).cloned().ok_or_else(|| SdkError::Rpc {
                code: -32601,
                message: format!("Method not found: {}", method),
                data: None,
            }),
        }
    }
}

/// HTTP transport for real RPC communication
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    request_id: std::sync::atomic::AtomicU64,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a new HTTP transport with a per-request timeout
    pub fn new(url: &str, timeout: std::time::Duration) -> Result<Self, SdkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SdkError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
            request_id: std::sync::atomic::AtomicU64::new(1),
        })
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError> {
        let id = self.next_id();
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        tracing::debug!(id, method, url = %self.url, "rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SdkError::Timeout(format!("{} after request timeout", method))
                } else {
                    SdkError::Transport(e.to_string())
                }
            })?;

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        if let Some(error) = response.error {
            tracing::debug!(id, method, code = error.code, message = %error.message, "rpc error");
            return Err(SdkError::Rpc {
                code: error.code,
                message: error.message,
                data: error.data.map(|d| match d {
                    Value::String(s) => s,
                    other => other.to_string(),
                }),
            });
        }

        Ok(response.result)
    }
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<JsonRpcError>,
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_transport_default_responses() {
        let transport = MockTransport::new();

        let result = transport.request_json("eth_chainId", vec![]).await.unwrap();
        assert_eq!(result, json!("0x1"));

        let result = transport
            .request_json("eth_getTransactionReceipt", vec![json!("0xab")])
            .await
            .unwrap();
        assert!(result.is_null());
    }

    #[tokio::test]
    async fn test_mock_transport_queue_before_default() {
        let transport = MockTransport::new();
        transport.push_response("eth_chainId", json!("0x12a"));

        assert_eq!(
            transport.request_json("eth_chainId", vec![]).await.unwrap(),
            json!("0x12a")
        );
        assert_eq!(
            transport.request_json("eth_chainId", vec![]).await.unwrap(),
            json!("0x1")
        );
    }

    #[tokio::test]
    async fn test_mock_transport_scripted_error() {
        let transport = MockTransport::new();
        transport.push_error("eth_estimateGas", 3, "execution reverted", Some("0x"));

        match transport.request_json("eth_estimateGas", vec![]).await {
            Err(SdkError::Rpc { code, message, data }) => {
                assert_eq!(code, 3);
                assert_eq!(message, "execution reverted");
                assert_eq!(data.as_deref(), Some("0x"));
            }
            other => panic!("expected rpc error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mock_transport_records_requests() {
        let transport = MockTransport::new();
        let handle = transport.clone();

        transport
            .request_json("eth_getCode", vec![json!("0x00"), json!("latest")])
            .await
            .unwrap();
        transport.request_json("eth_chainId", vec![]).await.unwrap();

        assert_eq!(handle.requests().len(), 2);
        let code = handle.requests_for("eth_getCode");
        assert_eq!(code[0].params, vec![json!("0x00"), json!("latest")]);

        handle.clear();
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_mock_transport_unknown_method() {
        let transport = MockTransport::new();
        let result = transport.request_json("unknown_method", vec![]).await;
        assert!(matches!(result, Err(SdkError::Rpc { code: -32601, .. })));
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_null_result_deserializes() {
        let parsed: JsonRpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert!(parsed.result.is_null());
        assert!(parsed.error.is_none());

        let parsed: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":3,"message":"execution reverted","data":"0x4e487b71"}}"#,
        )
        .unwrap();
        let err = parsed.error.unwrap();
        assert_eq!(err.code, 3);
        assert_eq!(err.data, Some(json!("0x4e487b71")));
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_http_transport_unreachable() {
        let transport =
            HttpTransport::new("http://127.0.0.1:9", std::time::Duration::from_secs(2)).unwrap();
        let err = transport.request_json("eth_chainId", vec![]).await.unwrap_err();
        assert!(matches!(err, SdkError::Transport(_) | SdkError::Timeout(_)));
    }
}
