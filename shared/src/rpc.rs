//! JSON-RPC envelope types
//!
//! Model methods are invoked through `call_kw`:
//!
//! ```json
//! {
//!     "jsonrpc": "2.0",
//!     "method": "call",
//!     "id": 1,
//!     "params": {"model": "pos.config", "method": "_get_product_by_barcode",
//!                "args": [1, "5012345"], "kwargs": {}}
//! }
//! ```
//!
//! and answered with either `{"result": ...}` or `{"error": {...}}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON-RPC protocol version sent with every request
pub const JSONRPC_VERSION: &str = "2.0";

/// `call_kw` parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallKwParams {
    pub model: String,
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

/// JSON-RPC request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub params: CallKwParams,
}

impl RpcRequest {
    /// Build a `call_kw` request for `model.method(*args)`
    pub fn call_kw(
        id: u64,
        model: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Value>,
    ) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: "call".to_string(),
            id: Some(id),
            params: CallKwParams {
                model: model.into(),
                method: method.into(),
                args,
                kwargs: Map::new(),
            },
        }
    }
}

/// Error object returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcErrorObject {
    /// Most specific message available (`data.message` when present)
    pub fn detail(&self) -> &str {
        self.data
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .unwrap_or(&self.message)
    }
}

/// JSON-RPC response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl<T> RpcResponse<T> {
    /// Successful response
    pub fn ok(id: Option<u64>, result: T) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Error response
    pub fn error(id: Option<u64>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            id,
            result: None,
            error: Some(RpcErrorObject {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Split into the result or the error object
    pub fn into_result(self) -> Result<Option<T>, RpcErrorObject> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result),
        }
    }
}
