//! HTTP client for JSON-RPC calls to the POS server

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shared::rpc::{RpcRequest, RpcResponse};
use shared::{CatalogSnapshot, Product, ProductId};

use crate::{ClientConfig, ClientError, ClientResult};

/// Model exposing the POS-specific lookups
const POS_CONFIG_MODEL: &str = "pos.config";
/// Product variant model
const PRODUCT_MODEL: &str = "product.product";

/// HTTP client for making JSON-RPC requests to the POS server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    next_id: Arc<AtomicU64>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout {
            builder = builder.timeout(std::time::Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Invoke `model.method(*args)` through `call_kw`
    ///
    /// Returns `None` when the server answers with a null result.
    pub async fn call_kw<T: DeserializeOwned>(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
    ) -> ClientResult<Option<T>> {
        let url = format!(
            "{}/web/dataset/call_kw/{}/{}",
            self.base_url.trim_end_matches('/'),
            model,
            method
        );
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest::call_kw(id, model, method, args);

        let mut request = self.client.post(&url).json(&body);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        tracing::debug!(model, method, id, "JSON-RPC call");
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<Option<T>> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        let envelope: RpcResponse<Value> = serde_json::from_str(&text)
            .map_err(|e| ClientError::InvalidResponse(format!("not a JSON-RPC envelope: {e}")))?;

        match envelope.into_result() {
            Ok(None) | Ok(Some(Value::Null)) => Ok(None),
            Ok(Some(value)) => serde_json::from_value(value).map(Some).map_err(Into::into),
            Err(err) => Err(ClientError::Rpc {
                code: err.code,
                message: err.detail().to_string(),
            }),
        }
    }

    // ========== POS API ==========

    /// Look up a barcode on the server
    ///
    /// Returns the raw payload: `None` when nothing matched, otherwise either
    /// a product record or a `multiple_variants` object.
    pub async fn product_by_barcode(
        &self,
        pos_config_id: i64,
        barcode: &str,
    ) -> ClientResult<Option<Value>> {
        self.call_kw(
            POS_CONFIG_MODEL,
            "_get_product_by_barcode",
            vec![json!(pos_config_id), json!(barcode)],
        )
        .await
    }

    /// Read full product records by id
    pub async fn read_products(&self, ids: &[ProductId]) -> ClientResult<Vec<Product>> {
        let records: Option<Vec<Product>> = self
            .call_kw(PRODUCT_MODEL, "read", vec![json!(ids)])
            .await?;
        Ok(records.unwrap_or_default())
    }

    /// Load the products and templates available in a POS configuration
    pub async fn load_catalog(&self, pos_config_id: i64) -> ClientResult<CatalogSnapshot> {
        let snapshot: Option<CatalogSnapshot> = self
            .call_kw(POS_CONFIG_MODEL, "load_pos_catalog", vec![json!(pos_config_id)])
            .await?;
        snapshot.ok_or_else(|| ClientError::InvalidResponse("Missing catalog data".to_string()))
    }
}
