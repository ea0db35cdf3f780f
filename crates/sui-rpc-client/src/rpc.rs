//! JSON-RPC fullnode client

use std::time::Duration;

use async_trait::async_trait;
use bucket_core::{ObjectId, RpcConfig, RpcError, SuiAddress};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use sui_tx::TransactionBlock;

use crate::types::*;
use crate::{resolve_inputs, ChainClient, Result};

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

/// Sui fullnode client over HTTP JSON-RPC
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl RpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RpcError::Unreachable {
                url: format!("{}: {}", config.url, e),
            })?;

        Ok(Self {
            http,
            url: config.url.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one JSON-RPC request and decode its `result`
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        tracing::trace!(method, "Sending JSON-RPC request");

        let response = timed_request(self.timeout, async {
            let response = self
                .http
                .post(&self.url)
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    if e.is_connect() {
                        RpcError::Unreachable {
                            url: self.url.clone(),
                        }
                    } else {
                        RpcError::ApiError {
                            message: e.to_string(),
                        }
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(RpcError::ApiError {
                    message: format!("HTTP {}: {}", status, text.trim()),
                });
            }

            response
                .json::<JsonRpcResponse<T>>()
                .await
                .map_err(|e| RpcError::ParseError(e.to_string()))
        })
        .await?;

        if let Some(err) = response.error {
            return Err(RpcError::JsonRpc {
                code: err.code,
                message: err.message,
            });
        }

        response
            .result
            .ok_or_else(|| RpcError::ParseError("response has no result".to_string()))
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn get_object(
        &self,
        object_id: &ObjectId,
        options: ObjectDataOptions,
    ) -> Result<SuiObjectResponse> {
        self.call("sui_getObject", json!([object_id, options])).await
    }

    async fn multi_get_objects(
        &self,
        object_ids: &[ObjectId],
        options: ObjectDataOptions,
    ) -> Result<Vec<SuiObjectResponse>> {
        if object_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.call("sui_multiGetObjects", json!([object_ids, options]))
            .await
    }

    async fn get_dynamic_fields(
        &self,
        parent_id: &ObjectId,
        cursor: Option<String>,
        limit: Option<usize>,
    ) -> Result<Page<DynamicFieldInfo>> {
        self.call("suix_getDynamicFields", json!([parent_id, cursor, limit]))
            .await
    }

    async fn get_dynamic_field_object(
        &self,
        parent_id: &ObjectId,
        name: &DynamicFieldName,
    ) -> Result<SuiObjectResponse> {
        self.call("suix_getDynamicFieldObject", json!([parent_id, name]))
            .await
    }

    async fn get_owned_objects(
        &self,
        owner: &SuiAddress,
        query: &ObjectResponseQuery,
        cursor: Option<String>,
        limit: Option<usize>,
    ) -> Result<Page<SuiObjectResponse>> {
        self.call("suix_getOwnedObjects", json!([owner, query, cursor, limit]))
            .await
    }

    async fn query_events(
        &self,
        filter: &EventFilter,
        cursor: Option<EventId>,
        limit: Option<usize>,
        descending: bool,
    ) -> Result<Page<SuiEvent, EventId>> {
        self.call(
            "suix_queryEvents",
            json!([filter, cursor, limit, descending]),
        )
        .await
    }

    async fn get_coins(
        &self,
        owner: &SuiAddress,
        coin_type: Option<&str>,
        cursor: Option<String>,
        limit: Option<usize>,
    ) -> Result<Page<Coin>> {
        self.call("suix_getCoins", json!([owner, coin_type, cursor, limit]))
            .await
    }

    async fn dev_inspect_transaction_block(
        &self,
        sender: &SuiAddress,
        tx: &TransactionBlock,
    ) -> Result<DevInspectResults> {
        let unresolved = tx.unresolved_objects();
        let tx = if unresolved.is_empty() {
            tx.clone()
        } else {
            let objects = self
                .multi_get_objects(&unresolved, ObjectDataOptions::owner())
                .await?;
            resolve_inputs(tx, &objects)?
        };

        let tx_bytes = sui_tx::transaction_kind_base64(&tx)
            .map_err(|e| RpcError::ApiError {
                message: e.to_string(),
            })?;

        self.call(
            "sui_devInspectTransactionBlock",
            json!([sender, tx_bytes, Value::Null, Value::Null]),
        )
        .await
    }
}

/// Bound a request future by the configured timeout.
async fn timed_request<T>(
    timeout: Duration,
    fut: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| RpcError::Timeout {
            secs: timeout.as_secs(),
        })?
}
