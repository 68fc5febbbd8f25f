//! JSON-RPC data source implementation
//!
//! Talks to Bitcoin Core for blocks and to spaced for the transactions that are
//! relevant to the Spaces protocol.

use super::{BlockBody, BlockData, ChainSource, Transaction};
use crate::{Config, Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a [Value],
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Minimal JSON-RPC client with retry logic
#[derive(Debug)]
pub struct RpcClient {
    url: String,
    http: reqwest::Client,
    auth: Option<(String, String)>,
    max_retries: u32,
    retry_delay: Duration,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a new client for the given endpoint
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            http,
            auth: None,
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            next_id: AtomicU64::new(1),
        })
    }

    /// Use HTTP basic auth
    pub fn with_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some((user.into(), password.into()));
        self
    }

    /// Set maximum retry attempts
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set retry delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` and decode its result
    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: &[Value]) -> Result<T> {
        let result = self.execute_with_retry(method, params).await?;
        serde_json::from_value(result)
            .map_err(|e| Error::parser(format!("invalid {} response: {}", method, e)))
    }

    /// Execute a call, retrying transport failures and 5xx responses only
    async fn execute_with_retry(&self, method: &str, params: &[Value]) -> Result<Value> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_delay + Duration::from_millis(rand::random::<u64>() % 250);
                tracing::debug!("Retrying {} after {:?} (attempt {})", method, delay, attempt);
                sleep(delay).await;
            }

            match self.send_once(method, params).await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        "RPC call {} on {} failed (attempt {}): {}",
                        method,
                        self.url,
                        attempt + 1,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(Error::Http(format!(
            "{} failed after {} attempts: {}",
            method,
            self.max_retries + 1,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    async fn send_once(&self, method: &str, params: &[Value]) -> Result<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let mut builder = self.http.post(&self.url).json(&request);
        if let Some((user, password)) = &self.auth {
            builder = builder.basic_auth(user, Some(password));
        }

        let resp = builder.send().await?;
        let status = resp.status();

        // Bitcoin Core reports RPC errors with 4xx/5xx and a JSON body
        let body = resp.text().await?;
        let parsed: RpcResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                return Err(Error::parser(format!("invalid JSON-RPC response: {}", e)));
            }
            Err(_) => {
                return Err(Error::HttpStatus {
                    status: status.as_u16(),
                    body,
                });
            }
        };

        if let Some(err) = parsed.error {
            return Err(Error::Rpc {
                method: method.to_string(),
                code: err.code,
                message: err.message,
            });
        }

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(parsed.result)
    }
}

/// Bitcoin Core + spaced backed chain source
#[derive(Debug)]
pub struct RpcChainSource {
    bitcoin: RpcClient,
    spaced: RpcClient,
}

impl RpcChainSource {
    pub fn new(bitcoin: RpcClient, spaced: RpcClient) -> Self {
        Self { bitcoin, spaced }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.rpc.timeout_secs);
        let retry_delay = Duration::from_millis(config.rpc.retry_delay_ms);

        let mut bitcoin = RpcClient::new(&config.bitcoin.url, timeout)?
            .with_max_retries(config.rpc.max_retries)
            .with_retry_delay(retry_delay);
        if let Some((user, password)) = config.bitcoin_credentials() {
            bitcoin = bitcoin.with_auth(user, password);
        }

        let spaced = RpcClient::new(&config.spaced.url, timeout)?
            .with_max_retries(config.rpc.max_retries)
            .with_retry_delay(retry_delay);

        tracing::debug!(
            "Using bitcoin node at {} and spaced at {}",
            bitcoin.url(),
            spaced.url()
        );

        Ok(Self::new(bitcoin, spaced))
    }
}

#[async_trait]
impl ChainSource for RpcChainSource {
    async fn tip_height(&self) -> Result<Option<u64>> {
        // getblockcount is the tip height; a node always has the genesis block
        let count: u64 = self.bitcoin.request("getblockcount", &[]).await?;
        Ok(Some(count))
    }

    async fn block_hash(&self, height: u64) -> Result<String> {
        self.bitcoin.request("getblockhash", &[json!(height)]).await
    }

    async fn block(&self, block_hash: &str) -> Result<BlockBody> {
        self.bitcoin.request("getblock", &[json!(block_hash)]).await
    }

    async fn relevant_transactions(&self, block_hash: &str) -> Result<Vec<Transaction>> {
        // spaced returns null for blocks it did not index
        let data: Option<BlockData> = self
            .spaced
            .request("getblockdata", &[json!(block_hash)])
            .await?;
        Ok(data.map(|d| d.tx_data).unwrap_or_default())
    }
}
