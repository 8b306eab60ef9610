// Retrying `getTransaction` fetches.
//
// A transport error and an empty result are retried on different delays:
// an empty result usually means the finalized transaction has not
// propagated to this endpoint yet, so it gets the longer wait.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::time::sleep;

use crate::config::FetchConfig;
use crate::errors::FetchError;
use crate::logger::Logger;
use crate::transactions::types::TransactionRecord;

#[derive(Debug, Deserialize)]
struct RpcReply<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

pub struct TransactionFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl TransactionFetcher {
    pub fn new(config: FetchConfig) -> Self {
        let client = reqwest::Client
            ::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("pooltracker/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Fetch the full transaction for `signature` from `rpc_url`.
    ///
    /// No state is mutated on failure; the caller decides what a dropped
    /// candidate means.
    pub async fn fetch(
        &self,
        rpc_url: &str,
        signature: &str
    ) -> Result<TransactionRecord, FetchError> {
        let payload =
            json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getTransaction",
            "params": [signature, {"encoding": "jsonParsed", "maxSupportedTransactionVersion": 0}]
        });

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            Logger::rpc(
                &format!(
                    "Fetching transaction {} (attempt {}/{})",
                    signature,
                    attempt,
                    self.config.max_retries
                )
            );

            // Spread requests out so a burst of candidates does not trip
            // endpoint rate limits.
            sleep(Duration::from_millis(self.config.rate_limit_ms)).await;

            match self.request(rpc_url, &payload).await {
                Ok(Some(record)) => {
                    return Ok(record);
                }
                Ok(None) => {
                    if attempt >= self.config.max_retries {
                        return Err(FetchError::NotAvailable {
                            signature: signature.to_string(),
                            attempts: attempt,
                        });
                    }
                    Logger::rpc(
                        &format!(
                            "Transaction {} not visible yet, retrying in {}s",
                            signature,
                            self.config.propagation_delay_secs
                        )
                    );
                    sleep(Duration::from_secs(self.config.propagation_delay_secs)).await;
                }
                Err(message) => {
                    if attempt >= self.config.max_retries {
                        return Err(FetchError::Transport {
                            signature: signature.to_string(),
                            message,
                        });
                    }
                    Logger::warn(
                        &format!(
                            "Transaction fetch attempt {} failed, retrying in {}s: {}",
                            attempt,
                            self.config.retry_delay_secs,
                            message
                        )
                    );
                    sleep(Duration::from_secs(self.config.retry_delay_secs)).await;
                }
            }
        }
    }

    async fn request(
        &self,
        rpc_url: &str,
        payload: &serde_json::Value
    ) -> Result<Option<TransactionRecord>, String> {
        let response = self.client
            .post(rpc_url)
            .json(payload)
            .send().await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let reply: RpcReply<TransactionRecord> = response
            .json().await
            .map_err(|e| format!("malformed response: {}", e))?;

        if let Some(error) = reply.error {
            return Err(format!("RPC error {}: {}", error.code, error.message));
        }

        Ok(reply.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> FetchConfig {
        FetchConfig {
            max_retries: 2,
            retry_delay_secs: 0,
            propagation_delay_secs: 0,
            request_timeout_secs: 2,
            rate_limit_ms: 0,
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_exhausts_retries_as_transport_error() {
        let fetcher = TransactionFetcher::new(fast_config());

        let result = fetcher.fetch("http://127.0.0.1:9", "SIG1").await;

        match result {
            Err(FetchError::Transport { signature, .. }) => assert_eq!(signature, "SIG1"),
            other => panic!("expected transport error, got {:?}", other.map(|_| ())),
        }
    }
}
