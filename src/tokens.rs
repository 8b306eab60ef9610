//! Mint-to-symbol resolution.
//!
//! Lookup order: in-memory cache, known-token table, `getAsset` metadata
//! call, then a deterministic placeholder built from the mint prefix.
//! Resolution never fails; every path returns a displayable string.
//! The cache is unbounded and lives for the process lifetime.

use std::collections::HashMap;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;

use crate::logger::Logger;

/// Well-known mints that never need a metadata lookup.
static KNOWN_TOKENS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("So11111111111111111111111111111111111111112", "SOL"),
        ("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USDC"),
        ("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", "USDT"),
        ("7dHbWXmci3dT8UFYWYZweBLXgycu7Y3iL6trKn1Y7ARj", "stSOL"),
    ])
});

#[derive(Debug, Deserialize)]
struct AssetReply {
    result: Option<AssetResult>,
}

#[derive(Debug, Deserialize)]
struct AssetResult {
    content: Option<AssetContent>,
}

#[derive(Debug, Deserialize)]
struct AssetContent {
    metadata: Option<AssetMetadata>,
}

#[derive(Debug, Deserialize)]
struct AssetMetadata {
    symbol: Option<String>,
}

pub struct SymbolResolver {
    client: reqwest::Client,
    cache: HashMap<String, String>,
}

impl SymbolResolver {
    pub fn new() -> Self {
        let client = reqwest::Client
            ::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("pooltracker/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            cache: HashMap::new(),
        }
    }

    /// Resolve `mint` to a display symbol.
    pub async fn resolve(&mut self, rpc_url: &str, mint: &str) -> String {
        if let Some(symbol) = self.cache.get(mint) {
            return symbol.clone();
        }

        if let Some(symbol) = KNOWN_TOKENS.get(mint) {
            self.cache.insert(mint.to_string(), symbol.to_string());
            return symbol.to_string();
        }

        let symbol = match self.lookup_symbol(rpc_url, mint).await {
            Ok(symbol) => symbol,
            Err(message) => {
                Logger::debug(&format!("Symbol lookup failed for {}: {}", mint, message));
                placeholder_symbol(mint)
            }
        };

        // Placeholders are cached too; a mint that failed resolution once
        // would fail again on the same endpoint.
        self.cache.insert(mint.to_string(), symbol.clone());
        symbol
    }

    async fn lookup_symbol(&self, rpc_url: &str, mint: &str) -> Result<String, String> {
        let payload =
            json!({
            "jsonrpc": "2.0",
            "id": "token-info",
            "method": "getAsset",
            "params": {"id": mint}
        });

        let response = self.client
            .post(rpc_url)
            .json(&payload)
            .send().await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let reply: AssetReply = response
            .json().await
            .map_err(|e| format!("malformed response: {}", e))?;

        reply.result
            .and_then(|result| result.content)
            .and_then(|content| content.metadata)
            .and_then(|metadata| metadata.symbol)
            .filter(|symbol| !symbol.trim().is_empty())
            .ok_or_else(|| "metadata carried no symbol".to_string())
    }
}

impl Default for SymbolResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic fallback symbol derived from the mint prefix.
fn placeholder_symbol(mint: &str) -> String {
    let prefix: String = mint.chars().take(4).collect();
    format!("{}...", prefix)
}
