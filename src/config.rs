use anyhow::{ Context, Result };
use serde::{ Deserialize, Serialize };
use std::fs;
use std::path::Path;

use crate::pools::parser::RAYDIUM_AMM_V4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rpc_endpoints: Vec<String>,
    /// Derived from `rpc_endpoints` when left empty.
    #[serde(default)]
    pub ws_endpoints: Vec<String>,
    /// Program whose log notifications are monitored.
    pub program_id: String,
    pub reconnect_interval_secs: u64,
    pub max_reconnect_attempts: u32,
    pub heartbeat_interval_secs: u64,
    #[serde(default)]
    pub debug_mode: bool,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Retry policy for `getTransaction` calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub max_retries: u32,
    /// Delay after a transport error.
    pub retry_delay_secs: u64,
    /// Longer delay after an empty result, giving the transaction time to
    /// propagate to the endpoint.
    pub propagation_delay_secs: u64,
    pub request_timeout_secs: u64,
    /// Pause before every request so candidate bursts do not trip rate limits.
    pub rate_limit_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_secs: 2,
            propagation_delay_secs: 5,
            request_timeout_secs: 30,
            rate_limit_ms: 200,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_endpoints: vec!["https://api.mainnet-beta.solana.com".to_string()],
            ws_endpoints: vec![],
            program_id: RAYDIUM_AMM_V4.to_string(),
            reconnect_interval_secs: 5,
            max_reconnect_attempts: 10,
            heartbeat_interval_secs: 30,
            debug_mode: false,
            database: DatabaseConfig {
                path: "raydium_pools.db".to_string(),
            },
            fetch: FetchConfig::default(),
        }
    }
}

impl Config {
    /// Load the config file, creating one with defaults when missing.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            let default_config = Self::default();
            default_config.save(path)?;
            return Ok(default_config);
        }

        let content = fs
            ::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Self = serde_json
            ::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_json
            ::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;

        fs::write(path, content).with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.rpc_endpoints.is_empty() || self.rpc_endpoints.iter().any(|e| e.trim().is_empty()) {
            return Err(anyhow::anyhow!("rpc_endpoints must contain at least one non-empty URL"));
        }
        if self.program_id.trim().is_empty() {
            return Err(anyhow::anyhow!("program_id is required in config"));
        }
        Ok(())
    }

    /// WebSocket endpoints, inferred from the RPC URLs when not configured.
    pub fn resolved_ws_endpoints(&self) -> Vec<String> {
        if !self.ws_endpoints.is_empty() {
            return self.ws_endpoints.clone();
        }
        self.rpc_endpoints
            .iter()
            .map(|endpoint| {
                if let Some(rest) = endpoint.strip_prefix("https://") {
                    format!("wss://{}", rest)
                } else if let Some(rest) = endpoint.strip_prefix("http://") {
                    format!("ws://{}", rest)
                } else {
                    endpoint.clone()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let path = path.to_str().unwrap();

        // First load creates the file with defaults
        let created = Config::load(path).unwrap();
        assert_eq!(created.program_id, RAYDIUM_AMM_V4);

        let reloaded = Config::load(path).unwrap();
        assert_eq!(reloaded.rpc_endpoints, created.rpc_endpoints);
        assert_eq!(reloaded.max_reconnect_attempts, 10);
        assert_eq!(reloaded.fetch.max_retries, 3);
    }

    #[test]
    fn ws_endpoints_derived_from_rpc_urls() {
        let mut config = Config::default();
        config.rpc_endpoints = vec![
            "https://rpc.example.com".to_string(),
            "http://127.0.0.1:8899".to_string()
        ];

        let ws = config.resolved_ws_endpoints();
        assert_eq!(ws, vec!["wss://rpc.example.com", "ws://127.0.0.1:8899"]);
    }

    #[test]
    fn explicit_ws_endpoints_win_over_derivation() {
        let mut config = Config::default();
        config.ws_endpoints = vec!["wss://push.example.com".to_string()];

        assert_eq!(config.resolved_ws_endpoints(), vec!["wss://push.example.com"]);
    }

    #[test]
    fn empty_rpc_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.rpc_endpoints = vec![];
        config.save(path).unwrap();

        assert!(Config::load(path).is_err());
    }
}
