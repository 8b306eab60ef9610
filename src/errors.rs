//! Structured error types for the discovery pipeline.
//!
//! Each enum maps to one failure domain: transport/subscription problems
//! that drive the reconnect logic, transaction fetches that exhausted
//! their retries, and transactions that do not match the expected
//! instruction layout. Persistence errors stay as `rusqlite::Error`
//! wrapped in `anyhow` at the call site.

use thiserror::Error;

/// Failures of the WebSocket subscription lifecycle.
///
/// Everything except `ReconnectExhausted` is recoverable: the monitor
/// rotates endpoints and reconnects. `ReconnectExhausted` is the only
/// process-fatal error in the crate.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("websocket connect failed for {endpoint}: {message}")]
    Connect { endpoint: String, message: String },

    #[error("subscribe request failed: {0}")]
    Subscribe(String),

    #[error("websocket receive failed: {0}")]
    Receive(String),

    #[error("websocket connection closed by server")]
    ConnectionClosed,

    #[error("gave up reconnecting after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },
}

/// A transaction fetch that gave up.
///
/// `NotAvailable` means the endpoint kept returning an empty result,
/// which usually indicates propagation lag rather than a broken endpoint.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error fetching {signature}: {message}")]
    Transport { signature: String, message: String },

    #[error("transaction {signature} not available after {attempts} attempts")]
    NotAvailable { signature: String, attempts: u32 },
}

/// A fetched transaction that does not match the pool initialization
/// contract. Expected for unrelated transactions that merely passed the
/// keyword filter; the candidate is dropped without a persistence attempt.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no instruction from the monitored program")]
    NoProgramInstruction,

    #[error("instruction has {got} accounts, layout needs at least {min}")]
    AccountsTooShort { got: usize, min: usize },

    #[error("transaction has no block time")]
    MissingBlockTime,

    #[error("transaction has no signature")]
    MissingSignature,

    #[error("invalid account address {address}: {message}")]
    InvalidAddress { address: String, message: String },
}
