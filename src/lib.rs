//! Resilient discovery of newly created Raydium liquidity pools.
//!
//! The crate subscribes to program log notifications over WebSocket,
//! filters them cheaply for pool creation keywords, fetches the full
//! transaction for each surviving candidate, extracts the pool and mint
//! addresses, resolves token symbols, and records every pool exactly once
//! in SQLite. The subscription survives endpoint failures by rotating
//! through configured endpoints with a bounded number of reconnects.

pub mod config;
pub mod database;
pub mod dedup;
pub mod endpoints;
pub mod errors;
pub mod logger;
pub mod monitor;
pub mod pools;
pub mod tokens;
pub mod transactions;
