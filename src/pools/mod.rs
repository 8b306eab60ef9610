//! Pool discovery domain types and transaction parsing.

pub mod parser;

pub use parser::PoolInfoParser;

use chrono::{ DateTime, Utc };

/// A newly discovered liquidity pool.
///
/// Created once per unique signature that parses as a pool creation
/// event and never mutated afterwards (the symbol is filled in between
/// parsing and persistence). `address` is the durable natural key;
/// `signature` is the in-memory dedup key.
#[derive(Debug, Clone)]
pub struct PoolInfo {
    /// Pool account address.
    pub address: String,
    /// Signature of the originating transaction.
    pub signature: String,
    /// Block time of the transaction, not observation time.
    pub timestamp: DateTime<Utc>,
    pub slot: u64,
    /// The mint worth watching (the non-WSOL side of the pair).
    pub coin_mint: String,
    pub token_symbol: String,
}
