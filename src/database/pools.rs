use anyhow::Result;
use chrono::Utc;
use rusqlite::{ params, OptionalExtension };

use crate::database::Database;
use crate::pools::PoolInfo;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

impl Database {
    /// Record a discovered pool, keyed by its unique address.
    ///
    /// Returns true when a new row was written, false when the address was
    /// already recorded. The address check is the second dedup layer: the
    /// same pool re-discovered through a different signature is a no-op
    /// here, not an error.
    pub fn save_pool(&self, pool: &PoolInfo, token_symbol: &str, pair_symbol: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let existing: Option<String> = conn
            .query_row(
                "SELECT pool_address FROM pools WHERE pool_address = ?1",
                params![pool.address],
                |row| row.get(0)
            )
            .optional()?;

        if existing.is_some() {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO pools (pool_address, signature, coin_mint, token_symbol, pair_symbol, timestamp, discovery_time, slot)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                pool.address,
                pool.signature,
                pool.coin_mint,
                token_symbol,
                pair_symbol,
                pool.timestamp.format(TIME_FORMAT).to_string(),
                Utc::now().format(TIME_FORMAT).to_string(),
                pool.slot as i64
            ]
        )?;

        Ok(true)
    }

    pub fn pool_exists(&self, address: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pools WHERE pool_address = ?1",
            params![address],
            |row| row.get(0)
        )?;
        Ok(count > 0)
    }

    pub fn pool_count(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pools", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_pool() -> PoolInfo {
        PoolInfo {
            address: "58oQChx4yWmvKdwLLZzBi4ChoCc2fqCUWBkwMihLYQo2".to_string(),
            signature: "5j7s6NiJS3JAkvgkoc18WVAsiSaci2pxB2A6ueCJP4tprA2TFg9wSyTLeYouxPBJEMzJinENTkpA52YStRW5Dia7".to_string(),
            timestamp: Utc.timestamp_opt(1714651200, 0).unwrap(),
            slot: 254199412,
            coin_mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
            token_symbol: "USDC".to_string(),
        }
    }

    #[test]
    fn save_pool_is_idempotent_per_address() {
        let database = Database::open(":memory:").unwrap();
        let pool = sample_pool();

        assert!(database.save_pool(&pool, "USDC", "SOL").unwrap());
        assert!(!database.save_pool(&pool, "USDC", "SOL").unwrap());

        assert_eq!(database.pool_count().unwrap(), 1);
    }

    #[test]
    fn same_address_different_signature_is_still_one_row() {
        let database = Database::open(":memory:").unwrap();
        let pool = sample_pool();

        assert!(database.save_pool(&pool, "USDC", "SOL").unwrap());

        let mut retried = pool.clone();
        retried.signature = "2x".repeat(40);
        assert!(!database.save_pool(&retried, "USDC", "SOL").unwrap());

        assert_eq!(database.pool_count().unwrap(), 1);
    }

    #[test]
    fn pool_exists_tracks_saved_rows() {
        let database = Database::open(":memory:").unwrap();
        let pool = sample_pool();

        assert!(!database.pool_exists(&pool.address).unwrap());
        database.save_pool(&pool, "USDC", "SOL").unwrap();
        assert!(database.pool_exists(&pool.address).unwrap());
    }
}
