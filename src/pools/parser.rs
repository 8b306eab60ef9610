// Positional extraction of pool and mint addresses from a fetched
// transaction.
//
// The account offsets are a structural contract with a specific program
// version and brittle by nature, so they live in one layout table
// instead of inline indices.

use std::str::FromStr;

use chrono::{ DateTime, Utc };
use solana_sdk::pubkey::Pubkey;

use crate::errors::ParseError;
use crate::pools::PoolInfo;
use crate::transactions::types::TransactionRecord;

/// Raydium AMM v4 program id.
pub const RAYDIUM_AMM_V4: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";

/// Wrapped SOL mint.
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Log line marker emitted by the pool initialization instruction.
const POOL_INIT_MARKER: &str = "initialize2";

/// Positional account layout of a pool initialization instruction.
#[derive(Debug, Clone, Copy)]
pub struct PoolInstructionLayout {
    pub min_accounts: usize,
    pub pool_address: usize,
    pub coin_mint: usize,
    pub pc_mint: usize,
}

/// Account layout of Raydium AMM v4 `initialize2`.
pub const AMM_V4_LAYOUT: PoolInstructionLayout = PoolInstructionLayout {
    min_accounts: 10,
    pool_address: 4,
    coin_mint: 8,
    pc_mint: 9,
};

pub struct PoolInfoParser {
    program_id: String,
    layout: PoolInstructionLayout,
}

impl PoolInfoParser {
    pub fn new(program_id: String) -> Self {
        Self {
            program_id,
            layout: AMM_V4_LAYOUT,
        }
    }

    /// True iff the transaction logs carry the pool initialization marker.
    pub fn is_pool_initialization(&self, record: &TransactionRecord) -> bool {
        record
            .log_messages()
            .iter()
            .any(|line| line.contains(POOL_INIT_MARKER))
    }

    /// Extract pool and mint addresses from the first instruction issued
    /// by the monitored program.
    ///
    /// Returns the populated `PoolInfo` together with the target and pair
    /// mint for symbol resolution. The target is whichever mint is not
    /// wrapped SOL; when neither side is WSOL the pc mint is treated as
    /// the target.
    pub fn parse(
        &self,
        record: &TransactionRecord
    ) -> Result<(PoolInfo, String, String), ParseError> {
        let instruction = record.transaction.message.instructions
            .iter()
            .find(|ix| ix.program_id == self.program_id)
            .ok_or(ParseError::NoProgramInstruction)?;

        let accounts = &instruction.accounts;
        if accounts.len() < self.layout.min_accounts {
            return Err(ParseError::AccountsTooShort {
                got: accounts.len(),
                min: self.layout.min_accounts,
            });
        }

        let pool_address = checked_address(&accounts[self.layout.pool_address])?;
        let coin_mint = checked_address(&accounts[self.layout.coin_mint])?;
        let pc_mint = checked_address(&accounts[self.layout.pc_mint])?;

        let (target_mint, pair_mint) = if pc_mint == WSOL_MINT {
            (coin_mint, pc_mint)
        } else {
            (pc_mint, coin_mint)
        };

        let signature = record
            .first_signature()
            .ok_or(ParseError::MissingSignature)?
            .to_string();

        let block_time = record.block_time.ok_or(ParseError::MissingBlockTime)?;
        let timestamp = DateTime::<Utc>
            ::from_timestamp(block_time, 0)
            .ok_or(ParseError::MissingBlockTime)?;

        let info = PoolInfo {
            address: pool_address,
            signature,
            timestamp,
            slot: record.slot,
            coin_mint: target_mint.clone(),
            token_symbol: String::new(),
        };

        Ok((info, target_mint, pair_mint))
    }
}

fn checked_address(raw: &str) -> Result<String, ParseError> {
    Pubkey::from_str(raw)
        .map(|_| raw.to_string())
        .map_err(|e| ParseError::InvalidAddress {
            address: raw.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: &str = "58oQChx4yWmvKdwLLZzBi4ChoCc2fqCUWBkwMihLYQo2";
    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    const SIGNATURE: &str =
        "5j7s6NiJS3JAkvgkoc18WVAsiSaci2pxB2A6ueCJP4tprA2TFg9wSyTLeYouxPBJEMzJinENTkpA52YStRW5Dia7";

    fn synthetic_record(coin_mint: &str, pc_mint: &str, account_count: usize) -> TransactionRecord {
        // Realistic initialize2 shape: ten-plus accounts with the pool at
        // index 4 and the mints at 8 and 9.
        let mut accounts = vec![RAYDIUM_AMM_V4.to_string(); account_count];
        if account_count > 4 {
            accounts[4] = POOL.to_string();
        }
        if account_count > 9 {
            accounts[8] = coin_mint.to_string();
            accounts[9] = pc_mint.to_string();
        }

        serde_json
            ::from_value(
                serde_json::json!({
                "slot": 254199412,
                "blockTime": 1714651200,
                "meta": {
                    "logMessages": ["Program log: initialize2: InitializeInstruction2"]
                },
                "transaction": {
                    "signatures": [SIGNATURE],
                    "message": {
                        "instructions": [
                            {
                                "programId": "ComputeBudget111111111111111111111111111111",
                                "accounts": []
                            },
                            {
                                "programId": RAYDIUM_AMM_V4,
                                "accounts": accounts
                            }
                        ]
                    }
                }
            })
            )
            .unwrap()
    }

    fn parser() -> PoolInfoParser {
        PoolInfoParser::new(RAYDIUM_AMM_V4.to_string())
    }

    #[test]
    fn detects_initialization_marker() {
        let record = synthetic_record(USDC, WSOL_MINT, 21);
        assert!(parser().is_pool_initialization(&record));
    }

    #[test]
    fn extracts_addresses_from_layout_positions() {
        let record = synthetic_record(USDC, WSOL_MINT, 21);

        let (info, target, pair) = parser().parse(&record).unwrap();

        assert_eq!(info.address, POOL);
        assert_eq!(info.signature, SIGNATURE);
        assert_eq!(info.slot, 254199412);
        assert_eq!(info.timestamp.timestamp(), 1714651200);
        assert_eq!(target, USDC);
        assert_eq!(pair, WSOL_MINT);
        assert_eq!(info.coin_mint, USDC);
    }

    #[test]
    fn wsol_pair_means_other_mint_is_target() {
        // WSOL on the pc side: coin mint is the target
        let record = synthetic_record(USDC, WSOL_MINT, 21);
        let (_, target, pair) = parser().parse(&record).unwrap();
        assert_eq!(target, USDC);
        assert_eq!(pair, WSOL_MINT);

        // Neither side is WSOL: pc mint is the target
        let other = "7dHbWXmci3dT8UFYWYZweBLXgycu7Y3iL6trKn1Y7ARj";
        let record = synthetic_record(other, USDC, 21);
        let (_, target, pair) = parser().parse(&record).unwrap();
        assert_eq!(target, USDC);
        assert_eq!(pair, other);
    }

    #[test]
    fn short_accounts_list_fails_parse() {
        let record = synthetic_record(USDC, WSOL_MINT, 8);

        match parser().parse(&record) {
            Err(ParseError::AccountsTooShort { got, min }) => {
                assert_eq!(got, 8);
                assert_eq!(min, 10);
            }
            other => panic!("expected AccountsTooShort, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn transaction_without_program_instruction_fails_parse() {
        let mut record = synthetic_record(USDC, WSOL_MINT, 21);
        record.transaction.message.instructions.remove(1);

        assert!(matches!(parser().parse(&record), Err(ParseError::NoProgramInstruction)));
    }

    #[test]
    fn missing_block_time_fails_parse() {
        let mut record = synthetic_record(USDC, WSOL_MINT, 21);
        record.block_time = None;

        assert!(matches!(parser().parse(&record), Err(ParseError::MissingBlockTime)));
    }
}
