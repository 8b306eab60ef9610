// Wire schema for `getTransaction` with jsonParsed encoding.
//
// Only the fields the pipeline consumes are modeled; everything else in
// the RPC payload is ignored by serde. Decoding failures surface as
// protocol errors at the fetch site instead of silently defaulting.

use serde::Deserialize;

/// Decoded transaction payload. Read-only once fetched.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub slot: u64,
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
    pub transaction: TransactionPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default)]
    pub log_messages: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionPayload {
    #[serde(default)]
    pub signatures: Vec<String>,
    pub message: TransactionMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionMessage {
    #[serde(default)]
    pub instructions: Vec<InstructionRecord>,
}

/// One top-level instruction. Parsed instructions from jsonParsed
/// encoding have no `accounts` list, which decodes as empty here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionRecord {
    #[serde(default)]
    pub program_id: String,
    #[serde(default)]
    pub accounts: Vec<String>,
}

impl TransactionRecord {
    pub fn log_messages(&self) -> &[String] {
        self.meta
            .as_ref()
            .and_then(|meta| meta.log_messages.as_deref())
            .unwrap_or(&[])
    }

    pub fn first_signature(&self) -> Option<&str> {
        self.transaction.signatures.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_json_parsed_payload() {
        let record: TransactionRecord = serde_json
            ::from_value(
                serde_json::json!({
                "slot": 254199412,
                "blockTime": 1714651200,
                "meta": {
                    "logMessages": ["Program log: initialize2: InitializeInstruction2"],
                    "fee": 5000
                },
                "transaction": {
                    "signatures": ["5j7s6NiJS3JAkvgkoc18WVAsiSaci2pxB2A6ueCJP4tprA2TFg9wSyTLeYouxPBJEMzJinENTkpA52YStRW5Dia7"],
                    "message": {
                        "instructions": [
                            {
                                "programId": "ComputeBudget111111111111111111111111111111",
                                "accounts": [],
                                "data": "3gJqkocMWaMm"
                            },
                            {
                                "program": "spl-token",
                                "programId": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
                                "parsed": {"type": "transfer"}
                            }
                        ]
                    }
                }
            })
            )
            .unwrap();

        assert_eq!(record.slot, 254199412);
        assert_eq!(record.block_time, Some(1714651200));
        assert_eq!(record.log_messages().len(), 1);
        assert_eq!(record.transaction.message.instructions.len(), 2);
        // Fully parsed instructions carry no accounts list
        assert!(record.transaction.message.instructions[1].accounts.is_empty());
        assert!(record.first_signature().unwrap().starts_with("5j7s6"));
    }

    #[test]
    fn missing_meta_yields_empty_logs() {
        let record: TransactionRecord = serde_json
            ::from_value(
                serde_json::json!({
                "slot": 1,
                "blockTime": null,
                "transaction": {"signatures": [], "message": {"instructions": []}}
            })
            )
            .unwrap();

        assert!(record.log_messages().is_empty());
        assert!(record.first_signature().is_none());
    }
}
