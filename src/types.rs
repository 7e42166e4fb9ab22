use serde::{Deserialize, Deserializer, Serialize};

use crate::address::Address;
use crate::error::LookupUnresolved;

/// An account slot that either carries an address or explains why it has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountAddress {
    Known(Address),
    Unresolved(LookupUnresolved),
}

impl AccountAddress {
    pub fn known(&self) -> Option<&Address> {
        match self {
            Self::Known(address) => Some(address),
            Self::Unresolved(_) => None,
        }
    }
}

/// One account reference of an instruction, order-significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    pub address: AccountAddress,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountRef {
    pub fn new(address: Address, is_signer: bool, is_writable: bool) -> Self {
        Self {
            address: AccountAddress::Known(address),
            is_signer,
            is_writable,
        }
    }
}

/// An instruction as received from the chain, with account indices already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInstruction {
    pub program_id: Address,
    pub account_keys: Vec<AccountRef>,
    #[serde(with = "base58_bytes")]
    pub data: Vec<u8>,
}

impl RawInstruction {
    pub fn account(&self, position: usize) -> Option<&AccountRef> {
        self.account_keys.get(position)
    }
}

/// Upstream parser output: `{ program, programId, parsed: { type, info } }`.
///
/// `parsed` is left as a loosely-typed JSON value; program schemas refine it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInstruction {
    pub program: String,
    pub program_id: Address,
    pub parsed: serde_json::Value,
    #[serde(default)]
    pub stack_height: Option<u32>,
}

impl ParsedInstruction {
    pub fn type_tag(&self) -> Option<&str> {
        self.parsed.get("type").and_then(serde_json::Value::as_str)
    }

    pub fn info(&self) -> Option<&serde_json::Value> {
        self.parsed.get("info")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    #[serde(with = "base58_bytes")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub stack_height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressTableLookup {
    pub account_key: Address,
    pub writable_indexes: Vec<u8>,
    pub readonly_indexes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMessage {
    pub header: MessageHeader,
    pub account_keys: Vec<Address>,
    #[serde(default)]
    pub recent_blockhash: Option<String>,
    pub instructions: Vec<CompiledInstruction>,
    #[serde(default)]
    pub address_table_lookups: Vec<AddressTableLookup>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerInstruction {
    pub compiled: CompiledInstruction,
    #[serde(default)]
    pub parsed: Option<ParsedInstruction>,
}

/// Inner instructions executed on behalf of top-level instruction `index`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerInstructions {
    pub index: u8,
    pub instructions: Vec<InnerInstruction>,
}

/// A top-level instruction failure extracted from a transaction error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionFailure {
    pub index: usize,
    pub error: String,
}

/// The transaction's overall execution result; `err` is the RPC's error JSON.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SignatureResult {
    #[serde(default)]
    pub err: Option<serde_json::Value>,
}

impl SignatureResult {
    /// `{"InstructionError": [index, error]}` → the failing instruction.
    pub fn instruction_failure(&self) -> Option<InstructionFailure> {
        let pair = self.err.as_ref()?.get("InstructionError")?.as_array()?;
        let index = usize::try_from(pair.first()?.as_u64()?).ok()?;
        let error = match pair.get(1) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        Some(InstructionFailure { index, error })
    }
}

/// Everything the pipeline needs to decode one transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    #[serde(default)]
    pub signature: Option<String>,
    pub message: TransactionMessage,
    /// Upstream parser output aligned with `message.instructions`.
    #[serde(default)]
    pub parsed_instructions: Vec<Option<ParsedInstruction>>,
    #[serde(default)]
    pub inner_instructions: Vec<InnerInstructions>,
    #[serde(default)]
    pub result: SignatureResult,
    #[serde(default)]
    pub log_messages: Option<Vec<String>>,
}

pub(crate) mod base58_bytes {
    use super::{Deserialize, Deserializer};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&bs58::encode(bytes).into_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        bs58::decode(&s)
            .into_vec()
            .map_err(|e| serde::de::Error::custom(format!("invalid base58 data: {e}")))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn instruction_failure_reads_index_and_error() {
        let result = SignatureResult {
            err: Some(serde_json::json!({ "InstructionError": [2, { "Custom": 1 }] })),
        };
        assert_eq!(
            result.instruction_failure(),
            Some(InstructionFailure {
                index: 2,
                error: r#"{"Custom":1}"#.to_string()
            })
        );

        let string_error = SignatureResult {
            err: Some(serde_json::json!({ "InstructionError": [0, "InvalidAccountData"] })),
        };
        assert_eq!(
            string_error.instruction_failure().unwrap().error,
            "InvalidAccountData"
        );
    }

    #[test]
    fn non_instruction_errors_have_no_failure_index() {
        let result = SignatureResult {
            err: Some(serde_json::json!("AccountInUse")),
        };
        assert_eq!(result.instruction_failure(), None);
        assert_eq!(SignatureResult::default().instruction_failure(), None);
    }

    #[test]
    fn compiled_instruction_decodes_base58_data() {
        let ix: CompiledInstruction = serde_json::from_value(serde_json::json!({
            "programIdIndex": 2,
            "accounts": [0, 1],
            "data": "3Bxs4h24hBtQy9rw"
        }))
        .unwrap();
        assert_eq!(ix.program_id_index, 2);
        assert_eq!(ix.accounts, vec![0, 1]);
        assert_eq!(ix.data.len(), 12);
        assert_eq!(ix.stack_height, None);
    }

    #[test]
    fn parsed_instruction_exposes_type_and_info() {
        let parsed: ParsedInstruction = serde_json::from_value(serde_json::json!({
            "program": "system",
            "programId": "11111111111111111111111111111111",
            "parsed": { "type": "transfer", "info": { "lamports": 5 } }
        }))
        .unwrap();
        assert_eq!(parsed.type_tag(), Some("transfer"));
        assert_eq!(parsed.info().unwrap()["lamports"], 5);
    }
}
