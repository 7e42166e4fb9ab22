use serde::Deserialize;
use strum::VariantNames;

use crate::address::Address;
use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    mismatch,
};
use crate::error::ValidationError;
use crate::programs::{Base64Bytes, parse_schema};
use crate::view::{Row, title_case};

/// Legacy (non-upgradeable) loaders v1 and v2 share one instruction set.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Deserialize,
    strum_macros::VariantNames,
    strum_macros::AsRefStr,
)]
#[serde(tag = "type", content = "info", rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum BpfLoaderInstruction {
    Write(WriteInfo),
    Finalize(FinalizeInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteInfo {
    pub account: Address,
    pub offset: u32,
    pub bytes: Base64Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeInfo {
    pub account: Address,
}

pub struct BpfLoaderAdapter;

impl ProgramAdapter for BpfLoaderAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        parse_schema(
            input.kind.as_ref(),
            input.parsed,
            BpfLoaderInstruction::VARIANTS,
        )
            .map(TypedInstruction::BpfLoader)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::BpfLoader(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        let rows = match ix {
            BpfLoaderInstruction::Write(info) => vec![
                Row::address("Account", info.account),
                Row::text("Offset", info.offset),
                Row::data("Bytes", &info.bytes.0),
            ],
            BpfLoaderInstruction::Finalize(info) => vec![Row::address("Account", info.account)],
        };
        Ok(FormattedInstruction::new(title_case(ix.as_ref()), rows))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::programs::{BPF_LOADER_2_PROGRAM_ID, ProgramKind};
    use crate::types::{ParsedInstruction, RawInstruction};
    use crate::view::RowValue;

    #[test]
    fn write_decodes_base64_payload() {
        let raw = RawInstruction {
            program_id: BPF_LOADER_2_PROGRAM_ID.parse().unwrap(),
            account_keys: Vec::new(),
            data: Vec::new(),
        };
        let parsed = ParsedInstruction {
            program: "bpf-loader".to_string(),
            program_id: raw.program_id,
            parsed: serde_json::json!({
                "type": "write",
                "info": {
                    "account": "Vote111111111111111111111111111111111111111",
                    "offset": 128,
                    "bytes": "3q2+7w=="
                }
            }),
            stack_height: None,
        };
        let input = InstructionInput {
            kind: ProgramKind::BpfLoader2,
            raw: &raw,
            parsed: Some(&parsed),
            idl: None,
        };
        let typed = BpfLoaderAdapter.validate(&input).unwrap();
        let formatted = BpfLoaderAdapter
            .format(
                &typed,
                &FormatContext {
                    index: 0,
                    kind: ProgramKind::BpfLoader2,
                    raw: &raw,
                },
            )
            .unwrap();
        assert_eq!(formatted.name, "Write");
        assert_eq!(formatted.rows[1], Row::text("Offset", "128"));
        assert_eq!(
            formatted.rows[2].value,
            RowValue::Data("deadbeef".to_string())
        );
    }
}
