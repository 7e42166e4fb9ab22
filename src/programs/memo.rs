use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    mismatch,
};
use crate::error::ValidationError;
use crate::programs::invalid_data;
use crate::view::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoInstruction {
    pub text: String,
}

/// The upstream parser reports memos as a bare string rather than a `{ type, info }` bag,
/// so the raw bytes are the fallback source.
pub struct MemoAdapter;

impl ProgramAdapter for MemoAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        if let Some(text) = input.parsed.and_then(|p| p.parsed.as_str()) {
            return Ok(TypedInstruction::Memo(MemoInstruction {
                text: text.to_string(),
            }));
        }
        let text = std::str::from_utf8(&input.raw.data)
            .map_err(|e| invalid_data(input.kind, format!("memo is not valid UTF-8: {e}")))?;
        Ok(TypedInstruction::Memo(MemoInstruction {
            text: text.to_string(),
        }))
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::Memo(memo) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        Ok(FormattedInstruction::new("Memo", vec![Row::text("Data (UTF-8)", &memo.text)]))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::programs::{MEMO_PROGRAM_ID, ProgramKind};
    use crate::types::{ParsedInstruction, RawInstruction};

    fn raw(data: &[u8]) -> RawInstruction {
        RawInstruction {
            program_id: MEMO_PROGRAM_ID.parse().unwrap(),
            account_keys: Vec::new(),
            data: data.to_vec(),
        }
    }

    #[test]
    fn parsed_string_wins_over_raw_bytes() {
        let raw = raw(b"ignored");
        let parsed = ParsedInstruction {
            program: "spl-memo".to_string(),
            program_id: raw.program_id,
            parsed: serde_json::json!("gm"),
            stack_height: None,
        };
        let input = InstructionInput {
            kind: ProgramKind::Memo,
            raw: &raw,
            parsed: Some(&parsed),
            idl: None,
        };
        let TypedInstruction::Memo(memo) = MemoAdapter.validate(&input).unwrap() else {
            panic!("expected memo");
        };
        assert_eq!(memo.text, "gm");
    }

    #[test]
    fn raw_bytes_must_be_utf8() {
        let good = raw("héllo".as_bytes());
        let input = InstructionInput {
            kind: ProgramKind::Memo,
            raw: &good,
            parsed: None,
            idl: None,
        };
        let typed = MemoAdapter.validate(&input).unwrap();
        let formatted = MemoAdapter
            .format(
                &typed,
                &FormatContext {
                    index: 0,
                    kind: ProgramKind::Memo,
                    raw: &good,
                },
            )
            .unwrap();
        assert_eq!(formatted.rows[0], Row::text("Data (UTF-8)", "héllo"));

        let bad = raw(&[0xff, 0xfe]);
        let input = InstructionInput {
            kind: ProgramKind::Memo,
            raw: &bad,
            parsed: None,
            idl: None,
        };
        assert!(matches!(
            MemoAdapter.validate(&input),
            Err(ValidationError::InvalidData { .. })
        ));
    }
}
