use serde::Deserialize;
use strum::VariantNames;

use crate::address::Address;
use crate::dispatch::attributes::{Attributes, attribute_rows, attribute_struct};
use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    mismatch,
};
use crate::error::ValidationError;
use crate::programs::{Base64Bytes, parse_schema, wide_u64};
use crate::view::title_case;

/// Every variant renders through the attribute dump.
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
pub enum UpgradeableLoaderInstruction {
    InitializeBuffer(InitializeBufferInfo),
    Write(WriteInfo),
    DeployWithMaxDataLen(DeployWithMaxDataLenInfo),
    Upgrade(UpgradeInfo),
    SetAuthority(SetAuthorityInfo),
    SetAuthorityChecked(SetAuthorityInfo),
    Close(CloseInfo),
    ExtendProgram(ExtendProgramInfo),
}

impl UpgradeableLoaderInstruction {
    fn info(&self) -> &dyn Attributes {
        match self {
            Self::InitializeBuffer(info) => info,
            Self::Write(info) => info,
            Self::DeployWithMaxDataLen(info) => info,
            Self::Upgrade(info) => info,
            Self::SetAuthority(info) | Self::SetAuthorityChecked(info) => info,
            Self::Close(info) => info,
            Self::ExtendProgram(info) => info,
        }
    }
}

attribute_struct! {
    pub struct InitializeBufferInfo {
        pub account: Address,
        #[serde(default)]
        pub authority: Option<Address>,
    }
}

attribute_struct! {
    pub struct WriteInfo {
        pub offset: u32,
        pub bytes: Base64Bytes,
        pub account: Address,
        pub authority: Address,
    }
}

attribute_struct! {
    pub struct DeployWithMaxDataLenInfo {
        #[serde(with = "wide_u64")]
        pub max_data_len: u64,
        pub payer_account: Address,
        pub program_data_account: Address,
        pub program_account: Address,
        pub buffer_account: Address,
        #[serde(default)]
        pub rent_sysvar: Option<Address>,
        #[serde(default)]
        pub clock_sysvar: Option<Address>,
        #[serde(default)]
        pub system_program: Option<Address>,
        pub authority: Address,
    }
}

attribute_struct! {
    pub struct UpgradeInfo {
        pub program_data_account: Address,
        pub program_account: Address,
        pub buffer_account: Address,
        pub spill_account: Address,
        #[serde(default)]
        pub rent_sysvar: Option<Address>,
        #[serde(default)]
        pub clock_sysvar: Option<Address>,
        pub authority: Address,
    }
}

attribute_struct! {
    pub struct SetAuthorityInfo {
        pub account: Address,
        pub authority: Address,
        #[serde(default)]
        pub new_authority: Option<Address>,
    }
}

attribute_struct! {
    pub struct CloseInfo {
        pub account: Address,
        pub recipient: Address,
        pub authority: Address,
        #[serde(default)]
        pub program_account: Option<Address>,
    }
}

attribute_struct! {
    pub struct ExtendProgramInfo {
        pub additional_bytes: u32,
        pub program_data_account: Address,
        pub program_account: Address,
        #[serde(default)]
        pub system_program: Option<Address>,
        #[serde(default)]
        pub payer_account: Option<Address>,
    }
}

pub struct UpgradeableLoaderAdapter;

impl ProgramAdapter for UpgradeableLoaderAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        parse_schema(
            input.kind.as_ref(),
            input.parsed,
            UpgradeableLoaderInstruction::VARIANTS,
        )
        .map(TypedInstruction::UpgradeableLoader)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::UpgradeableLoader(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        Ok(FormattedInstruction::new(title_case(ix.as_ref()), attribute_rows(ix.info())))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::programs::{BPF_UPGRADEABLE_LOADER_PROGRAM_ID, ProgramKind};
    use crate::types::{ParsedInstruction, RawInstruction};
    use crate::view::{Row, RowValue};

    const A: &str = "Vote111111111111111111111111111111111111111";
    const B: &str = "Config1111111111111111111111111111111111111";

    fn run(value: serde_json::Value) -> Result<FormattedInstruction, ValidationError> {
        let raw = RawInstruction {
            program_id: BPF_UPGRADEABLE_LOADER_PROGRAM_ID.parse().unwrap(),
            account_keys: Vec::new(),
            data: Vec::new(),
        };
        let parsed = ParsedInstruction {
            program: "bpf-upgradeable-loader".to_string(),
            program_id: raw.program_id,
            parsed: value,
            stack_height: None,
        };
        let input = InstructionInput {
            kind: ProgramKind::BpfUpgradeableLoader,
            raw: &raw,
            parsed: Some(&parsed),
            idl: None,
        };
        let typed = UpgradeableLoaderAdapter.validate(&input)?;
        UpgradeableLoaderAdapter.format(
            &typed,
            &FormatContext {
                index: 0,
                kind: ProgramKind::BpfUpgradeableLoader,
                raw: &raw,
            },
        )
    }

    #[test]
    fn write_dumps_bytes_as_hex_and_addresses_as_links() {
        let formatted = run(serde_json::json!({
            "type": "write",
            "info": { "offset": 0, "bytes": "AAEC", "account": A, "authority": B }
        }))
        .unwrap();
        assert_eq!(formatted.name, "Write");
        assert_eq!(formatted.rows[0], Row::text("Offset", "0"));
        assert_eq!(
            formatted.rows[1].value,
            RowValue::Data("000102".to_string())
        );
        assert_eq!(
            formatted.rows[2],
            Row::address("Account", A.parse().unwrap())
        );
        assert_eq!(
            formatted.rows[3],
            Row::address("Authority", B.parse().unwrap())
        );
    }

    #[test]
    fn set_authority_without_new_authority_drops_the_row() {
        let formatted = run(serde_json::json!({
            "type": "setAuthority",
            "info": { "account": A, "authority": B, "newAuthority": null }
        }))
        .unwrap();
        assert_eq!(formatted.name, "Set Authority");
        assert_eq!(formatted.rows.len(), 2);
    }

    #[test]
    fn deploy_max_data_len_accepts_string_amounts() {
        let formatted = run(serde_json::json!({
            "type": "deployWithMaxDataLen",
            "info": {
                "maxDataLen": "200000",
                "payerAccount": A,
                "programDataAccount": B,
                "programAccount": A,
                "bufferAccount": B,
                "authority": A
            }
        }))
        .unwrap();
        assert_eq!(formatted.rows[0], Row::text("Max Data Len", "200000"));
        assert_eq!(formatted.name, "Deploy With Max Data Len");
    }
}
