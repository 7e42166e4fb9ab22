use serde::Deserialize;
use strum::VariantNames;

use crate::address::Address;
use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    mismatch,
};
use crate::error::ValidationError;
use crate::programs::{parse_schema, wide_u64};
use crate::view::{Row, title_case};

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
pub enum AddressLookupTableInstruction {
    CreateLookupTable(CreateLookupTableInfo),
    FreezeLookupTable(AuthorityOnlyInfo),
    ExtendLookupTable(ExtendLookupTableInfo),
    DeactivateLookupTable(AuthorityOnlyInfo),
    CloseLookupTable(CloseLookupTableInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLookupTableInfo {
    pub lookup_table_account: Address,
    pub lookup_table_authority: Address,
    pub payer_account: Address,
    #[serde(with = "wide_u64")]
    pub recent_slot: u64,
    pub bump_seed: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityOnlyInfo {
    pub lookup_table_account: Address,
    pub lookup_table_authority: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendLookupTableInfo {
    pub lookup_table_account: Address,
    pub lookup_table_authority: Address,
    #[serde(default)]
    pub payer_account: Option<Address>,
    pub new_addresses: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseLookupTableInfo {
    pub lookup_table_account: Address,
    pub lookup_table_authority: Address,
    pub recipient: Address,
}

pub struct AddressLookupTableAdapter;

impl ProgramAdapter for AddressLookupTableAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        parse_schema(
            input.kind.as_ref(),
            input.parsed,
            AddressLookupTableInstruction::VARIANTS,
        )
        .map(TypedInstruction::AddressLookupTable)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::AddressLookupTable(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        Ok(FormattedInstruction::new(title_case(ix.as_ref()), rows(ix)))
    }
}

fn rows(ix: &AddressLookupTableInstruction) -> Vec<Row> {
    match ix {
        AddressLookupTableInstruction::CreateLookupTable(info) => vec![
            Row::address("Lookup Table", info.lookup_table_account),
            Row::address("Lookup Table Authority", info.lookup_table_authority),
            Row::address("Payer Account", info.payer_account),
            Row::text("Recent Slot", info.recent_slot),
            Row::text("Bump Seed", info.bump_seed),
        ],
        AddressLookupTableInstruction::FreezeLookupTable(info)
        | AddressLookupTableInstruction::DeactivateLookupTable(info) => vec![
            Row::address("Lookup Table", info.lookup_table_account),
            Row::address("Lookup Table Authority", info.lookup_table_authority),
        ],
        AddressLookupTableInstruction::ExtendLookupTable(info) => {
            let mut rows = vec![
                Row::address("Lookup Table", info.lookup_table_account),
                Row::address("Lookup Table Authority", info.lookup_table_authority),
            ];
            if let Some(payer) = info.payer_account {
                rows.push(Row::address("Payer Account", payer));
            }
            let addresses = info
                .new_addresses
                .iter()
                .enumerate()
                .map(|(position, address)| Row::address(position.to_string(), *address))
                .collect();
            rows.push(Row::table("New Addresses", addresses));
            rows
        }
        AddressLookupTableInstruction::CloseLookupTable(info) => vec![
            Row::address("Lookup Table", info.lookup_table_account),
            Row::address("Lookup Table Authority", info.lookup_table_authority),
            Row::address("Recipient", info.recipient),
        ],
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::programs::{ADDRESS_LOOKUP_TABLE_PROGRAM_ID, ProgramKind};
    use crate::types::{ParsedInstruction, RawInstruction};
    use crate::view::RowValue;

    fn run(value: serde_json::Value) -> Result<FormattedInstruction, ValidationError> {
        let raw = RawInstruction {
            program_id: ADDRESS_LOOKUP_TABLE_PROGRAM_ID.parse().unwrap(),
            account_keys: Vec::new(),
            data: Vec::new(),
        };
        let parsed = ParsedInstruction {
            program: "address-lookup-table".to_string(),
            program_id: raw.program_id,
            parsed: value,
            stack_height: None,
        };
        let input = InstructionInput {
            kind: ProgramKind::AddressLookupTable,
            raw: &raw,
            parsed: Some(&parsed),
            idl: None,
        };
        let typed = AddressLookupTableAdapter.validate(&input)?;
        AddressLookupTableAdapter.format(
            &typed,
            &FormatContext {
                index: 0,
                kind: ProgramKind::AddressLookupTable,
                raw: &raw,
            },
        )
    }

    #[test]
    fn extend_lists_new_addresses_by_position() {
        let a = Address::new([1; 32]);
        let b = Address::new([2; 32]);
        let c = Address::new([3; 32]);
        let formatted = run(serde_json::json!({
            "type": "extendLookupTable",
            "info": {
                "lookupTableAccount": Address::new([9; 32]).to_string(),
                "lookupTableAuthority": Address::new([8; 32]).to_string(),
                "newAddresses": [a.to_string(), b.to_string(), c.to_string()]
            }
        }))
        .unwrap();
        assert_eq!(formatted.name, "Extend Lookup Table");
        let table = formatted.rows.last().unwrap();
        assert_eq!(table.label, "New Addresses");
        let RowValue::Table(entries) = &table.value else {
            panic!("expected an indexed sub-table");
        };
        assert_eq!(
            entries,
            &vec![
                Row::address("0", a),
                Row::address("1", b),
                Row::address("2", c),
            ]
        );
    }

    #[test]
    fn create_requires_slot() {
        let err = run(serde_json::json!({
            "type": "createLookupTable",
            "info": {
                "lookupTableAccount": Address::new([9; 32]).to_string(),
                "lookupTableAuthority": Address::new([8; 32]).to_string(),
                "payerAccount": Address::new([7; 32]).to_string(),
                "bumpSeed": 255
            }
        }))
        .unwrap_err();
        let ValidationError::Malformed { type_tag, .. } = &err else {
            panic!("expected malformed error, got {err:?}");
        };
        assert_eq!(type_tag, "createLookupTable");
    }
}
