use serde::Deserialize;
use strum::VariantNames;

use crate::address::Address;
use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    mismatch,
};
use crate::error::ValidationError;
use crate::programs::parse_schema;
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
pub enum AssociatedTokenInstruction {
    Create(CreateInfo),
    CreateIdempotent(CreateInfo),
    RecoverNested(RecoverNestedInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInfo {
    pub source: Address,
    pub account: Address,
    pub wallet: Address,
    pub mint: Address,
    #[serde(default)]
    pub token_program: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverNestedInfo {
    pub nested_source: Address,
    pub nested_mint: Address,
    pub destination: Address,
    pub nested_owner: Address,
    pub owner_mint: Address,
    pub wallet: Address,
}

pub struct AssociatedTokenAdapter;

impl ProgramAdapter for AssociatedTokenAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        parse_schema(
            input.kind.as_ref(),
            input.parsed,
            AssociatedTokenInstruction::VARIANTS,
        )
        .map(TypedInstruction::AssociatedToken)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::AssociatedToken(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        let rows = match ix {
            AssociatedTokenInstruction::Create(info)
            | AssociatedTokenInstruction::CreateIdempotent(info) => {
                let mut rows = vec![
                    Row::address("Source", info.source),
                    Row::address("Account", info.account),
                    Row::address("Wallet", info.wallet),
                    Row::address("Mint", info.mint),
                ];
                if let Some(token_program) = info.token_program {
                    rows.push(Row::address("Token Program", token_program));
                }
                rows
            }
            AssociatedTokenInstruction::RecoverNested(info) => vec![
                Row::address("Destination", info.destination),
                Row::address("Nested Mint", info.nested_mint),
                Row::address("Nested Owner", info.nested_owner),
                Row::address("Nested Source", info.nested_source),
                Row::address("Owner Mint", info.owner_mint),
                Row::address("Wallet", info.wallet),
            ],
        };
        Ok(FormattedInstruction::new(title_case(ix.as_ref()), rows))
    }
}
