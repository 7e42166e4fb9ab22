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
pub enum SystemInstruction {
    CreateAccount(CreateAccountInfo),
    CreateAccountWithSeed(CreateAccountWithSeedInfo),
    Assign(AssignInfo),
    AssignWithSeed(AssignWithSeedInfo),
    Transfer(TransferInfo),
    TransferWithSeed(TransferWithSeedInfo),
    Allocate(AllocateInfo),
    AllocateWithSeed(AllocateWithSeedInfo),
    AdvanceNonce(AdvanceNonceInfo),
    #[serde(rename = "withdrawFromNonce")]
    #[strum(serialize = "withdrawFromNonce")]
    WithdrawNonce(WithdrawNonceInfo),
    InitializeNonce(InitializeNonceInfo),
    AuthorizeNonce(AuthorizeNonceInfo),
    UpgradeNonce(UpgradeNonceInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountInfo {
    pub source: Address,
    pub new_account: Address,
    #[serde(with = "wide_u64")]
    pub lamports: u64,
    #[serde(with = "wide_u64")]
    pub space: u64,
    pub owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountWithSeedInfo {
    pub source: Address,
    pub new_account: Address,
    pub base: Address,
    pub seed: String,
    #[serde(with = "wide_u64")]
    pub lamports: u64,
    #[serde(with = "wide_u64")]
    pub space: u64,
    pub owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignInfo {
    pub account: Address,
    pub owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignWithSeedInfo {
    pub account: Address,
    pub base: Address,
    pub seed: String,
    pub owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInfo {
    pub source: Address,
    pub destination: Address,
    #[serde(with = "wide_u64")]
    pub lamports: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferWithSeedInfo {
    pub source: Address,
    pub source_base: Address,
    pub destination: Address,
    #[serde(with = "wide_u64")]
    pub lamports: u64,
    pub source_seed: String,
    pub source_owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocateInfo {
    pub account: Address,
    #[serde(with = "wide_u64")]
    pub space: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocateWithSeedInfo {
    pub account: Address,
    pub base: Address,
    pub seed: String,
    #[serde(with = "wide_u64")]
    pub space: u64,
    pub owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceNonceInfo {
    pub nonce_account: Address,
    pub nonce_authority: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawNonceInfo {
    pub nonce_account: Address,
    pub destination: Address,
    pub nonce_authority: Address,
    #[serde(with = "wide_u64")]
    pub lamports: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeNonceInfo {
    pub nonce_account: Address,
    pub nonce_authority: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeNonceInfo {
    pub nonce_account: Address,
    pub nonce_authority: Address,
    pub new_authorized: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeNonceInfo {
    pub nonce_account: Address,
}

pub struct SystemAdapter;

impl ProgramAdapter for SystemAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        parse_schema(
            input.kind.as_ref(),
            input.parsed,
            SystemInstruction::VARIANTS,
        )
            .map(TypedInstruction::System)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::System(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        Ok(FormattedInstruction::new(title_case(ix.as_ref()), rows(ix)))
    }
}

fn rows(ix: &SystemInstruction) -> Vec<Row> {
    match ix {
        SystemInstruction::CreateAccount(info) => vec![
            Row::address("From Address", info.source),
            Row::address("New Address", info.new_account),
            Row::sol("Transfer Amount (SOL)", info.lamports),
            Row::text("Allocated Data Size", format!("{} byte(s)", info.space)),
            Row::address("Assigned Program Id", info.owner),
        ],
        SystemInstruction::CreateAccountWithSeed(info) => vec![
            Row::address("From Address", info.source),
            Row::address("New Address", info.new_account),
            Row::address("Base Address", info.base),
            Row::text("Seed", &info.seed),
            Row::sol("Transfer Amount (SOL)", info.lamports),
            Row::text("Allocated Data Size", format!("{} byte(s)", info.space)),
            Row::address("Assigned Program Id", info.owner),
        ],
        SystemInstruction::Assign(info) => vec![
            Row::address("Account Address", info.account),
            Row::address("Assigned Program Id", info.owner),
        ],
        SystemInstruction::AssignWithSeed(info) => vec![
            Row::address("Account Address", info.account),
            Row::address("Base Address", info.base),
            Row::text("Seed", &info.seed),
            Row::address("Assigned Program Id", info.owner),
        ],
        SystemInstruction::Transfer(info) => vec![
            Row::address("From Address", info.source),
            Row::address("To Address", info.destination),
            Row::sol("Transfer Amount (SOL)", info.lamports),
        ],
        SystemInstruction::TransferWithSeed(info) => vec![
            Row::address("From Address", info.source),
            Row::address("Destination Address", info.destination),
            Row::address("Base Address", info.source_base),
            Row::sol("Transfer Amount (SOL)", info.lamports),
            Row::text("Seed", &info.source_seed),
            Row::address("Source Owner", info.source_owner),
        ],
        SystemInstruction::Allocate(info) => vec![
            Row::address("Account Address", info.account),
            Row::text("Allocated Data Size", format!("{} byte(s)", info.space)),
        ],
        SystemInstruction::AllocateWithSeed(info) => vec![
            Row::address("Account Address", info.account),
            Row::address("Base Address", info.base),
            Row::text("Seed", &info.seed),
            Row::text("Allocated Data Size", format!("{} byte(s)", info.space)),
            Row::address("Assigned Program Id", info.owner),
        ],
        SystemInstruction::AdvanceNonce(info) => vec![
            Row::address("Nonce Address", info.nonce_account),
            Row::address("Authority Address", info.nonce_authority),
        ],
        SystemInstruction::WithdrawNonce(info) => vec![
            Row::address("Nonce Address", info.nonce_account),
            Row::address("Authority Address", info.nonce_authority),
            Row::address("To Address", info.destination),
            Row::sol("Withdraw Amount (SOL)", info.lamports),
        ],
        SystemInstruction::InitializeNonce(info) => vec![
            Row::address("Nonce Address", info.nonce_account),
            Row::address("Authority Address", info.nonce_authority),
        ],
        SystemInstruction::AuthorizeNonce(info) => vec![
            Row::address("Nonce Address", info.nonce_account),
            Row::address("Old Authority Address", info.nonce_authority),
            Row::address("New Authority Address", info.new_authorized),
        ],
        SystemInstruction::UpgradeNonce(info) => {
            vec![Row::address("Nonce Address", info.nonce_account)]
        }
    }
}
