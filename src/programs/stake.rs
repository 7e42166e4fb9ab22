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
pub enum StakeInstruction {
    Initialize(InitializeInfo),
    InitializeChecked(InitializeCheckedInfo),
    Authorize(AuthorizeInfo),
    AuthorizeChecked(AuthorizeInfo),
    Delegate(DelegateInfo),
    Split(SplitInfo),
    Withdraw(WithdrawInfo),
    Deactivate(DeactivateInfo),
    DeactivateDelinquent(DeactivateDelinquentInfo),
    SetLockup(SetLockupInfo),
    Merge(MergeInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorized {
    pub staker: Address,
    pub withdrawer: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lockup {
    pub unix_timestamp: i64,
    #[serde(with = "wide_u64")]
    pub epoch: u64,
    pub custodian: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeInfo {
    pub stake_account: Address,
    pub authorized: Authorized,
    pub lockup: Lockup,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeCheckedInfo {
    pub stake_account: Address,
    pub staker: Address,
    pub withdrawer: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeInfo {
    pub stake_account: Address,
    pub authority: Address,
    pub new_authority: Address,
    pub authority_type: String,
    #[serde(default)]
    pub custodian: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateInfo {
    pub stake_account: Address,
    pub vote_account: Address,
    pub stake_authority: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitInfo {
    pub stake_account: Address,
    pub new_split_account: Address,
    pub stake_authority: Address,
    #[serde(with = "wide_u64")]
    pub lamports: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawInfo {
    pub stake_account: Address,
    pub destination: Address,
    pub withdraw_authority: Address,
    #[serde(with = "wide_u64")]
    pub lamports: u64,
    #[serde(default)]
    pub custodian: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateInfo {
    pub stake_account: Address,
    pub stake_authority: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateDelinquentInfo {
    pub stake_account: Address,
    pub vote_account: Address,
    pub reference_vote_account: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockupArgs {
    #[serde(default)]
    pub unix_timestamp: Option<i64>,
    #[serde(default, with = "wide_u64::option")]
    pub epoch: Option<u64>,
    #[serde(default)]
    pub custodian: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLockupInfo {
    pub stake_account: Address,
    pub custodian: Address,
    pub lockup: LockupArgs,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeInfo {
    pub destination: Address,
    pub source: Address,
    pub stake_authority: Address,
}

pub struct StakeAdapter;

impl ProgramAdapter for StakeAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        parse_schema(
            input.kind.as_ref(),
            input.parsed,
            StakeInstruction::VARIANTS,
        )
            .map(TypedInstruction::Stake)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::Stake(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        Ok(FormattedInstruction::new(title_case(ix.as_ref()), rows(ix)))
    }
}

fn rows(ix: &StakeInstruction) -> Vec<Row> {
    match ix {
        StakeInstruction::Initialize(info) => {
            let mut rows = vec![
                Row::address("Stake Address", info.stake_account),
                Row::address("Stake Authority Address", info.authorized.staker),
                Row::address("Withdraw Authority Address", info.authorized.withdrawer),
            ];
            // An all-default lockup is not worth a row.
            if info.lockup.epoch > 0 {
                rows.push(Row::text("Lockup Expiry Epoch", info.lockup.epoch));
            }
            if info.lockup.unix_timestamp > 0 {
                rows.push(Row::text("Lockup Expiry Timestamp", info.lockup.unix_timestamp));
            }
            rows.push(Row::address("Lockup Custodian Address", info.lockup.custodian));
            rows
        }
        StakeInstruction::InitializeChecked(info) => vec![
            Row::address("Stake Address", info.stake_account),
            Row::address("Stake Authority Address", info.staker),
            Row::address("Withdraw Authority Address", info.withdrawer),
        ],
        StakeInstruction::Authorize(info) | StakeInstruction::AuthorizeChecked(info) => {
            let mut rows = vec![
                Row::address("Stake Address", info.stake_account),
                Row::address("Old Authority Address", info.authority),
                Row::address("New Authority Address", info.new_authority),
                Row::text("Authority Type", &info.authority_type),
            ];
            if let Some(custodian) = info.custodian {
                rows.push(Row::address("Lockup Custodian Address", custodian));
            }
            rows
        }
        StakeInstruction::Delegate(info) => vec![
            Row::address("Stake Address", info.stake_account),
            Row::address("Delegated Vote Address", info.vote_account),
            Row::address("Authority Address", info.stake_authority),
        ],
        StakeInstruction::Split(info) => vec![
            Row::address("Stake Address", info.stake_account),
            Row::address("Authority Address", info.stake_authority),
            Row::address("New Stake Address", info.new_split_account),
            Row::sol("Split Amount (SOL)", info.lamports),
        ],
        StakeInstruction::Withdraw(info) => {
            let mut rows = vec![
                Row::address("Stake Address", info.stake_account),
                Row::address("Authority Address", info.withdraw_authority),
                Row::address("To Address", info.destination),
                Row::sol("Withdraw Amount (SOL)", info.lamports),
            ];
            if let Some(custodian) = info.custodian {
                rows.push(Row::address("Lockup Custodian Address", custodian));
            }
            rows
        }
        StakeInstruction::Deactivate(info) => vec![
            Row::address("Stake Address", info.stake_account),
            Row::address("Authority Address", info.stake_authority),
        ],
        StakeInstruction::DeactivateDelinquent(info) => vec![
            Row::address("Stake Address", info.stake_account),
            Row::address("Delinquent Vote Address", info.vote_account),
            Row::address("Reference Vote Address", info.reference_vote_account),
        ],
        StakeInstruction::SetLockup(info) => {
            let mut rows = vec![
                Row::address("Stake Address", info.stake_account),
                Row::address("Lockup Authority Address", info.custodian),
            ];
            if let Some(epoch) = info.lockup.epoch {
                rows.push(Row::text("Lockup Expiry Epoch", epoch));
            }
            if let Some(timestamp) = info.lockup.unix_timestamp {
                rows.push(Row::text("Lockup Expiry Timestamp", timestamp));
            }
            if let Some(custodian) = info.lockup.custodian {
                rows.push(Row::address("New Lockup Custodian Address", custodian));
            }
            rows
        }
        StakeInstruction::Merge(info) => vec![
            Row::address("Stake Source", info.source),
            Row::address("Stake Destination", info.destination),
            Row::address("Authority Address", info.stake_authority),
        ],
    }
}
