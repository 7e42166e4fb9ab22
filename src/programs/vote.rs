use serde::Deserialize;
use strum::VariantNames;

use crate::address::Address;
use crate::dispatch::attributes::{attribute_rows, attribute_struct};
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
pub enum VoteInstruction {
    Vote(VoteInfo),
    VoteSwitch(VoteSwitchInfo),
    UpdateVoteState(UpdateVoteStateInfo),
    UpdateVoteStateSwitch(UpdateVoteStateInfo),
    CompactUpdateVoteState(UpdateVoteStateInfo),
    CompactUpdateVoteStateSwitch(UpdateVoteStateInfo),
    TowerSync(TowerSyncInfo),
    TowerSyncSwitch(TowerSyncInfo),
    Initialize(InitializeInfo),
    Authorize(AuthorizeInfo),
    AuthorizeChecked(AuthorizeInfo),
    Withdraw(WithdrawInfo),
    UpdateValidatorIdentity(UpdateValidatorIdentityInfo),
    UpdateCommission(UpdateCommissionInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    #[serde(with = "wide_u64::vec")]
    pub slots: Vec<u64>,
    pub hash: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteInfo {
    pub vote_account: Address,
    pub vote_authority: Address,
    pub vote: Vote,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSwitchInfo {
    pub vote_account: Address,
    pub vote_authority: Address,
    pub vote: Vote,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lockout {
    #[serde(with = "wide_u64")]
    pub slot: u64,
    pub confirmation_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStateUpdate {
    pub lockouts: Vec<Lockout>,
    #[serde(default, with = "wide_u64::option")]
    pub root: Option<u64>,
    pub hash: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVoteStateInfo {
    pub vote_account: Address,
    pub vote_authority: Address,
    pub vote_state_update: VoteStateUpdate,
    #[serde(default)]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerSync {
    pub lockouts: Vec<Lockout>,
    #[serde(default, with = "wide_u64::option")]
    pub root: Option<u64>,
    pub hash: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub block_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerSyncInfo {
    pub vote_account: Address,
    pub vote_authority: Address,
    pub tower_sync: TowerSync,
    #[serde(default)]
    pub hash: Option<String>,
}

attribute_struct! {
    pub struct InitializeInfo {
        pub vote_account: Address,
        #[serde(default)]
        pub rent_sysvar: Option<Address>,
        #[serde(default)]
        pub clock_sysvar: Option<Address>,
        pub node: Address,
        pub authorized_voter: Address,
        pub authorized_withdrawer: Address,
        pub commission: u8,
    }
}

attribute_struct! {
    pub struct AuthorizeInfo {
        pub vote_account: Address,
        #[serde(default)]
        pub clock_sysvar: Option<Address>,
        pub authority: Address,
        pub new_authority: Address,
        pub authority_type: String,
    }
}

attribute_struct! {
    pub struct WithdrawInfo {
        pub vote_account: Address,
        pub destination: Address,
        pub withdraw_authority: Address,
        #[serde(with = "wide_u64")]
        pub lamports: u64,
    }
}

attribute_struct! {
    pub struct UpdateValidatorIdentityInfo {
        pub vote_account: Address,
        pub new_validator_identity: Address,
        pub withdraw_authority: Address,
    }
}

attribute_struct! {
    pub struct UpdateCommissionInfo {
        pub vote_account: Address,
        pub withdraw_authority: Address,
        pub commission: u8,
    }
}

pub struct VoteAdapter;

impl ProgramAdapter for VoteAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        parse_schema(input.kind.as_ref(), input.parsed, VoteInstruction::VARIANTS)
            .map(TypedInstruction::Vote)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::Vote(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        Ok(FormattedInstruction::new(title_case(ix.as_ref()), rows(ix)))
    }
}

fn rows(ix: &VoteInstruction) -> Vec<Row> {
    match ix {
        VoteInstruction::Vote(info) => {
            let mut rows = vote_header(info.vote_account, info.vote_authority);
            rows.extend(vote_rows(&info.vote));
            rows
        }
        VoteInstruction::VoteSwitch(info) => {
            let mut rows = vote_header(info.vote_account, info.vote_authority);
            rows.extend(vote_rows(&info.vote));
            rows.push(Row::text("Switch Proof Hash", &info.hash));
            rows
        }
        VoteInstruction::UpdateVoteState(info)
        | VoteInstruction::UpdateVoteStateSwitch(info)
        | VoteInstruction::CompactUpdateVoteState(info)
        | VoteInstruction::CompactUpdateVoteStateSwitch(info) => {
            let update = &info.vote_state_update;
            let mut rows = vote_header(info.vote_account, info.vote_authority);
            rows.extend(tower_rows(
                &update.lockouts,
                update.root,
                &update.hash,
                update.timestamp,
            ));
            if let Some(hash) = &info.hash {
                rows.push(Row::text("Switch Proof Hash", hash));
            }
            rows
        }
        VoteInstruction::TowerSync(info) | VoteInstruction::TowerSyncSwitch(info) => {
            let tower = &info.tower_sync;
            let mut rows = vote_header(info.vote_account, info.vote_authority);
            rows.extend(tower_rows(&tower.lockouts, tower.root, &tower.hash, tower.timestamp));
            rows.push(Row::text("Block Id", &tower.block_id));
            if let Some(hash) = &info.hash {
                rows.push(Row::text("Switch Proof Hash", hash));
            }
            rows
        }
        VoteInstruction::Initialize(info) => attribute_rows(info),
        VoteInstruction::Authorize(info) | VoteInstruction::AuthorizeChecked(info) => {
            attribute_rows(info)
        }
        VoteInstruction::Withdraw(info) => attribute_rows(info),
        VoteInstruction::UpdateValidatorIdentity(info) => attribute_rows(info),
        VoteInstruction::UpdateCommission(info) => attribute_rows(info),
    }
}

fn vote_header(vote_account: Address, authority: Address) -> Vec<Row> {
    vec![
        Row::address("Vote Account", vote_account),
        Row::address("Vote Authority", authority),
    ]
}

fn vote_rows(vote: &Vote) -> Vec<Row> {
    let slots = vote
        .slots
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let mut rows = vec![Row::text("Slots", slots), Row::text("Hash", &vote.hash)];
    if let Some(timestamp) = vote.timestamp {
        rows.push(Row::text("Timestamp", timestamp));
    }
    rows
}

fn tower_rows(
    lockouts: &[Lockout],
    root: Option<u64>,
    hash: &str,
    timestamp: Option<i64>,
) -> Vec<Row> {
    let lockout_rows = lockouts
        .iter()
        .map(|lockout| Row::text(lockout.slot.to_string(), lockout.confirmation_count))
        .collect();
    let mut rows = vec![Row::table("Lockouts", lockout_rows)];
    if let Some(root) = root {
        rows.push(Row::text("Root", root));
    }
    rows.push(Row::text("Hash", hash));
    if let Some(timestamp) = timestamp {
        rows.push(Row::text("Timestamp", timestamp));
    }
    rows
}
