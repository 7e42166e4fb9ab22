use serde::Deserialize;
use strum::VariantNames;

use crate::address::Address;
use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    mismatch,
};
use crate::error::ValidationError;
use crate::programs::{UiTokenAmount, parse_schema, wide_u64};
use crate::view::{Row, title_case};

/// SPL Token and Token-2022 instructions; the two programs share this schema.
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
pub enum TokenInstruction {
    InitializeMint(InitializeMintInfo),
    InitializeMint2(InitializeMintInfo),
    InitializeAccount(InitializeAccountInfo),
    InitializeAccount2(InitializeAccountInfo),
    InitializeAccount3(InitializeAccountInfo),
    InitializeMultisig(InitializeMultisigInfo),
    InitializeMultisig2(InitializeMultisigInfo),
    Transfer(TransferInfo),
    Approve(ApproveInfo),
    Revoke(RevokeInfo),
    SetAuthority(SetAuthorityInfo),
    MintTo(MintToInfo),
    Burn(BurnInfo),
    CloseAccount(CloseAccountInfo),
    FreezeAccount(FreezeInfo),
    ThawAccount(FreezeInfo),
    TransferChecked(TransferCheckedInfo),
    ApproveChecked(ApproveCheckedInfo),
    MintToChecked(MintToCheckedInfo),
    BurnChecked(BurnCheckedInfo),
    SyncNative(AccountOnlyInfo),
    InitializeImmutableOwner(AccountOnlyInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeMintInfo {
    pub mint: Address,
    pub decimals: u8,
    pub mint_authority: Address,
    #[serde(default)]
    pub freeze_authority: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeAccountInfo {
    pub account: Address,
    pub mint: Address,
    pub owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeMultisigInfo {
    pub multisig: Address,
    pub signers: Vec<Address>,
    pub m: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInfo {
    pub source: Address,
    pub destination: Address,
    #[serde(with = "wide_u64")]
    pub amount: u64,
    #[serde(alias = "multisigAuthority")]
    pub authority: Address,
    #[serde(default)]
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveInfo {
    pub source: Address,
    pub delegate: Address,
    #[serde(with = "wide_u64")]
    pub amount: u64,
    #[serde(alias = "multisigOwner")]
    pub owner: Address,
    #[serde(default)]
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeInfo {
    pub source: Address,
    #[serde(alias = "multisigOwner")]
    pub owner: Address,
    #[serde(default)]
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAuthorityInfo {
    #[serde(alias = "mint")]
    pub account: Address,
    pub authority_type: String,
    #[serde(default)]
    pub new_authority: Option<Address>,
    #[serde(alias = "multisigAuthority")]
    pub authority: Address,
    #[serde(default)]
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintToInfo {
    pub mint: Address,
    pub account: Address,
    #[serde(with = "wide_u64")]
    pub amount: u64,
    #[serde(alias = "multisigMintAuthority")]
    pub mint_authority: Address,
    #[serde(default)]
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnInfo {
    pub account: Address,
    pub mint: Address,
    #[serde(with = "wide_u64")]
    pub amount: u64,
    #[serde(alias = "multisigAuthority")]
    pub authority: Address,
    #[serde(default)]
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseAccountInfo {
    pub account: Address,
    pub destination: Address,
    #[serde(alias = "multisigOwner")]
    pub owner: Address,
    #[serde(default)]
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreezeInfo {
    pub account: Address,
    pub mint: Address,
    #[serde(alias = "multisigFreezeAuthority")]
    pub freeze_authority: Address,
    #[serde(default)]
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCheckedInfo {
    pub source: Address,
    pub mint: Address,
    pub destination: Address,
    pub token_amount: UiTokenAmount,
    #[serde(alias = "multisigAuthority")]
    pub authority: Address,
    #[serde(default)]
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveCheckedInfo {
    pub source: Address,
    pub mint: Address,
    pub delegate: Address,
    pub token_amount: UiTokenAmount,
    #[serde(alias = "multisigOwner")]
    pub owner: Address,
    #[serde(default)]
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintToCheckedInfo {
    pub mint: Address,
    pub account: Address,
    pub token_amount: UiTokenAmount,
    #[serde(alias = "multisigMintAuthority")]
    pub mint_authority: Address,
    #[serde(default)]
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnCheckedInfo {
    pub account: Address,
    pub mint: Address,
    pub token_amount: UiTokenAmount,
    #[serde(alias = "multisigAuthority")]
    pub authority: Address,
    #[serde(default)]
    pub signers: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOnlyInfo {
    pub account: Address,
}

pub struct TokenAdapter;

impl ProgramAdapter for TokenAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        parse_schema(
            input.kind.as_ref(),
            input.parsed,
            TokenInstruction::VARIANTS,
        )
            .map(TypedInstruction::Token)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::Token(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        Ok(FormattedInstruction::new(title_case(ix.as_ref()), rows(ix)))
    }
}

fn with_signers(mut rows: Vec<Row>, signers: &[Address]) -> Vec<Row> {
    if !signers.is_empty() {
        let signer_rows = signers
            .iter()
            .enumerate()
            .map(|(position, signer)| Row::address(position.to_string(), *signer))
            .collect();
        rows.push(Row::table("Signers", signer_rows));
    }
    rows
}

fn rows(ix: &TokenInstruction) -> Vec<Row> {
    match ix {
        TokenInstruction::InitializeMint(info) | TokenInstruction::InitializeMint2(info) => {
            let mut rows = vec![
                Row::address("Mint", info.mint),
                Row::text("Decimals", info.decimals),
                Row::address("Mint Authority", info.mint_authority),
            ];
            if let Some(freeze) = info.freeze_authority {
                rows.push(Row::address("Freeze Authority", freeze));
            }
            rows
        }
        TokenInstruction::InitializeAccount(info)
        | TokenInstruction::InitializeAccount2(info)
        | TokenInstruction::InitializeAccount3(info) => vec![
            Row::address("Account", info.account),
            Row::address("Mint", info.mint),
            Row::address("Owner", info.owner),
        ],
        TokenInstruction::InitializeMultisig(info)
        | TokenInstruction::InitializeMultisig2(info) => with_signers(
            vec![
                Row::address("Multisig", info.multisig),
                Row::text("Required Signers", info.m),
            ],
            &info.signers,
        ),
        TokenInstruction::Transfer(info) => with_signers(
            vec![
                Row::address("Source", info.source),
                Row::address("Destination", info.destination),
                Row::address("Authority", info.authority),
                Row::token_amount("Amount", info.amount, None),
            ],
            &info.signers,
        ),
        TokenInstruction::Approve(info) => with_signers(
            vec![
                Row::address("Source", info.source),
                Row::address("Delegate", info.delegate),
                Row::address("Owner", info.owner),
                Row::token_amount("Amount", info.amount, None),
            ],
            &info.signers,
        ),
        TokenInstruction::Revoke(info) => with_signers(
            vec![
                Row::address("Source", info.source),
                Row::address("Owner", info.owner),
            ],
            &info.signers,
        ),
        TokenInstruction::SetAuthority(info) => {
            let mut rows = vec![
                Row::address("Account", info.account),
                Row::text("Authority Type", &info.authority_type),
                Row::address("Authority", info.authority),
            ];
            rows.push(match info.new_authority {
                Some(new_authority) => Row::address("New Authority", new_authority),
                None => Row::text("New Authority", "none"),
            });
            with_signers(rows, &info.signers)
        }
        TokenInstruction::MintTo(info) => with_signers(
            vec![
                Row::address("Mint", info.mint),
                Row::address("Destination", info.account),
                Row::address("Mint Authority", info.mint_authority),
                Row::token_amount("Amount", info.amount, None),
            ],
            &info.signers,
        ),
        TokenInstruction::Burn(info) => with_signers(
            vec![
                Row::address("Account", info.account),
                Row::address("Mint", info.mint),
                Row::address("Authority", info.authority),
                Row::token_amount("Amount", info.amount, None),
            ],
            &info.signers,
        ),
        TokenInstruction::CloseAccount(info) => with_signers(
            vec![
                Row::address("Account", info.account),
                Row::address("Destination", info.destination),
                Row::address("Owner", info.owner),
            ],
            &info.signers,
        ),
        TokenInstruction::FreezeAccount(info) | TokenInstruction::ThawAccount(info) => {
            with_signers(
                vec![
                    Row::address("Account", info.account),
                    Row::address("Mint", info.mint),
                    Row::address("Freeze Authority", info.freeze_authority),
                ],
                &info.signers,
            )
        }
        TokenInstruction::TransferChecked(info) => with_signers(
            vec![
                Row::address("Source", info.source),
                Row::address("Destination", info.destination),
                Row::address("Mint", info.mint),
                Row::address("Authority", info.authority),
                checked_amount(&info.token_amount),
            ],
            &info.signers,
        ),
        TokenInstruction::ApproveChecked(info) => with_signers(
            vec![
                Row::address("Source", info.source),
                Row::address("Delegate", info.delegate),
                Row::address("Mint", info.mint),
                Row::address("Owner", info.owner),
                checked_amount(&info.token_amount),
            ],
            &info.signers,
        ),
        TokenInstruction::MintToChecked(info) => with_signers(
            vec![
                Row::address("Mint", info.mint),
                Row::address("Destination", info.account),
                Row::address("Mint Authority", info.mint_authority),
                checked_amount(&info.token_amount),
            ],
            &info.signers,
        ),
        TokenInstruction::BurnChecked(info) => with_signers(
            vec![
                Row::address("Account", info.account),
                Row::address("Mint", info.mint),
                Row::address("Authority", info.authority),
                checked_amount(&info.token_amount),
            ],
            &info.signers,
        ),
        TokenInstruction::SyncNative(info) | TokenInstruction::InitializeImmutableOwner(info) => {
            vec![Row::address("Account", info.account)]
        }
    }
}

fn checked_amount(amount: &UiTokenAmount) -> Row {
    Row::token_amount("Amount", amount.amount, Some(amount.decimals))
}
