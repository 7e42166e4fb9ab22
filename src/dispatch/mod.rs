pub mod attributes;

use crate::address::Address;
use crate::error::ValidationError;
use crate::programs::address_lookup_table::{
    AddressLookupTableAdapter, AddressLookupTableInstruction,
};
use crate::programs::anchor::{AnchorAdapter, AnchorInstruction, Idl};
use crate::programs::associated_token::{AssociatedTokenAdapter, AssociatedTokenInstruction};
use crate::programs::bpf_loader::{BpfLoaderAdapter, BpfLoaderInstruction};
use crate::programs::compute_budget::{ComputeBudgetAdapter, ComputeBudgetInstruction};
use crate::programs::mango::{MangoAdapter, MangoInstruction};
use crate::programs::memo::{MemoAdapter, MemoInstruction};
use crate::programs::pyth::{PythAdapter, PythInstruction};
use crate::programs::serum::{SerumAdapter, SerumInstruction};
use crate::programs::stake::{StakeAdapter, StakeInstruction};
use crate::programs::system::{SystemAdapter, SystemInstruction};
use crate::programs::token::{TokenAdapter, TokenInstruction};
use crate::programs::token_lending::{TokenLendingAdapter, TokenLendingInstruction};
use crate::programs::upgradeable_loader::{UpgradeableLoaderAdapter, UpgradeableLoaderInstruction};
use crate::programs::vote::{VoteAdapter, VoteInstruction};
use crate::programs::wormhole::{WormholeAdapter, WormholeInstruction};
use crate::programs::{Program, ProgramKind};
use crate::types::{InstructionFailure, ParsedInstruction, RawInstruction};
use crate::view::{FallbackReason, InstructionStatus, InstructionViewModel, Row};

/// Closed set of validated instructions, one variant per program family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedInstruction {
    System(SystemInstruction),
    Stake(StakeInstruction),
    Vote(VoteInstruction),
    BpfLoader(BpfLoaderInstruction),
    UpgradeableLoader(UpgradeableLoaderInstruction),
    AddressLookupTable(AddressLookupTableInstruction),
    AssociatedToken(AssociatedTokenInstruction),
    Token(TokenInstruction),
    Memo(MemoInstruction),
    ComputeBudget(ComputeBudgetInstruction),
    Serum(SerumInstruction),
    Pyth(PythInstruction),
    Mango(MangoInstruction),
    TokenLending(TokenLendingInstruction),
    Wormhole(WormholeInstruction),
    Anchor(AnchorInstruction),
}

/// Everything a schema may look at for one instruction.
pub struct InstructionInput<'a> {
    pub kind: ProgramKind,
    pub raw: &'a RawInstruction,
    pub parsed: Option<&'a ParsedInstruction>,
    pub idl: Option<&'a Idl>,
}

pub struct FormatContext<'a> {
    pub index: usize,
    pub kind: ProgramKind,
    pub raw: &'a RawInstruction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedInstruction {
    pub name: String,
    pub rows: Vec<Row>,
    /// Overrides the registry's display name (Anchor programs name themselves).
    pub program_name: Option<String>,
}

impl FormattedInstruction {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
            program_name: None,
        }
    }
}

/// Schema + formatter pair for one program family.
pub trait ProgramAdapter: Sync {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError>;

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError>;
}

pub fn adapter_for(kind: ProgramKind) -> Option<&'static dyn ProgramAdapter> {
    match kind {
        ProgramKind::System => Some(&SystemAdapter),
        ProgramKind::Stake => Some(&StakeAdapter),
        ProgramKind::Vote => Some(&VoteAdapter),
        ProgramKind::BpfLoader | ProgramKind::BpfLoader2 => Some(&BpfLoaderAdapter),
        ProgramKind::BpfUpgradeableLoader => Some(&UpgradeableLoaderAdapter),
        ProgramKind::AddressLookupTable => Some(&AddressLookupTableAdapter),
        ProgramKind::AssociatedToken => Some(&AssociatedTokenAdapter),
        ProgramKind::Token | ProgramKind::Token2022 => Some(&TokenAdapter),
        ProgramKind::Memo => Some(&MemoAdapter),
        ProgramKind::ComputeBudget => Some(&ComputeBudgetAdapter),
        ProgramKind::SerumV1
        | ProgramKind::SerumV2
        | ProgramKind::SerumV3
        | ProgramKind::OpenBook => Some(&SerumAdapter),
        ProgramKind::Pyth => Some(&PythAdapter),
        ProgramKind::MangoV3 => Some(&MangoAdapter),
        ProgramKind::TokenLending => Some(&TokenLendingAdapter),
        ProgramKind::WormholeCore | ProgramKind::WormholeTokenBridge => Some(&WormholeAdapter),
        ProgramKind::Anchor => Some(&AnchorAdapter),
        ProgramKind::Config | ProgramKind::Ed25519 | ProgramKind::Secp256k1 => None,
    }
}

pub(crate) fn mismatch(kind: ProgramKind) -> ValidationError {
    ValidationError::ProgramMismatch {
        program: kind.to_string(),
    }
}

/// Refine one instruction for a recognised program. Never panics.
pub fn validate(input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
    match adapter_for(input.kind) {
        Some(adapter) => adapter.validate(input),
        None => Err(ValidationError::NoSchema {
            program: input.kind.to_string(),
        }),
    }
}

/// Per-instruction context the dispatcher merges into the view model.
pub struct DispatchContext<'a> {
    pub index: usize,
    pub raw: &'a RawInstruction,
    /// The transaction's instruction failure, if any; only applied when its index matches.
    pub failure: Option<&'a InstructionFailure>,
    /// Already-built children, in execution order.
    pub inner: Vec<InstructionViewModel>,
}

impl DispatchContext<'_> {
    fn status(&self) -> InstructionStatus {
        match self.failure {
            Some(failure) if failure.index == self.index => InstructionStatus::Failed {
                error: failure.error.clone(),
            },
            _ => InstructionStatus::Success,
        }
    }
}

/// Select a formatter and build the view model. Total: any failure yields the generic view.
pub fn format(
    program: Program,
    validated: Result<&TypedInstruction, &ValidationError>,
    ctx: DispatchContext<'_>,
) -> InstructionViewModel {
    let kind = match program {
        Program::Known(kind) => kind,
        Program::Unknown(_) => return format_unknown(None, FallbackReason::UnknownProgram, ctx),
    };

    let typed = match validated {
        Ok(typed) => typed,
        Err(ValidationError::NoSchema { .. }) => {
            return format_unknown(Some(kind), FallbackReason::NoSchema, ctx);
        }
        Err(err) => {
            return format_unknown(Some(kind), FallbackReason::Validation(err.clone()), ctx);
        }
    };

    let Some(adapter) = adapter_for(kind) else {
        return format_unknown(Some(kind), FallbackReason::NoSchema, ctx);
    };

    let format_ctx = FormatContext {
        index: ctx.index,
        kind,
        raw: ctx.raw,
    };
    match adapter.format(typed, &format_ctx) {
        Ok(formatted) => {
            let program_name = formatted
                .program_name
                .unwrap_or_else(|| kind.display_name().to_string());
            InstructionViewModel {
                index: ctx.index,
                program_id: ctx.raw.program_id,
                program: Some(kind),
                title: format!("{program_name}: {}", formatted.name),
                rows: formatted.rows,
                status: ctx.status(),
                inner_view_models: ctx.inner,
                fallback: None,
            }
        }
        Err(err) => {
            tracing::warn!(
                index = ctx.index,
                program = %kind,
                error = %err,
                "formatter rejected instruction"
            );
            format_unknown(Some(kind), FallbackReason::Validation(err), ctx)
        }
    }
}

/// Program row, one row per account key with signer/writable flags, and a hex dump of the data.
pub fn format_unknown(
    kind: Option<ProgramKind>,
    reason: FallbackReason,
    ctx: DispatchContext<'_>,
) -> InstructionViewModel {
    let raw = ctx.raw;
    let title = match kind {
        Some(kind) => format!("{}: Unknown Instruction", kind.display_name()),
        None => "Unknown Program".to_string(),
    };
    let mut rows = Vec::with_capacity(raw.account_keys.len() + 2);
    rows.push(Row::address("Program", raw.program_id));
    rows.extend(raw.account_keys.iter().enumerate().map(|(position, account)| {
        Row::account(
            format!("Account #{}", position + 1),
            account.address,
            account.is_signer,
            account.is_writable,
        )
    }));
    rows.push(Row::data("Instruction Data (Hex)", &raw.data));

    InstructionViewModel {
        index: ctx.index,
        program_id: raw.program_id,
        program: kind,
        title,
        rows,
        status: ctx.status(),
        inner_view_models: ctx.inner,
        fallback: Some(reason),
    }
}

/// Label each account of `raw` by position; extra accounts get numbered labels.
pub(crate) fn labelled_accounts<S: AsRef<str>>(raw: &RawInstruction, labels: &[S]) -> Vec<Row> {
    raw.account_keys
        .iter()
        .enumerate()
        .map(|(position, account)| {
            let label = labels.get(position).map_or_else(
                || format!("Account #{}", position + 1),
                |l| l.as_ref().to_string(),
            );
            Row::account(
                label,
                account.address,
                account.is_signer,
                account.is_writable,
            )
        })
        .collect()
}

pub(crate) fn account_address(raw: &RawInstruction, position: usize) -> Option<Address> {
    raw.account(position)
        .and_then(|a| a.address.known().copied())
}
