use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    mismatch,
};
use crate::error::ValidationError;
use crate::programs::{ProgramKind, invalid_data, read_u8, read_u32, read_u64};
use crate::view::Row;

/// Decoded from raw bytes: a one-byte discriminant followed by little-endian arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeBudgetInstruction {
    RequestUnits { units: u32, additional_fee: u32 },
    RequestHeapFrame { bytes: u32 },
    SetComputeUnitLimit { units: u32 },
    SetComputeUnitPrice { micro_lamports: u64 },
    SetLoadedAccountsDataSizeLimit { bytes: u32 },
}

impl ComputeBudgetInstruction {
    pub fn decode(data: &[u8]) -> Result<Self, ValidationError> {
        let kind = ProgramKind::ComputeBudget;
        let truncated = || invalid_data(kind, "instruction data too short");
        let tag = read_u8(data, 0).ok_or_else(|| invalid_data(kind, "empty instruction data"))?;
        let u32_arg = |offset| read_u32(data, offset).ok_or_else(truncated);
        match tag {
            0 => Ok(Self::RequestUnits {
                units: u32_arg(1)?,
                additional_fee: u32_arg(5)?,
            }),
            1 => Ok(Self::RequestHeapFrame { bytes: u32_arg(1)? }),
            2 => Ok(Self::SetComputeUnitLimit { units: u32_arg(1)? }),
            3 => Ok(Self::SetComputeUnitPrice {
                micro_lamports: read_u64(data, 1).ok_or_else(truncated)?,
            }),
            4 => Ok(Self::SetLoadedAccountsDataSizeLimit { bytes: u32_arg(1)? }),
            other => Err(invalid_data(kind, format!("unknown discriminant {other}"))),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::RequestUnits { .. } => "Request Units (Deprecated)",
            Self::RequestHeapFrame { .. } => "Request Heap Frame",
            Self::SetComputeUnitLimit { .. } => "Set Compute Unit Limit",
            Self::SetComputeUnitPrice { .. } => "Set Compute Unit Price",
            Self::SetLoadedAccountsDataSizeLimit { .. } => "Set Loaded Accounts Data Size Limit",
        }
    }
}

pub struct ComputeBudgetAdapter;

impl ProgramAdapter for ComputeBudgetAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        ComputeBudgetInstruction::decode(&input.raw.data).map(TypedInstruction::ComputeBudget)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::ComputeBudget(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        let rows = match *ix {
            ComputeBudgetInstruction::RequestUnits {
                units,
                additional_fee,
            } => vec![
                Row::text("Requested Compute Units", format!("{units} compute units")),
                Row::sol("Additional Fee (SOL)", u64::from(additional_fee)),
            ],
            ComputeBudgetInstruction::RequestHeapFrame { bytes } => {
                vec![Row::text("Requested Heap Frame", format!("{bytes} bytes"))]
            }
            ComputeBudgetInstruction::SetComputeUnitLimit { units } => {
                vec![Row::text("Compute Unit Limit", format!("{units} compute units"))]
            }
            ComputeBudgetInstruction::SetComputeUnitPrice { micro_lamports } => vec![Row::text(
                "Compute Unit Price",
                format!("{micro_lamports} micro-lamports per compute unit"),
            )],
            ComputeBudgetInstruction::SetLoadedAccountsDataSizeLimit { bytes } => {
                vec![Row::text("Loaded Accounts Data Size Limit", format!("{bytes} bytes"))]
            }
        };
        Ok(FormattedInstruction::new(ix.name(), rows))
    }
}
