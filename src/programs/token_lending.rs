use crate::address::Address;
use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    labelled_accounts, mismatch,
};
use crate::error::ValidationError;
use crate::programs::{ProgramKind, invalid_data, read_address, read_u8, read_u64};
use crate::view::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::AsRefStr)]
#[strum(serialize_all = "title_case")]
pub enum TokenLendingInstruction {
    InitLendingMarket { owner: Address },
    SetLendingMarketOwner { new_owner: Address },
    InitReserve { liquidity_amount: u64 },
    RefreshReserve,
    DepositReserveLiquidity { liquidity_amount: u64 },
    RedeemReserveCollateral { collateral_amount: u64 },
    InitObligation,
    RefreshObligation,
    DepositObligationCollateral { collateral_amount: u64 },
    WithdrawObligationCollateral { collateral_amount: u64 },
    BorrowObligationLiquidity { liquidity_amount: u64 },
    RepayObligationLiquidity { liquidity_amount: u64 },
    LiquidateObligation { liquidity_amount: u64 },
    FlashLoan { amount: u64 },
}

impl TokenLendingInstruction {
    pub fn decode(data: &[u8]) -> Result<Self, ValidationError> {
        let kind = ProgramKind::TokenLending;
        let truncated = || invalid_data(kind, "instruction data too short");
        let tag = read_u8(data, 0).ok_or_else(|| invalid_data(kind, "empty instruction data"))?;
        let amount = || read_u64(data, 1).ok_or_else(truncated);
        let address = || read_address(data, 1).ok_or_else(truncated);
        Ok(match tag {
            0 => Self::InitLendingMarket { owner: address()? },
            1 => Self::SetLendingMarketOwner {
                new_owner: address()?,
            },
            2 => Self::InitReserve {
                liquidity_amount: amount()?,
            },
            3 => Self::RefreshReserve,
            4 => Self::DepositReserveLiquidity {
                liquidity_amount: amount()?,
            },
            5 => Self::RedeemReserveCollateral {
                collateral_amount: amount()?,
            },
            6 => Self::InitObligation,
            7 => Self::RefreshObligation,
            8 => Self::DepositObligationCollateral {
                collateral_amount: amount()?,
            },
            9 => Self::WithdrawObligationCollateral {
                collateral_amount: amount()?,
            },
            10 => Self::BorrowObligationLiquidity {
                liquidity_amount: amount()?,
            },
            11 => Self::RepayObligationLiquidity {
                liquidity_amount: amount()?,
            },
            12 => Self::LiquidateObligation {
                liquidity_amount: amount()?,
            },
            13 => Self::FlashLoan { amount: amount()? },
            other => return Err(invalid_data(kind, format!("unknown instruction tag {other}"))),
        })
    }

    fn account_labels(self) -> &'static [&'static str] {
        match self {
            Self::InitLendingMarket { .. } => &[
                "Lending Market",
                "Rent Sysvar",
                "Token Program",
                "Oracle Program",
            ],
            Self::SetLendingMarketOwner { .. } => &["Lending Market", "Current Owner"],
            Self::InitReserve { .. } => &[
                "Source Liquidity",
                "Destination Collateral",
                "Reserve",
                "Reserve Liquidity Mint",
                "Reserve Liquidity Supply",
                "Reserve Liquidity Fee Receiver",
                "Reserve Collateral Mint",
                "Reserve Collateral Supply",
                "Pyth Product",
                "Pyth Price",
                "Lending Market",
            ],
            Self::RefreshReserve => &["Reserve", "Reserve Liquidity Oracle", "Clock Sysvar"],
            Self::DepositReserveLiquidity { .. } => &[
                "Source Liquidity",
                "Destination Collateral",
                "Reserve",
                "Reserve Liquidity Supply",
                "Reserve Collateral Mint",
                "Lending Market",
            ],
            Self::RedeemReserveCollateral { .. } => &[
                "Source Collateral",
                "Destination Liquidity",
                "Reserve",
                "Reserve Collateral Mint",
                "Reserve Liquidity Supply",
                "Lending Market",
            ],
            Self::InitObligation => &["Obligation", "Lending Market", "Obligation Owner"],
            Self::RefreshObligation => &["Obligation", "Clock Sysvar"],
            Self::DepositObligationCollateral { .. } => &[
                "Source Collateral",
                "Destination Collateral",
                "Deposit Reserve",
                "Obligation",
                "Lending Market",
            ],
            Self::WithdrawObligationCollateral { .. } => &[
                "Source Collateral",
                "Destination Collateral",
                "Withdraw Reserve",
                "Obligation",
                "Lending Market",
            ],
            Self::BorrowObligationLiquidity { .. } => &[
                "Source Liquidity",
                "Destination Liquidity",
                "Borrow Reserve",
                "Borrow Reserve Liquidity Fee Receiver",
                "Obligation",
                "Lending Market",
            ],
            Self::RepayObligationLiquidity { .. } => &[
                "Source Liquidity",
                "Destination Liquidity",
                "Repay Reserve",
                "Obligation",
                "Lending Market",
            ],
            Self::LiquidateObligation { .. } => &[
                "Source Liquidity",
                "Destination Collateral",
                "Repay Reserve",
                "Repay Reserve Liquidity Supply",
                "Withdraw Reserve",
                "Withdraw Reserve Collateral Supply",
                "Obligation",
                "Lending Market",
            ],
            Self::FlashLoan { .. } => &[
                "Source Liquidity",
                "Destination Liquidity",
                "Reserve",
                "Flash Loan Fee Receiver",
                "Host Fee Receiver",
                "Lending Market",
            ],
        }
    }

    fn argument_rows(self) -> Vec<Row> {
        match self {
            Self::InitLendingMarket { owner } => vec![Row::address("Owner", owner)],
            Self::SetLendingMarketOwner { new_owner } => vec![Row::address("New Owner", new_owner)],
            Self::InitReserve { liquidity_amount }
            | Self::DepositReserveLiquidity { liquidity_amount }
            | Self::BorrowObligationLiquidity { liquidity_amount }
            | Self::RepayObligationLiquidity { liquidity_amount }
            | Self::LiquidateObligation { liquidity_amount } => {
                vec![Row::text("Liquidity Amount", liquidity_amount)]
            }
            Self::RedeemReserveCollateral { collateral_amount }
            | Self::DepositObligationCollateral { collateral_amount }
            | Self::WithdrawObligationCollateral { collateral_amount } => {
                vec![Row::text("Collateral Amount", collateral_amount)]
            }
            Self::FlashLoan { amount } => vec![Row::text("Amount", amount)],
            Self::RefreshReserve | Self::InitObligation | Self::RefreshObligation => Vec::new(),
        }
    }
}

pub struct TokenLendingAdapter;

impl ProgramAdapter for TokenLendingAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        TokenLendingInstruction::decode(&input.raw.data).map(TypedInstruction::TokenLending)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::TokenLending(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        let mut rows = labelled_accounts(ctx.raw, ix.account_labels());
        rows.extend(ix.argument_rows());
        Ok(FormattedInstruction::new(ix.as_ref(), rows))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn decodes_amount_instructions() {
        let mut data = vec![10];
        data.extend_from_slice(&250_u64.to_le_bytes());
        let ix = TokenLendingInstruction::decode(&data).unwrap();
        assert_eq!(
            ix,
            TokenLendingInstruction::BorrowObligationLiquidity {
                liquidity_amount: 250
            }
        );
        assert_eq!(ix.as_ref(), "Borrow Obligation Liquidity");
        assert_eq!(
            ix.argument_rows(),
            vec![Row::text("Liquidity Amount", "250")]
        );
    }

    #[test]
    fn decodes_owner_change() {
        let mut data = vec![1];
        data.extend_from_slice(&[6; 32]);
        assert_eq!(
            TokenLendingInstruction::decode(&data).unwrap(),
            TokenLendingInstruction::SetLendingMarketOwner {
                new_owner: Address::new([6; 32])
            }
        );
    }

    #[test]
    fn rejects_short_and_unknown() {
        assert!(TokenLendingInstruction::decode(&[4, 1, 2]).is_err());
        assert!(TokenLendingInstruction::decode(&[14]).is_err());
        assert!(TokenLendingInstruction::decode(&[]).is_err());
    }
}
