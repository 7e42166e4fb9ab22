use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    mismatch,
};
use crate::error::ValidationError;
use crate::programs::{ProgramKind, invalid_data, read_i64, read_u8, read_u32, read_u64};
use crate::view::{Row, title_case};

const INSTRUCTION_NAMES: [&str; 42] = [
    "initMangoGroup",
    "initMangoAccount",
    "deposit",
    "withdraw",
    "addSpotMarket",
    "addToBasket",
    "borrow",
    "cachePrices",
    "cacheRootBanks",
    "placeSpotOrder",
    "addOracle",
    "addPerpMarket",
    "placePerpOrder",
    "cancelPerpOrderByClientId",
    "cancelPerpOrder",
    "consumeEvents",
    "cachePerpMarkets",
    "updateFunding",
    "setOracle",
    "settleFunds",
    "cancelSpotOrder",
    "updateRootBank",
    "settlePnl",
    "settleBorrow",
    "forceCancelSpotOrders",
    "forceCancelPerpOrders",
    "liquidateTokenAndToken",
    "liquidateTokenAndPerp",
    "liquidatePerpMarket",
    "settleFees",
    "resolvePerpBankruptcy",
    "resolveTokenBankruptcy",
    "initSpotOpenOrders",
    "redeemMngo",
    "addMangoAccountInfo",
    "depositMsrm",
    "withdrawMsrm",
    "changePerpMarketParams",
    "setGroupAdmin",
    "cancelAllPerpOrders",
    "forceSettleQuotePositions",
    "placeSpotOrder2",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PerpSide {
    Bid,
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PerpOrderType {
    Limit,
    ImmediateOrCancel,
    PostOnly,
    Market,
    PostOnlySlide,
}

/// Arguments decoded for the instructions whose layout is fixed; the rest carry only their tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MangoArgs {
    None,
    Deposit {
        quantity: u64,
    },
    Withdraw {
        quantity: u64,
        allow_borrow: bool,
    },
    PlacePerpOrder {
        price: i64,
        quantity: i64,
        client_order_id: u64,
        side: PerpSide,
        order_type: PerpOrderType,
        reduce_only: bool,
    },
    CancelPerpOrderByClientId {
        client_order_id: u64,
        invalid_id_ok: bool,
    },
    CancelPerpOrder {
        order_id: i128,
        invalid_id_ok: bool,
    },
    ConsumeEvents {
        limit: u64,
    },
    CancelAllPerpOrders {
        limit: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MangoInstruction {
    pub tag: u32,
    pub args: MangoArgs,
}

impl MangoInstruction {
    pub fn decode(data: &[u8]) -> Result<Self, ValidationError> {
        let kind = ProgramKind::MangoV3;
        let truncated = || invalid_data(kind, "instruction data too short");
        let tag = read_u32(data, 0).ok_or_else(truncated)?;
        if tag as usize >= INSTRUCTION_NAMES.len() {
            return Err(invalid_data(kind, format!("unknown instruction tag {tag}")));
        }
        let u64_at = |offset| read_u64(data, offset).ok_or_else(truncated);
        let bool_at = |offset| -> Result<bool, ValidationError> {
            match read_u8(data, offset).ok_or_else(truncated)? {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(invalid_data(kind, format!("invalid bool {other}"))),
            }
        };

        let args = match tag {
            2 => MangoArgs::Deposit {
                quantity: u64_at(4)?,
            },
            3 => MangoArgs::Withdraw {
                quantity: u64_at(4)?,
                allow_borrow: bool_at(12)?,
            },
            12 => MangoArgs::PlacePerpOrder {
                price: read_i64(data, 4).ok_or_else(truncated)?,
                quantity: read_i64(data, 12).ok_or_else(truncated)?,
                client_order_id: u64_at(20)?,
                side: match read_u8(data, 28).ok_or_else(truncated)? {
                    0 => PerpSide::Bid,
                    1 => PerpSide::Ask,
                    other => return Err(invalid_data(kind, format!("invalid side {other}"))),
                },
                order_type: match read_u8(data, 29).ok_or_else(truncated)? {
                    0 => PerpOrderType::Limit,
                    1 => PerpOrderType::ImmediateOrCancel,
                    2 => PerpOrderType::PostOnly,
                    3 => PerpOrderType::Market,
                    4 => PerpOrderType::PostOnlySlide,
                    other => {
                        return Err(invalid_data(kind, format!("invalid order type {other}")));
                    }
                },
                reduce_only: bool_at(30)?,
            },
            13 => MangoArgs::CancelPerpOrderByClientId {
                client_order_id: u64_at(4)?,
                invalid_id_ok: bool_at(12)?,
            },
            14 => {
                let bytes = data.get(4..20).ok_or_else(truncated)?;
                let mut order_id = [0_u8; 16];
                order_id.copy_from_slice(bytes);
                MangoArgs::CancelPerpOrder {
                    order_id: i128::from_le_bytes(order_id),
                    invalid_id_ok: bool_at(20)?,
                }
            }
            15 => MangoArgs::ConsumeEvents { limit: u64_at(4)? },
            39 => MangoArgs::CancelAllPerpOrders {
                limit: read_u8(data, 4).ok_or_else(truncated)?,
            },
            _ => MangoArgs::None,
        };
        Ok(Self { tag, args })
    }

    pub fn name(&self) -> &'static str {
        INSTRUCTION_NAMES
            .get(self.tag as usize)
            .copied()
            .unwrap_or("unknown")
    }
}

fn argument_rows(args: MangoArgs) -> Vec<Row> {
    match args {
        MangoArgs::None => Vec::new(),
        MangoArgs::Deposit { quantity } => vec![Row::text("Quantity", quantity)],
        MangoArgs::Withdraw {
            quantity,
            allow_borrow,
        } => vec![
            Row::text("Quantity", quantity),
            Row::text("Allow Borrow", allow_borrow),
        ],
        MangoArgs::PlacePerpOrder {
            price,
            quantity,
            client_order_id,
            side,
            order_type,
            reduce_only,
        } => vec![
            Row::text("Side", side),
            Row::text("Order Type", order_type),
            Row::text("Price", price),
            Row::text("Quantity", quantity),
            Row::text("Client Order Id", client_order_id),
            Row::text("Reduce Only", reduce_only),
        ],
        MangoArgs::CancelPerpOrderByClientId {
            client_order_id,
            invalid_id_ok,
        } => vec![
            Row::text("Client Order Id", client_order_id),
            Row::text("Invalid Id Ok", invalid_id_ok),
        ],
        MangoArgs::CancelPerpOrder {
            order_id,
            invalid_id_ok,
        } => vec![
            Row::text("Order Id", order_id),
            Row::text("Invalid Id Ok", invalid_id_ok),
        ],
        MangoArgs::ConsumeEvents { limit } => vec![Row::text("Limit", limit)],
        MangoArgs::CancelAllPerpOrders { limit } => vec![Row::text("Limit", limit)],
    }
}

pub struct MangoAdapter;

impl ProgramAdapter for MangoAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        MangoInstruction::decode(&input.raw.data).map(TypedInstruction::Mango)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::Mango(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        let mut rows = vec![Row::address("Program", ctx.raw.program_id)];
        if let Some(group) = ctx.raw.account(0) {
            rows.push(Row::account(
                "Mango Group",
                group.address,
                group.is_signer,
                group.is_writable,
            ));
        }
        if let Some(account) = ctx.raw.account(1) {
            rows.push(Row::account(
                "Mango Account",
                account.address,
                account.is_signer,
                account.is_writable,
            ));
        }
        rows.extend(argument_rows(ix.args));
        Ok(FormattedInstruction::new(title_case(ix.name()), rows))
    }
}
