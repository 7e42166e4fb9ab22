use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    labelled_accounts, mismatch,
};
use crate::error::ValidationError;
use crate::programs::{ProgramKind, invalid_data, read_u8, read_u16, read_u32, read_u64, read_u128};
use crate::view::Row;

/// Serum DEX (all versions) and its OpenBook fork: version byte, u32 tag, packed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerumInstruction {
    pub version: u8,
    pub op: SerumOp,
}

#[derive(Debug, Clone, PartialEq, Eq, strum_macros::AsRefStr)]
#[strum(serialize_all = "title_case")]
pub enum SerumOp {
    InitializeMarket,
    NewOrder,
    MatchOrders { limit: u16 },
    ConsumeEvents { limit: u16 },
    CancelOrder,
    SettleFunds,
    CancelOrderByClientId { client_id: u64 },
    DisableMarket,
    SweepFees,
    NewOrderV2,
    NewOrderV3(NewOrderV3),
    CancelOrderV2 { side: Side, order_id: u128 },
    CancelOrderByClientIdV2 { client_id: u64 },
    SendTake(SendTake),
    CloseOpenOrders,
    InitOpenOrders,
    Prune { limit: u16 },
    ConsumeEventsPermissioned { limit: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Side {
    Bid,
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum OrderType {
    Limit,
    ImmediateOrCancel,
    PostOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SelfTradeBehavior {
    DecrementTake,
    CancelProvide,
    AbortTransaction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderV3 {
    pub side: Side,
    pub limit_price: u64,
    pub max_coin_qty: u64,
    pub max_native_pc_qty_including_fees: u64,
    pub self_trade_behavior: SelfTradeBehavior,
    pub order_type: OrderType,
    pub client_order_id: u64,
    pub limit: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTake {
    pub side: Side,
    pub limit_price: u64,
    pub max_coin_qty: u64,
    pub max_native_pc_qty_including_fees: u64,
    pub min_coin_qty: u64,
    pub min_native_pc_qty: u64,
    pub limit: u16,
}

const ARGS: usize = 5;

struct Reader<'a> {
    data: &'a [u8],
    kind: ProgramKind,
}

impl Reader<'_> {
    fn truncated(&self) -> ValidationError {
        invalid_data(self.kind, "instruction data too short")
    }

    fn u16(&self, offset: usize) -> Result<u16, ValidationError> {
        read_u16(self.data, ARGS + offset).ok_or_else(|| self.truncated())
    }

    fn u32(&self, offset: usize) -> Result<u32, ValidationError> {
        read_u32(self.data, ARGS + offset).ok_or_else(|| self.truncated())
    }

    fn u64(&self, offset: usize) -> Result<u64, ValidationError> {
        read_u64(self.data, ARGS + offset).ok_or_else(|| self.truncated())
    }

    fn u128(&self, offset: usize) -> Result<u128, ValidationError> {
        read_u128(self.data, ARGS + offset).ok_or_else(|| self.truncated())
    }

    fn side(&self, offset: usize) -> Result<Side, ValidationError> {
        match self.u32(offset)? {
            0 => Ok(Side::Bid),
            1 => Ok(Side::Ask),
            other => Err(invalid_data(self.kind, format!("invalid side {other}"))),
        }
    }

    fn order_type(&self, offset: usize) -> Result<OrderType, ValidationError> {
        match self.u32(offset)? {
            0 => Ok(OrderType::Limit),
            1 => Ok(OrderType::ImmediateOrCancel),
            2 => Ok(OrderType::PostOnly),
            other => Err(invalid_data(self.kind, format!("invalid order type {other}"))),
        }
    }

    fn self_trade_behavior(&self, offset: usize) -> Result<SelfTradeBehavior, ValidationError> {
        match self.u32(offset)? {
            0 => Ok(SelfTradeBehavior::DecrementTake),
            1 => Ok(SelfTradeBehavior::CancelProvide),
            2 => Ok(SelfTradeBehavior::AbortTransaction),
            other => Err(invalid_data(self.kind, format!("invalid self trade behavior {other}"))),
        }
    }
}

impl SerumInstruction {
    pub fn decode(kind: ProgramKind, data: &[u8]) -> Result<Self, ValidationError> {
        let version = read_u8(data, 0).ok_or_else(|| invalid_data(kind, "empty instruction data"))?;
        if version != 0 {
            return Err(invalid_data(kind, format!("unsupported layout version {version}")));
        }
        let tag = read_u32(data, 1).ok_or_else(|| invalid_data(kind, "missing instruction tag"))?;
        let r = Reader { data, kind };
        let op = match tag {
            0 => SerumOp::InitializeMarket,
            1 => SerumOp::NewOrder,
            2 => SerumOp::MatchOrders { limit: r.u16(0)? },
            3 => SerumOp::ConsumeEvents { limit: r.u16(0)? },
            4 => SerumOp::CancelOrder,
            5 => SerumOp::SettleFunds,
            6 => SerumOp::CancelOrderByClientId {
                client_id: r.u64(0)?,
            },
            7 => SerumOp::DisableMarket,
            8 => SerumOp::SweepFees,
            9 => SerumOp::NewOrderV2,
            10 => SerumOp::NewOrderV3(NewOrderV3 {
                side: r.side(0)?,
                limit_price: r.u64(4)?,
                max_coin_qty: r.u64(12)?,
                max_native_pc_qty_including_fees: r.u64(20)?,
                self_trade_behavior: r.self_trade_behavior(28)?,
                order_type: r.order_type(32)?,
                client_order_id: r.u64(36)?,
                limit: r.u16(44)?,
            }),
            11 => SerumOp::CancelOrderV2 {
                side: r.side(0)?,
                order_id: r.u128(4)?,
            },
            12 => SerumOp::CancelOrderByClientIdV2 {
                client_id: r.u64(0)?,
            },
            13 => SerumOp::SendTake(SendTake {
                side: r.side(0)?,
                limit_price: r.u64(4)?,
                max_coin_qty: r.u64(12)?,
                max_native_pc_qty_including_fees: r.u64(20)?,
                min_coin_qty: r.u64(28)?,
                min_native_pc_qty: r.u64(36)?,
                limit: r.u16(44)?,
            }),
            14 => SerumOp::CloseOpenOrders,
            15 => SerumOp::InitOpenOrders,
            16 => SerumOp::Prune { limit: r.u16(0)? },
            17 => SerumOp::ConsumeEventsPermissioned { limit: r.u16(0)? },
            other => return Err(invalid_data(kind, format!("unknown instruction tag {other}"))),
        };
        Ok(Self { version, op })
    }
}

fn account_labels(op: &SerumOp) -> &'static [&'static str] {
    match op {
        SerumOp::InitializeMarket => &[
            "Market",
            "Request Queue",
            "Event Queue",
            "Bids",
            "Asks",
            "Base Vault",
            "Quote Vault",
            "Base Mint",
            "Quote Mint",
        ],
        SerumOp::NewOrder | SerumOp::NewOrderV2 | SerumOp::NewOrderV3(_) => &[
            "Market",
            "Open Orders",
            "Request Queue",
            "Event Queue",
            "Bids",
            "Asks",
            "Order Payer",
            "Open Orders Owner",
            "Base Vault",
            "Quote Vault",
        ],
        SerumOp::MatchOrders { .. } => &["Market", "Request Queue", "Event Queue", "Bids", "Asks"],
        SerumOp::ConsumeEvents { .. } | SerumOp::ConsumeEventsPermissioned { .. } => &[],
        SerumOp::CancelOrder
        | SerumOp::CancelOrderByClientId { .. }
        | SerumOp::CancelOrderV2 { .. }
        | SerumOp::CancelOrderByClientIdV2 { .. } => &[
            "Market",
            "Bids",
            "Asks",
            "Open Orders",
            "Open Orders Owner",
            "Event Queue",
        ],
        SerumOp::SettleFunds => &[
            "Market",
            "Open Orders",
            "Open Orders Owner",
            "Base Vault",
            "Quote Vault",
            "Base Wallet",
            "Quote Wallet",
            "Vault Signer",
        ],
        SerumOp::DisableMarket => &["Market", "Disable Authority"],
        SerumOp::SweepFees => &[
            "Market",
            "Quote Vault",
            "Fee Sweeping Authority",
            "Quote Fee Receiver",
        ],
        SerumOp::SendTake(_) => &[
            "Market",
            "Request Queue",
            "Event Queue",
            "Bids",
            "Asks",
            "Base Wallet",
            "Quote Wallet",
            "Wallet Owner",
            "Base Vault",
            "Quote Vault",
        ],
        SerumOp::CloseOpenOrders => &[
            "Open Orders",
            "Open Orders Owner",
            "Rent Receiver",
            "Market",
        ],
        SerumOp::InitOpenOrders => &["Open Orders", "Open Orders Owner", "Market"],
        SerumOp::Prune { .. } => &[
            "Market",
            "Bids",
            "Asks",
            "Prune Authority",
            "Open Orders",
            "Open Orders Owner",
            "Event Queue",
        ],
    }
}

fn argument_rows(op: &SerumOp) -> Vec<Row> {
    match op {
        SerumOp::MatchOrders { limit }
        | SerumOp::ConsumeEvents { limit }
        | SerumOp::Prune { limit }
        | SerumOp::ConsumeEventsPermissioned { limit } => vec![Row::text("Limit", limit)],
        SerumOp::CancelOrderByClientId { client_id }
        | SerumOp::CancelOrderByClientIdV2 { client_id } => vec![Row::text("Client Id", client_id)],
        SerumOp::CancelOrderV2 { side, order_id } => vec![
            Row::text("Side", side),
            Row::text("Order Id", order_id),
        ],
        SerumOp::NewOrderV3(order) => vec![
            Row::text("Side", order.side),
            Row::text("Order Type", order.order_type),
            Row::text("Limit Price", order.limit_price),
            Row::text("Max Base Quantity", order.max_coin_qty),
            Row::text("Max Quote Quantity", order.max_native_pc_qty_including_fees),
            Row::text("Self Trade Behavior", order.self_trade_behavior),
            Row::text("Client Order Id", order.client_order_id),
            Row::text("Limit", order.limit),
        ],
        SerumOp::SendTake(take) => vec![
            Row::text("Side", take.side),
            Row::text("Limit Price", take.limit_price),
            Row::text("Max Base Quantity", take.max_coin_qty),
            Row::text("Max Quote Quantity", take.max_native_pc_qty_including_fees),
            Row::text("Min Base Quantity", take.min_coin_qty),
            Row::text("Min Quote Quantity", take.min_native_pc_qty),
            Row::text("Limit", take.limit),
        ],
        SerumOp::InitializeMarket
        | SerumOp::NewOrder
        | SerumOp::CancelOrder
        | SerumOp::SettleFunds
        | SerumOp::DisableMarket
        | SerumOp::SweepFees
        | SerumOp::NewOrderV2
        | SerumOp::CloseOpenOrders
        | SerumOp::InitOpenOrders => Vec::new(),
    }
}

pub struct SerumAdapter;

impl ProgramAdapter for SerumAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        SerumInstruction::decode(input.kind, &input.raw.data).map(TypedInstruction::Serum)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::Serum(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        let mut rows = labelled_accounts(ctx.raw, account_labels(&ix.op));
        rows.extend(argument_rows(&ix.op));
        Ok(FormattedInstruction::new(ix.op.as_ref(), rows))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::types::{AccountRef, RawInstruction};

    fn encode(tag: u32, args: &[u8]) -> Vec<u8> {
        let mut data = vec![0];
        data.extend_from_slice(&tag.to_le_bytes());
        data.extend_from_slice(args);
        data
    }

    #[test]
    fn decodes_new_order_v3() {
        let mut args = Vec::new();
        args.extend_from_slice(&1_u32.to_le_bytes());
        args.extend_from_slice(&1_500_u64.to_le_bytes());
        args.extend_from_slice(&10_u64.to_le_bytes());
        args.extend_from_slice(&15_000_u64.to_le_bytes());
        args.extend_from_slice(&2_u32.to_le_bytes());
        args.extend_from_slice(&2_u32.to_le_bytes());
        args.extend_from_slice(&77_u64.to_le_bytes());
        args.extend_from_slice(&65_535_u16.to_le_bytes());
        let ix = SerumInstruction::decode(ProgramKind::SerumV3, &encode(10, &args)).unwrap();
        let SerumOp::NewOrderV3(order) = &ix.op else {
            panic!("expected NewOrderV3");
        };
        assert_eq!(order.side, Side::Ask);
        assert_eq!(order.limit_price, 1_500);
        assert_eq!(
            order.self_trade_behavior,
            SelfTradeBehavior::AbortTransaction
        );
        assert_eq!(order.order_type, OrderType::PostOnly);
        assert_eq!(order.client_order_id, 77);
        assert_eq!(order.limit, 65_535);
        assert_eq!(ix.op.as_ref(), "New Order V3");
    }

    #[test]
    fn formats_accounts_with_labels() {
        let raw = RawInstruction {
            program_id: Address::new([1; 32]),
            account_keys: (0..5)
                .map(|n| AccountRef::new(Address::new([n; 32]), false, true))
                .collect(),
            data: encode(2, &5_u16.to_le_bytes()),
        };
        let input = InstructionInput {
            kind: ProgramKind::OpenBook,
            raw: &raw,
            parsed: None,
            idl: None,
        };
        let typed = SerumAdapter.validate(&input).unwrap();
        let formatted = SerumAdapter
            .format(
                &typed,
                &FormatContext {
                    index: 0,
                    kind: ProgramKind::OpenBook,
                    raw: &raw,
                },
            )
            .unwrap();
        assert_eq!(formatted.name, "Match Orders");
        assert_eq!(formatted.rows[0].label, "Market");
        assert_eq!(formatted.rows[4].label, "Asks");
        assert_eq!(formatted.rows[5], Row::text("Limit", "5"));
    }

    #[test]
    fn rejects_bad_version_tag_and_side() {
        assert!(SerumInstruction::decode(ProgramKind::SerumV3, &[1, 0, 0, 0, 0]).is_err());
        assert!(SerumInstruction::decode(ProgramKind::SerumV3, &encode(18, &[])).is_err());
        let mut args = 7_u32.to_le_bytes().to_vec();
        args.extend_from_slice(&[0; 16]);
        assert!(matches!(
            SerumInstruction::decode(ProgramKind::SerumV3, &encode(11, &args)),
            Err(ValidationError::InvalidData { .. })
        ));
    }
}
