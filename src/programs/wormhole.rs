use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    mismatch,
};
use crate::error::ValidationError;
use crate::programs::{ProgramKind, invalid_data, read_u8, read_u16, read_u32, read_u64};
use crate::view::{Row, title_case};

const CORE_INSTRUCTIONS: [&str; 9] = [
    "initialize",
    "postMessage",
    "postVaa",
    "setFees",
    "transferFees",
    "upgradeContract",
    "upgradeGuardianSet",
    "verifySignatures",
    "postMessageUnreliable",
];

const TOKEN_BRIDGE_INSTRUCTIONS: [&str; 13] = [
    "initialize",
    "attestToken",
    "completeNative",
    "completeWrapped",
    "transferWrapped",
    "transferNative",
    "registerChain",
    "createWrapped",
    "upgradeContract",
    "completeNativeWithPayload",
    "completeWrappedWithPayload",
    "transferWrappedWithPayload",
    "transferNativeWithPayload",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WormholeArgs {
    None,
    PostMessage {
        nonce: u32,
        payload: Vec<u8>,
        consistency_level: u8,
    },
    Transfer {
        nonce: u32,
        amount: u64,
        fee: u64,
        target_address: [u8; 32],
        target_chain: u16,
    },
}

/// Core bridge or token bridge instruction, keyed by its one-byte tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WormholeInstruction {
    pub bridge: ProgramKind,
    pub tag: u8,
    pub args: WormholeArgs,
}

impl WormholeInstruction {
    pub fn decode(bridge: ProgramKind, data: &[u8]) -> Result<Self, ValidationError> {
        let truncated = || invalid_data(bridge, "instruction data too short");
        let tag = read_u8(data, 0).ok_or_else(|| invalid_data(bridge, "empty instruction data"))?;
        let names = names(bridge);
        if usize::from(tag) >= names.len() {
            return Err(invalid_data(bridge, format!("unknown instruction tag {tag}")));
        }
        let args = match (bridge, tag) {
            (ProgramKind::WormholeCore, 1 | 8) => {
                let nonce = read_u32(data, 1).ok_or_else(truncated)?;
                let len = read_u32(data, 5).ok_or_else(truncated)? as usize;
                let payload = data
                    .get(9..9_usize.saturating_add(len))
                    .ok_or_else(truncated)?
                    .to_vec();
                let consistency_level = read_u8(data, 9 + payload.len()).ok_or_else(truncated)?;
                WormholeArgs::PostMessage {
                    nonce,
                    payload,
                    consistency_level,
                }
            }
            (ProgramKind::WormholeTokenBridge, 4 | 5 | 11 | 12) => {
                let mut target_address = [0_u8; 32];
                target_address.copy_from_slice(data.get(21..53).ok_or_else(truncated)?);
                WormholeArgs::Transfer {
                    nonce: read_u32(data, 1).ok_or_else(truncated)?,
                    amount: read_u64(data, 5).ok_or_else(truncated)?,
                    fee: read_u64(data, 13).ok_or_else(truncated)?,
                    target_address,
                    target_chain: read_u16(data, 53).ok_or_else(truncated)?,
                }
            }
            _ => WormholeArgs::None,
        };
        Ok(Self { bridge, tag, args })
    }

    pub fn name(&self) -> &'static str {
        names(self.bridge)
            .get(usize::from(self.tag))
            .copied()
            .unwrap_or("unknown")
    }
}

fn names(bridge: ProgramKind) -> &'static [&'static str] {
    match bridge {
        ProgramKind::WormholeTokenBridge => &TOKEN_BRIDGE_INSTRUCTIONS,
        _ => &CORE_INSTRUCTIONS,
    }
}

pub struct WormholeAdapter;

impl ProgramAdapter for WormholeAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        WormholeInstruction::decode(input.kind, &input.raw.data).map(TypedInstruction::Wormhole)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::Wormhole(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        if ix.bridge != ctx.kind {
            return Err(mismatch(ctx.kind));
        }
        let mut rows = vec![Row::address("Program", ctx.raw.program_id)];
        if let Some(payer) = ctx.raw.account(0) {
            rows.push(Row::account("Payer", payer.address, payer.is_signer, payer.is_writable));
        }
        match &ix.args {
            WormholeArgs::None => {}
            WormholeArgs::PostMessage {
                nonce,
                payload,
                consistency_level,
            } => {
                rows.push(Row::text("Nonce", nonce));
                rows.push(Row::data("Payload", payload));
                rows.push(Row::text("Consistency Level", consistency_level));
            }
            WormholeArgs::Transfer {
                nonce,
                amount,
                fee,
                target_address,
                target_chain,
            } => {
                rows.push(Row::text("Nonce", nonce));
                rows.push(Row::token_amount("Amount", *amount, None));
                rows.push(Row::token_amount("Relayer Fee", *fee, None));
                rows.push(Row::data("Target Address", target_address));
                rows.push(Row::text("Target Chain", target_chain));
            }
        }
        Ok(FormattedInstruction::new(title_case(ix.name()), rows))
    }
}
