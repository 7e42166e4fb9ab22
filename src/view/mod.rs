use std::fmt;

use serde::Serialize;

use crate::address::Address;
use crate::error::{LookupUnresolved, ValidationError};
use crate::programs::ProgramKind;
use crate::types::AccountAddress;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// The only shape the rendering layer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionViewModel {
    /// Position among siblings (top-level index, or position within the parent).
    pub index: usize,
    pub program_id: Address,
    pub program: Option<ProgramKind>,
    pub title: String,
    pub rows: Vec<Row>,
    pub inner_view_models: Vec<InstructionViewModel>,
    pub status: InstructionStatus,
    /// Set when the generic view was used in place of a program-specific one.
    pub fallback: Option<FallbackReason>,
}

impl InstructionViewModel {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, InstructionStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum InstructionStatus {
    Success,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "camelCase")]
pub enum FallbackReason {
    UnknownProgram,
    NoSchema,
    Validation(ValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub label: String,
    pub value: RowValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum RowValue {
    Text(String),
    Address(Address),
    #[serde(rename_all = "camelCase")]
    Account {
        address: AccountAddress,
        is_signer: bool,
        is_writable: bool,
    },
    Sol(u64),
    #[serde(rename_all = "camelCase")]
    TokenAmount {
        amount: u64,
        decimals: Option<u8>,
    },
    Data(String),
    Table(Vec<Row>),
}

impl Row {
    pub fn text(label: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            label: label.into(),
            value: RowValue::Text(value.to_string()),
        }
    }

    pub fn address(label: impl Into<String>, address: Address) -> Self {
        Self {
            label: label.into(),
            value: RowValue::Address(address),
        }
    }

    pub fn account(
        label: impl Into<String>,
        address: AccountAddress,
        is_signer: bool,
        is_writable: bool,
    ) -> Self {
        Self {
            label: label.into(),
            value: RowValue::Account {
                address,
                is_signer,
                is_writable,
            },
        }
    }

    pub fn sol(label: impl Into<String>, lamports: u64) -> Self {
        Self {
            label: label.into(),
            value: RowValue::Sol(lamports),
        }
    }

    pub fn token_amount(label: impl Into<String>, amount: u64, decimals: Option<u8>) -> Self {
        Self {
            label: label.into(),
            value: RowValue::TokenAmount { amount, decimals },
        }
    }

    pub fn data(label: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            label: label.into(),
            value: RowValue::Data(hex::encode(bytes)),
        }
    }

    pub fn table(label: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            label: label.into(),
            value: RowValue::Table(rows),
        }
    }
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Address(address) => write!(f, "{address}"),
            Self::Account { address, .. } => match address {
                AccountAddress::Known(address) => write!(f, "{address}"),
                AccountAddress::Unresolved(reason) => f.write_str(unresolved_text(*reason)),
            },
            Self::Sol(lamports) => write!(f, "{} SOL", lamports_to_sol_string(*lamports)),
            Self::TokenAmount { amount, decimals } => {
                f.write_str(&format_amount(*amount, decimals.unwrap_or(0)))
            }
            Self::Data(hex) => write!(f, "0x{hex}"),
            Self::Table(rows) => write!(f, "{} rows", rows.len()),
        }
    }
}

pub fn unresolved_text(reason: LookupUnresolved) -> &'static str {
    match reason {
        LookupUnresolved::NotFetched | LookupUnresolved::Fetching => "loading lookup table",
        LookupUnresolved::FetchFailed => "failed to fetch",
        LookupUnresolved::InvalidIndex { .. } => "invalid index",
        LookupUnresolved::AccountIndexOutOfRange { .. } => "invalid account index",
    }
}

pub fn lamports_to_sol_string(lamports: u64) -> String {
    format_amount(lamports, 9)
}

/// Fixed-point `amount / 10^decimals` with trailing zeros trimmed.
pub fn format_amount(amount: u64, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let digits = format!("{amount:0>width$}", width = usize::from(decimals) + 1);
    let (whole, fraction) = digits.split_at(digits.len() - usize::from(decimals));
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// `createAccountWithSeed` / `new_authority` → `Create Account With Seed` / `New Authority`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            previous = Some(' ');
            continue;
        }
        let boundary = match previous {
            None | Some(' ') => true,
            Some(prev) => {
                (ch.is_uppercase() && !prev.is_uppercase())
                    || (ch.is_ascii_digit() && !prev.is_ascii_digit())
            }
        };
        if boundary && !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
        if boundary {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        previous = Some(ch);
    }
    out
}
