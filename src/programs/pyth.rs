use crate::address::Address;
use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    labelled_accounts, mismatch,
};
use crate::error::ValidationError;
use crate::programs::{
    ProgramKind, invalid_data, read_address, read_i32, read_i64, read_u8, read_u32, read_u64,
};
use crate::view::Row;

const SUPPORTED_VERSION: u32 = 2;
const HEADER: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PriceStatus {
    Unknown,
    Trading,
    Halted,
    Auction,
}

#[derive(Debug, Clone, PartialEq, Eq, strum_macros::AsRefStr)]
#[strum(serialize_all = "title_case")]
pub enum PythInstruction {
    InitMapping,
    AddMapping,
    AddProduct,
    UpdateProduct,
    AddPrice { exponent: i32, price_type: u32 },
    AddPublisher { publisher: Address },
    DeletePublisher { publisher: Address },
    UpdatePrice(PriceUpdate),
    AggregatePrice,
    InitPrice { exponent: i32, price_type: u32 },
    InitTest,
    UpdateTest,
    SetMinPublishers { min_publishers: u8 },
    UpdatePriceNoFailOnError(PriceUpdate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceUpdate {
    pub status: PriceStatus,
    pub price: i64,
    pub conf: u64,
    pub publish_slot: u64,
}

impl PythInstruction {
    pub fn decode(data: &[u8]) -> Result<Self, ValidationError> {
        let kind = ProgramKind::Pyth;
        let truncated = || invalid_data(kind, "instruction data too short");
        let version = read_u32(data, 0).ok_or_else(truncated)?;
        if version != SUPPORTED_VERSION {
            return Err(invalid_data(kind, format!("unsupported version {version}")));
        }
        let command = read_i32(data, 4).ok_or_else(truncated)?;
        let price_update = || -> Result<PriceUpdate, ValidationError> {
            let status = match read_u32(data, HEADER).ok_or_else(truncated)? {
                0 => PriceStatus::Unknown,
                1 => PriceStatus::Trading,
                2 => PriceStatus::Halted,
                3 => PriceStatus::Auction,
                other => return Err(invalid_data(kind, format!("invalid price status {other}"))),
            };
            Ok(PriceUpdate {
                status,
                price: read_i64(data, HEADER + 8).ok_or_else(truncated)?,
                conf: read_u64(data, HEADER + 16).ok_or_else(truncated)?,
                publish_slot: read_u64(data, HEADER + 24).ok_or_else(truncated)?,
            })
        };
        let price_layout = || -> Result<(i32, u32), ValidationError> {
            Ok((
                read_i32(data, HEADER).ok_or_else(truncated)?,
                read_u32(data, HEADER + 4).ok_or_else(truncated)?,
            ))
        };
        let publisher = || read_address(data, HEADER).ok_or_else(truncated);

        Ok(match command {
            0 => Self::InitMapping,
            1 => Self::AddMapping,
            2 => Self::AddProduct,
            3 => Self::UpdateProduct,
            4 => {
                let (exponent, price_type) = price_layout()?;
                Self::AddPrice {
                    exponent,
                    price_type,
                }
            }
            5 => Self::AddPublisher {
                publisher: publisher()?,
            },
            6 => Self::DeletePublisher {
                publisher: publisher()?,
            },
            7 => Self::UpdatePrice(price_update()?),
            8 => Self::AggregatePrice,
            9 => {
                let (exponent, price_type) = price_layout()?;
                Self::InitPrice {
                    exponent,
                    price_type,
                }
            }
            10 => Self::InitTest,
            11 => Self::UpdateTest,
            12 => Self::SetMinPublishers {
                min_publishers: read_u8(data, HEADER).ok_or_else(truncated)?,
            },
            13 => Self::UpdatePriceNoFailOnError(price_update()?),
            other => return Err(invalid_data(kind, format!("unknown command {other}"))),
        })
    }

    fn account_labels(&self) -> &'static [&'static str] {
        match self {
            Self::InitMapping => &["Funding Account", "Mapping Account"],
            Self::AddMapping => &["Funding Account", "Mapping Account", "Next Mapping Account"],
            Self::AddProduct => &["Funding Account", "Mapping Account", "Product Account"],
            Self::UpdateProduct => &["Funding Account", "Product Account"],
            Self::AddPrice { .. } => &["Funding Account", "Product Account", "Price Account"],
            Self::AddPublisher { .. }
            | Self::DeletePublisher { .. }
            | Self::InitPrice { .. }
            | Self::SetMinPublishers { .. } => &["Funding Account", "Price Account"],
            Self::UpdatePrice(_) | Self::UpdatePriceNoFailOnError(_) | Self::AggregatePrice => {
                &["Publisher", "Price Account", "Clock"]
            }
            Self::InitTest | Self::UpdateTest => &["Funding Account", "Test Account"],
        }
    }
}

fn argument_rows(ix: &PythInstruction) -> Vec<Row> {
    match ix {
        PythInstruction::AddPrice {
            exponent,
            price_type,
        }
        | PythInstruction::InitPrice {
            exponent,
            price_type,
        } => vec![
            Row::text("Exponent", exponent),
            Row::text("Price Type", price_type),
        ],
        PythInstruction::AddPublisher { publisher }
        | PythInstruction::DeletePublisher { publisher } => {
            vec![Row::address("Publisher Key", *publisher)]
        }
        PythInstruction::UpdatePrice(update)
        | PythInstruction::UpdatePriceNoFailOnError(update) => vec![
            Row::text("Status", update.status),
            Row::text("Price", update.price),
            Row::text("Confidence", update.conf),
            Row::text("Publish Slot", update.publish_slot),
        ],
        PythInstruction::SetMinPublishers { min_publishers } => {
            vec![Row::text("Minimum Publishers", min_publishers)]
        }
        PythInstruction::InitMapping
        | PythInstruction::AddMapping
        | PythInstruction::AddProduct
        | PythInstruction::UpdateProduct
        | PythInstruction::AggregatePrice
        | PythInstruction::InitTest
        | PythInstruction::UpdateTest => Vec::new(),
    }
}

pub struct PythAdapter;

impl ProgramAdapter for PythAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        PythInstruction::decode(&input.raw.data).map(TypedInstruction::Pyth)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::Pyth(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        let mut rows = labelled_accounts(ctx.raw, ix.account_labels());
        rows.extend(argument_rows(ix));
        Ok(FormattedInstruction::new(ix.as_ref(), rows))
    }
}
