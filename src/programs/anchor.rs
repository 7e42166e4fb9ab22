use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::dispatch::{
    FormatContext, FormattedInstruction, InstructionInput, ProgramAdapter, TypedInstruction,
    labelled_accounts, mismatch,
};
use crate::error::ValidationError;
use crate::programs::{ProgramKind, invalid_data, read_address};
use crate::view::{Row, title_case};

pub const DISCRIMINATOR_LEN: usize = 8;

/// The subset of an Anchor IDL needed to name and decode instructions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Idl {
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: Option<IdlMetadata>,
    pub instructions: Vec<IdlInstruction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdlMetadata {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdlInstruction {
    pub name: String,
    #[serde(default)]
    pub discriminator: Option<Vec<u8>>,
    #[serde(default)]
    pub accounts: Vec<IdlAccountItem>,
    #[serde(default)]
    pub args: Vec<IdlField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdlAccountItem {
    Composite {
        name: String,
        accounts: Vec<IdlAccountItem>,
    },
    Single {
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdlField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlType,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdlType {
    Primitive(String),
    Option { option: Box<IdlType> },
    Vec { vec: Box<IdlType> },
    Array {
        array: (Box<IdlType>, serde_json::Value),
    },
    Defined { defined: serde_json::Value },
}

impl Idl {
    pub fn program_name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .map(|m| m.name.as_str())
            .or(self.name.as_deref())
    }

    pub fn find_instruction(&self, data: &[u8]) -> Option<&IdlInstruction> {
        let prefix = data.get(..DISCRIMINATOR_LEN)?;
        self.instructions
            .iter()
            .find(|ix| ix.discriminator().as_slice() == prefix)
    }
}

impl IdlInstruction {
    /// Declared discriminator, or `sha256("global:<snake_name>")[..8]` for legacy IDLs.
    pub fn discriminator(&self) -> Vec<u8> {
        match &self.discriminator {
            Some(declared) => declared.clone(),
            None => sighash(&self.name).to_vec(),
        }
    }

    /// Account names in position order, composite groups flattened.
    pub fn account_names(&self) -> Vec<String> {
        fn walk(items: &[IdlAccountItem], out: &mut Vec<String>) {
            for item in items {
                match item {
                    IdlAccountItem::Single { name } => out.push(name.clone()),
                    IdlAccountItem::Composite { accounts, .. } => walk(accounts, out),
                }
            }
        }
        let mut names = Vec::new();
        walk(&self.accounts, &mut names);
        names
    }
}

pub fn sighash(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = Sha256::digest(format!("global:{}", snake_case(name)).as_bytes());
    let mut out = [0_u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Supplies IDLs for programs the caller has registered as Anchor programs.
pub trait IdlSource {
    fn idl(&self, program_id: &Address) -> Option<Arc<Idl>>;
}

impl IdlSource for HashMap<Address, Arc<Idl>> {
    fn idl(&self, program_id: &Address) -> Option<Arc<Idl>> {
        self.get(program_id).cloned()
    }
}

pub struct NoIdls;

impl IdlSource for NoIdls {
    fn idl(&self, _program_id: &Address) -> Option<Arc<Idl>> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Unsigned(u128),
    Signed(i128),
    Float(String),
    Bool(bool),
    Text(String),
    Address(Address),
    Bytes(Vec<u8>),
    Option(Option<Box<ArgValue>>),
    List(Vec<ArgValue>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorInstruction {
    pub program_name: Option<String>,
    pub name: String,
    pub account_names: Vec<String>,
    pub args: Vec<(String, ArgValue)>,
    /// Bytes left once argument decoding stopped at an unsupported type.
    pub remaining: Vec<u8>,
}

struct Borsh<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Borsh<'a> {
    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.take(N)?.try_into().ok()
    }

    fn u32(&mut self) -> Option<u32> {
        self.array().map(u32::from_le_bytes)
    }

    fn rest(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or_default()
    }

    fn value(&mut self, ty: &IdlType) -> Option<ArgValue> {
        Some(match ty {
            IdlType::Primitive(name) => match name.as_str() {
                "u8" => ArgValue::Unsigned(self.array::<1>().map(u8::from_le_bytes)?.into()),
                "u16" => ArgValue::Unsigned(self.array().map(u16::from_le_bytes)?.into()),
                "u32" => ArgValue::Unsigned(self.u32()?.into()),
                "u64" => ArgValue::Unsigned(self.array().map(u64::from_le_bytes)?.into()),
                "u128" => ArgValue::Unsigned(self.array().map(u128::from_le_bytes)?),
                "i8" => ArgValue::Signed(self.array::<1>().map(i8::from_le_bytes)?.into()),
                "i16" => ArgValue::Signed(self.array().map(i16::from_le_bytes)?.into()),
                "i32" => ArgValue::Signed(self.array().map(i32::from_le_bytes)?.into()),
                "i64" => ArgValue::Signed(self.array().map(i64::from_le_bytes)?.into()),
                "i128" => ArgValue::Signed(self.array().map(i128::from_le_bytes)?),
                "f32" => ArgValue::Float(self.array().map(f32::from_le_bytes)?.to_string()),
                "f64" => ArgValue::Float(self.array().map(f64::from_le_bytes)?.to_string()),
                "bool" => match self.array::<1>()?[0] {
                    0 => ArgValue::Bool(false),
                    1 => ArgValue::Bool(true),
                    _ => return None,
                },
                "string" => {
                    let len = self.u32()? as usize;
                    ArgValue::Text(String::from_utf8(self.take(len)?.to_vec()).ok()?)
                }
                "bytes" => {
                    let len = self.u32()? as usize;
                    ArgValue::Bytes(self.take(len)?.to_vec())
                }
                "pubkey" | "publicKey" => {
                    let address = read_address(self.take(32)?, 0)?;
                    ArgValue::Address(address)
                }
                _ => return None,
            },
            IdlType::Option { option } => match self.array::<1>()?[0] {
                0 => ArgValue::Option(None),
                1 => ArgValue::Option(Some(Box::new(self.value(option)?))),
                _ => return None,
            },
            IdlType::Vec { vec } => {
                let len = self.u32()?;
                if len as usize > self.rest().len() {
                    return None;
                }
                let mut items = Vec::new();
                for _ in 0..len {
                    items.push(self.value(vec)?);
                }
                ArgValue::List(items)
            }
            IdlType::Array { array } => {
                let (inner, len) = array;
                let len = len.as_u64()?;
                if len > self.rest().len() as u64 {
                    return None;
                }
                let mut items = Vec::new();
                for _ in 0..len {
                    items.push(self.value(inner)?);
                }
                ArgValue::List(items)
            }
            IdlType::Defined { .. } => return None,
        })
    }
}

impl AnchorInstruction {
    pub fn decode(idl: &Idl, data: &[u8]) -> Result<Self, ValidationError> {
        let kind = ProgramKind::Anchor;
        if data.len() < DISCRIMINATOR_LEN {
            return Err(invalid_data(kind, "instruction data shorter than discriminator"));
        }
        let ix = idl.find_instruction(data).ok_or_else(|| {
            let discriminator = hex::encode(data.get(..DISCRIMINATOR_LEN).unwrap_or_default());
            invalid_data(
                kind,
                format!("no IDL instruction matches discriminator {discriminator}"),
            )
        })?;

        let mut reader = Borsh {
            data,
            pos: DISCRIMINATOR_LEN,
        };
        let mut args = Vec::with_capacity(ix.args.len());
        for field in &ix.args {
            let checkpoint = reader.pos;
            match reader.value(&field.ty) {
                Some(value) => args.push((field.name.clone(), value)),
                None => {
                    reader.pos = checkpoint;
                    break;
                }
            }
        }

        Ok(Self {
            program_name: idl.program_name().map(title_case),
            name: ix.name.clone(),
            account_names: ix.account_names(),
            args,
            remaining: reader.rest().to_vec(),
        })
    }
}

fn arg_row(label: String, value: &ArgValue) -> Row {
    match value {
        ArgValue::Unsigned(n) => Row::text(label, n),
        ArgValue::Signed(n) => Row::text(label, n),
        ArgValue::Float(text) | ArgValue::Text(text) => Row::text(label, text),
        ArgValue::Bool(b) => Row::text(label, b),
        ArgValue::Address(address) => Row::address(label, *address),
        ArgValue::Bytes(bytes) => Row::data(label, bytes),
        ArgValue::Option(None) => Row::text(label, "null"),
        ArgValue::Option(Some(inner)) => arg_row(label, inner),
        ArgValue::List(items) => Row::table(
            label,
            items
                .iter()
                .enumerate()
                .map(|(position, item)| arg_row(position.to_string(), item))
                .collect(),
        ),
    }
}

pub struct AnchorAdapter;

impl ProgramAdapter for AnchorAdapter {
    fn validate(&self, input: &InstructionInput<'_>) -> Result<TypedInstruction, ValidationError> {
        let idl = input.idl.ok_or_else(|| ValidationError::MissingIdl {
            program: input.raw.program_id.to_string(),
        })?;
        AnchorInstruction::decode(idl, &input.raw.data).map(TypedInstruction::Anchor)
    }

    fn format(
        &self,
        instruction: &TypedInstruction,
        ctx: &FormatContext<'_>,
    ) -> Result<FormattedInstruction, ValidationError> {
        let TypedInstruction::Anchor(ix) = instruction else {
            return Err(mismatch(ctx.kind));
        };
        let labels: Vec<String> = ix.account_names.iter().map(|n| title_case(n)).collect();
        let mut rows = labelled_accounts(ctx.raw, &labels);
        rows.extend(
            ix.args
                .iter()
                .map(|(name, value)| arg_row(title_case(name), value)),
        );
        if !ix.remaining.is_empty() {
            rows.push(Row::data("Remaining Data", &ix.remaining));
        }
        Ok(FormattedInstruction {
            name: title_case(&ix.name),
            rows,
            program_name: ix.program_name.clone(),
        })
    }
}
