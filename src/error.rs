use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("parse error: {reason}")]
    Parse { reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    AccountResolution(#[from] AccountResolutionError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a recognised program's instruction could not be refined into a typed variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationError {
    #[error("{program}: no parsed instruction info available")]
    MissingParsedInfo { program: String },

    #[error("{program}: unrecognized instruction type `{type_tag}`")]
    UnknownType { program: String, type_tag: String },

    #[error("{program}: malformed `{type_tag}` instruction: {reason}")]
    Malformed {
        program: String,
        type_tag: String,
        reason: String,
    },

    #[error("{program}: invalid instruction data: {reason}")]
    InvalidData { program: String, reason: String },

    #[error("{program}: no instruction schema for this program")]
    NoSchema { program: String },

    #[error("{program}: no IDL available")]
    MissingIdl { program: String },

    #[error("{program}: decoded instruction does not belong to this program")]
    ProgramMismatch { program: String },
}

/// A message header that cannot be mapped to account indices.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountResolutionError {
    #[error("message has no static account keys")]
    NoStaticAccounts,

    #[error(
        "readonly signed accounts ({readonly_signed}) must be fewer than required signatures ({required})"
    )]
    ReadonlySignersExceedSigners { readonly_signed: u8, required: u8 },

    #[error(
        "readonly unsigned accounts ({readonly_unsigned}) must be fewer than static account keys ({total})"
    )]
    ReadonlyUnsignedExceedAccounts { readonly_unsigned: u8, total: usize },

    #[error("required signatures ({required}) exceed static account keys ({total})")]
    SignersExceedAccounts { required: u8, total: usize },

    #[error("instruction {instruction}: program id unresolved: {reason}")]
    ProgramIdUnresolved {
        instruction: usize,
        reason: LookupUnresolved,
    },
}

/// Why a single lookup-table account reference has no address.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LookupUnresolved {
    #[error("lookup table not fetched")]
    NotFetched,

    #[error("lookup table fetch in progress")]
    Fetching,

    #[error("failed to fetch lookup table")]
    FetchFailed,

    #[error("invalid lookup table index {table_index} (table has {table_len} entries)")]
    InvalidIndex { table_index: u8, table_len: usize },

    #[error("account index {index} out of range ({total} accounts)")]
    AccountIndexOutOfRange { index: u8, total: usize },
}
