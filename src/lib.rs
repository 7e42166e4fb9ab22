#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod address;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logs;
pub mod pipeline;
pub mod programs;
pub mod resolver;
pub mod rewards;
pub mod types;
pub mod view;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use address::Address;
pub use config::{DecodeConfig, ProgramOverride};
pub use dispatch::{
    DispatchContext, InstructionInput, ProgramAdapter, TypedInstruction, adapter_for, format,
    format_unknown, validate,
};
pub use error::{AccountResolutionError, Error, LookupUnresolved, ValidationError};
pub use logs::{InstructionLogs, group_logs_by_instruction};
pub use pipeline::{DecodeRequest, InstructionDecoder, TransactionView, decode_transaction_json};
pub use programs::anchor::{Idl, IdlSource};
pub use programs::{Cluster, Program, ProgramKind, ProgramRegistry, identify};
pub use resolver::{FetchStatus, LookupTableSource, LookupTableState, ResolvedAccount, resolve};
pub use rewards::percent_change;
pub use types::{
    AccountAddress, AccountRef, ParsedInstruction, RawInstruction, SignatureResult,
    TransactionInput, TransactionMessage,
};
pub use view::{InstructionStatus, InstructionViewModel, Row, RowValue};
