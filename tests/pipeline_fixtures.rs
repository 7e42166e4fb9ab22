#![expect(
    clippy::unwrap_used,
    clippy::panic,
    reason = "test code uses unwrap/panic for concise assertions"
)]

use explorer_instruction_core::error::LookupUnresolved;
use explorer_instruction_core::view::FallbackReason;
use explorer_instruction_core::{
    AccountAddress, AccountRef, Address, DecodeRequest, DispatchContext, InstructionDecoder,
    InstructionInput, InstructionViewModel, ParsedInstruction, Program, ProgramKind,
    ProgramRegistry, RawInstruction, Row, RowValue, TransactionInput, TransactionView,
    ValidationError, format, group_logs_by_instruction, validate,
};
use strum::IntoEnumIterator;

fn load<T: serde::de::DeserializeOwned>(filename: &str) -> T {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = format!("{manifest_dir}/tests/fixtures/{filename}");
    let data =
        std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"));
    serde_json::from_str(&data).unwrap_or_else(|e| panic!("failed to parse {path}: {e}"))
}

fn decode(input: &TransactionInput) -> Vec<InstructionViewModel> {
    match InstructionDecoder::new(ProgramRegistry::default()).decode_transaction(input) {
        TransactionView::Instructions { instructions, .. } => instructions,
        TransactionView::Error { message, .. } => panic!("unexpected error view: {message}"),
    }
}

fn row<'a>(view: &'a InstructionViewModel, label: &str) -> &'a Row {
    view.rows
        .iter()
        .find(|row| row.label == label)
        .unwrap_or_else(|| panic!("no row {label} in {}", view.title))
}

fn account_rows(view: &InstructionViewModel) -> Vec<&Row> {
    view.rows
        .iter()
        .filter(|row| matches!(row.value, RowValue::Account { .. }))
        .collect()
}

// ──────────────────── System ────────────────────

#[test]
fn system_transfer_renders_one_sol() {
    let input: TransactionInput = load("system_transfer.json");
    let views = decode(&input);
    assert_eq!(views.len(), 1);

    let transfer = &views[0];
    assert_eq!(transfer.title, "System Program: Transfer");
    assert_eq!(transfer.fallback, None);
    assert_eq!(transfer.program, Some(ProgramKind::System));
    assert_eq!(
        row(transfer, "Transfer Amount (SOL)").value.to_string(),
        "1 SOL"
    );
    assert_eq!(
        row(transfer, "From Address").value.to_string(),
        "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"
    );
    assert!(!transfer.is_failed());
}

#[test]
fn decoding_twice_is_structurally_identical() {
    let input: TransactionInput = load("failed_memo.json");
    let decoder = InstructionDecoder::new(ProgramRegistry::default());
    let first = decoder.decode_transaction(&input);
    let second = decoder.decode_transaction(&input);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn unrecognized_type_tag_falls_back_to_generic_view() {
    let mut input: TransactionInput = load("system_transfer.json");
    let parsed = input.parsed_instructions[0].as_mut().unwrap();
    parsed.parsed = serde_json::json!({ "type": "frobnicate", "info": {} });

    let views = decode(&input);
    let view = &views[0];
    assert_eq!(view.title, "System Program: Unknown Instruction");
    assert!(matches!(
        &view.fallback,
        Some(FallbackReason::Validation(ValidationError::UnknownType { type_tag, .. }))
            if type_tag == "frobnicate"
    ));
    assert_eq!(account_rows(view).len(), 2);
}

#[test]
fn malformed_known_type_is_not_reported_as_unknown() {
    let mut input: TransactionInput = load("system_transfer.json");
    let parsed = input.parsed_instructions[0].as_mut().unwrap();
    parsed.parsed = serde_json::json!({ "type": "transfer", "info": { "source": "nope" } });

    let views = decode(&input);
    assert!(matches!(
        views[0].fallback,
        Some(FallbackReason::Validation(ValidationError::Malformed { .. }))
    ));
}

// ──────────────────── Failure flag, nesting, unknown programs ────────────────────

#[test]
fn instruction_error_flags_only_its_index() {
    let input: TransactionInput = load("failed_memo.json");
    let views = decode(&input);
    assert_eq!(views.len(), 4);

    for (index, view) in views.iter().enumerate() {
        assert_eq!(view.index, index);
        assert_eq!(view.is_failed(), index == 2, "instruction {index}");
    }
    assert_eq!(views[2].title, "Memo Program: Memo");
    assert_eq!(
        row(&views[2], "Data (UTF-8)").value.to_string(),
        "hello explorer"
    );
    assert_eq!(
        views[0].title,
        "Compute Budget Program: Set Compute Unit Limit"
    );
}

#[test]
fn unknown_program_enumerates_accounts_and_data() {
    let input: TransactionInput = load("failed_memo.json");
    let views = decode(&input);
    let unknown = &views[3];

    assert_eq!(unknown.title, "Unknown Program");
    assert_eq!(unknown.program, None);
    assert_eq!(unknown.fallback, Some(FallbackReason::UnknownProgram));

    let accounts = account_rows(unknown);
    assert_eq!(accounts.len(), 3);
    let badges: Vec<(bool, bool)> = accounts
        .iter()
        .map(|row| match row.value {
            RowValue::Account {
                is_signer,
                is_writable,
                ..
            } => (is_signer, is_writable),
            _ => panic!("expected account row"),
        })
        .collect();
    assert_eq!(badges, vec![(true, true), (false, true), (false, false)]);

    let data: Vec<&Row> = unknown
        .rows
        .iter()
        .filter(|row| matches!(row.value, RowValue::Data(_)))
        .collect();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].value, RowValue::Data("010203".to_string()));
}

#[test]
fn inner_instructions_nest_in_execution_order() {
    let input: TransactionInput = load("failed_memo.json");
    let views = decode(&input);
    let parent = &views[3];

    assert_eq!(parent.inner_view_models.len(), 2);
    let first = &parent.inner_view_models[0];
    assert_eq!(first.title, "System Program: Transfer");
    assert_eq!(
        row(first, "Transfer Amount (SOL)").value.to_string(),
        "0.000000001 SOL"
    );
    assert_eq!(first.inner_view_models.len(), 1);
    let memo = row(&first.inner_view_models[0], "Data (UTF-8)");
    assert_eq!(memo.value.to_string(), "inner");
    let memo = row(&parent.inner_view_models[1], "Data (UTF-8)");
    assert_eq!(memo.value.to_string(), "second");
    let inner = &parent.inner_view_models;
    assert!(inner.iter().all(|model| !model.is_failed()));
}

#[test]
fn logs_group_per_top_level_instruction() {
    let input: TransactionInput = load("failed_memo.json");
    let program_ids: Vec<Address> = input
        .message
        .instructions
        .iter()
        .map(|ix| input.message.account_keys[usize::from(ix.program_id_index)])
        .collect();
    let groups = group_logs_by_instruction(input.log_messages.as_deref().unwrap(), &program_ids);

    assert_eq!(groups.len(), 4);
    assert_eq!(groups[0].lines.len(), 2);
    assert_eq!(groups[2].lines.len(), 3);
    assert!(groups[2].failed);
    assert!(!groups[1].failed);
    assert!(groups[3].lines.is_empty());
}

// ──────────────────── Lookup tables ────────────────────

#[test]
fn lookup_table_extend_lists_new_addresses_in_order() {
    let request: DecodeRequest = load("lookup_table_extend.json");
    let view = request.decode();
    let views = view.instructions();
    assert_eq!(views.len(), 2);

    let extend = &views[0];
    assert_eq!(
        extend.title,
        "Address Lookup Table Program: Extend Lookup Table"
    );
    let RowValue::Table(rows) = &row(extend, "New Addresses").value else {
        panic!("expected table row");
    };
    let entries: Vec<(String, String)> = rows
        .iter()
        .map(|row| (row.label.clone(), row.value.to_string()))
        .collect();
    assert_eq!(
        entries,
        vec![
            (
                "0".to_string(),
                "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string()
            ),
            (
                "1".to_string(),
                "So11111111111111111111111111111111111111112".to_string()
            ),
            (
                "2".to_string(),
                "SysvarRent111111111111111111111111111111111".to_string()
            ),
        ]
    );
}

#[test]
fn lookup_accounts_resolve_or_degrade_per_row() {
    let request: DecodeRequest = load("lookup_table_extend.json");
    let view = request.decode();
    let generic = &view.instructions()[1];
    assert!(matches!(
        generic.fallback,
        Some(FallbackReason::Validation(ValidationError::MissingParsedInfo { .. }))
    ));

    let accounts = account_rows(generic);
    let addresses: Vec<AccountAddress> = accounts
        .iter()
        .map(|row| match row.value {
            RowValue::Account { address, .. } => address,
            _ => panic!("expected account row"),
        })
        .collect();
    assert_eq!(
        addresses[0],
        AccountAddress::Known("Stake11111111111111111111111111111111111111".parse().unwrap())
    );
    assert_eq!(
        addresses[1],
        AccountAddress::Known("Vote111111111111111111111111111111111111111".parse().unwrap())
    );
    assert_eq!(
        addresses[2],
        AccountAddress::Unresolved(LookupUnresolved::InvalidIndex {
            table_index: 5,
            table_len: 3
        })
    );
    assert_eq!(accounts[2].value.to_string(), "invalid index");
}

#[test]
fn lookup_accounts_without_cache_stay_unresolved() {
    let mut request: DecodeRequest = load("lookup_table_extend.json");
    request.lookup_tables.clear();
    let view = request.decode();
    let generic = &view.instructions()[1];
    assert!(account_rows(generic).iter().all(|row| matches!(
        row.value,
        RowValue::Account {
            address: AccountAddress::Unresolved(LookupUnresolved::NotFetched),
            ..
        }
    )));
}

// ──────────────────── Anchor ────────────────────

#[test]
fn anchor_instruction_uses_idl_names() {
    let request: DecodeRequest = load("anchor_request.json");
    let view = request.decode();
    let views = view.instructions();

    let place = &views[0];
    assert_eq!(place.title, "Order Book: Place Order");
    assert_eq!(place.program, Some(ProgramKind::Anchor));
    assert_eq!(place.rows[0].label, "Market");
    assert_eq!(place.rows[1].label, "Owner");
    assert_eq!(row(place, "Price").value.to_string(), "42");
    assert_eq!(row(place, "Memo").value.to_string(), "hi");
    assert_eq!(
        row(place, "Remaining Data").value,
        RowValue::Data("feed".to_string())
    );

    let unmatched = &views[1];
    assert_eq!(unmatched.title, "Anchor Program: Unknown Instruction");
    assert!(matches!(
        unmatched.fallback,
        Some(FallbackReason::Validation(ValidationError::InvalidData { .. }))
    ));
}

#[test]
fn anchor_without_idl_falls_back() {
    let mut request: DecodeRequest = load("anchor_request.json");
    request.idls.clear();
    let view = request.decode();
    assert!(matches!(
        view.instructions()[0].fallback,
        Some(FallbackReason::Validation(ValidationError::MissingIdl { .. }))
    ));
}

// ──────────────────── Totality ────────────────────

fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1);
    *state
}

const TYPE_TAGS: &[&str] = &[
    "transfer",
    "createAccount",
    "vote",
    "extendLookupTable",
    "initializeMint",
    "delegate",
    "write",
    "create",
    "",
    "🦀",
    "transferChecked",
    "towerSync",
];

fn random_info(seed: &mut u64) -> serde_json::Value {
    match lcg_next(seed) % 5 {
        0 => serde_json::Value::Null,
        1 => serde_json::json!({}),
        2 => serde_json::json!({
            "lamports": lcg_next(seed),
            "source": "11111111111111111111111111111111",
        }),
        3 => serde_json::json!([1, 2, 3]),
        _ => serde_json::json!("memo text"),
    }
}

#[test]
fn every_program_kind_degrades_without_panicking() {
    let mut seed = 0x5eed_u64;
    for kind in ProgramKind::iter() {
        for _ in 0..200 {
            let data_len = (lcg_next(&mut seed) % 48) as usize;
            let data: Vec<u8> = (0..data_len).map(|_| lcg_next(&mut seed) as u8).collect();
            let accounts = (lcg_next(&mut seed) % 4) as u8;
            let raw = RawInstruction {
                program_id: Address::new([9; 32]),
                account_keys: (0..accounts)
                    .map(|n| AccountRef::new(Address::new([n; 32]), n == 0, n < 2))
                    .collect(),
                data,
            };
            let tag = TYPE_TAGS[(lcg_next(&mut seed) % TYPE_TAGS.len() as u64) as usize];
            let parsed = ParsedInstruction {
                program: kind.to_string(),
                program_id: raw.program_id,
                parsed: serde_json::json!({ "type": tag, "info": random_info(&mut seed) }),
                stack_height: None,
            };
            let has_parsed = lcg_next(&mut seed) % 4 != 0;
            let input = InstructionInput {
                kind,
                raw: &raw,
                parsed: has_parsed.then_some(&parsed),
                idl: None,
            };

            let validated = validate(&input);
            let view = format(
                Program::Known(kind),
                validated.as_ref(),
                DispatchContext {
                    index: 0,
                    raw: &raw,
                    failure: None,
                    inner: Vec::new(),
                },
            );
            assert!(!view.title.is_empty());
            if validated.is_err() {
                assert!(view.fallback.is_some(), "{kind} error without fallback");
                assert_eq!(view.rows.len(), usize::from(accounts) + 2);
                assert_eq!(account_rows(&view).len(), usize::from(accounts));
            }
        }
    }
}
