use wasm_bindgen::prelude::*;

use crate::address::Address;
use crate::logs::group_logs_by_instruction;
use crate::pipeline::decode_transaction_json as decode_request;
use crate::programs::{Cluster, Program, ProgramRegistry};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = JSON)]
    fn parse(s: &str) -> JsValue;
}

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    match serde_json::to_string(value) {
        Ok(json_str) => parse(&json_str),
        Err(_) => JsValue::NULL,
    }
}

fn error_result(msg: &str) -> JsValue {
    to_js(&serde_json::json!({ "error": msg }))
}

/// Decode a `DecodeRequest` JSON payload into a transaction view.
#[wasm_bindgen]
pub fn decode_transaction_json(json: &str) -> JsValue {
    match decode_request(json) {
        Ok(view) => to_js(&view),
        Err(e) => error_result(&e.to_string()),
    }
}

/// Classify a base58 program address on the given cluster.
#[wasm_bindgen]
pub fn identify_program(address: &str, cluster: &str) -> JsValue {
    let Ok(cluster) = cluster.parse::<Cluster>() else {
        return error_result("Unknown cluster");
    };
    let address = match address.parse::<Address>() {
        Ok(address) => address,
        Err(e) => return error_result(&e.to_string()),
    };
    let result = match ProgramRegistry::new(cluster).identify(&address) {
        Program::Known(kind) => serde_json::json!({
            "kind": kind.as_ref(),
            "name": kind.display_name(),
        }),
        Program::Unknown(address) => serde_json::json!({
            "kind": "unknown",
            "address": address.to_string(),
        }),
    };
    to_js(&result)
}

/// Group log lines per top-level instruction; `program_ids` is an array of base58 addresses.
#[wasm_bindgen]
pub fn group_program_logs(logs: Vec<String>, program_ids: JsValue) -> JsValue {
    let program_ids: Vec<Address> = match serde_wasm_bindgen::from_value(program_ids) {
        Ok(ids) => ids,
        Err(_) => return error_result("Invalid program id list"),
    };
    to_js(&group_logs_by_instruction(&logs, &program_ids))
}

/// Reward percent change for a block reward entry.
#[wasm_bindgen]
pub fn reward_percent_change(lamports: f64, post_balance: f64) -> f64 {
    crate::rewards::percent_change(lamports as i64, post_balance as u64)
}
