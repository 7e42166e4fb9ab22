use serde::Serialize;

use crate::address::Address;
use crate::programs::is_missing_invoke_log;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LogKind {
    Invoke,
    Success,
    Failure,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLine {
    /// Invocation depth the line was emitted at; top level is 1.
    pub depth: usize,
    pub kind: LogKind,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionLogs {
    pub lines: Vec<LogLine>,
    pub failed: bool,
}

/// `Program <id> invoke [<depth>]`
fn parse_invoke(line: &str) -> Option<usize> {
    let rest = line.strip_prefix("Program ")?;
    let (_, depth) = rest.split_once(" invoke [")?;
    depth.strip_suffix(']')?.parse().ok()
}

/// Free-form program output that never changes the invocation depth.
fn is_program_output(line: &str) -> bool {
    ["Program log:", "Program data:", "Program return:", "Program consumption:"]
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// The `<id>` and remainder of `Program <id> <rest>`, with `<id>` a single base58 token.
fn program_status(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("Program ")?;
    let (id, tail) = rest.split_once(' ')?;
    id.parse::<Address>().ok()?;
    Some(tail)
}

/// `Program <id> success`
fn is_success(line: &str) -> bool {
    program_status(line) == Some("success")
}

/// `Program <id> failed: <reason>`
fn is_failure(line: &str) -> bool {
    program_status(line).is_some_and(|tail| tail.starts_with("failed: "))
}

/// Split a transaction's log lines into one group per top-level instruction.
///
/// `program_ids` are the top-level instructions' programs in order. Programs that
/// never log an invoke line get an empty group and consume nothing.
pub fn group_logs_by_instruction(logs: &[String], program_ids: &[Address]) -> Vec<InstructionLogs> {
    let mut groups = vec![InstructionLogs::default(); program_ids.len()];
    let mut next = 0;
    let mut current: Option<usize> = None;
    let mut depth = 0_usize;

    for line in logs {
        let (kind, line_depth) = if let Some(invoked) = parse_invoke(line) {
            if invoked == 1 {
                while program_ids.get(next).is_some_and(is_missing_invoke_log) {
                    next += 1;
                }
                current = (next < program_ids.len()).then_some(next);
                next += 1;
            }
            depth = invoked;
            (LogKind::Invoke, invoked)
        } else if is_program_output(line) {
            (LogKind::Other, depth)
        } else if is_success(line) {
            let at = depth;
            depth = depth.saturating_sub(1);
            (LogKind::Success, at)
        } else if is_failure(line) {
            let at = depth;
            depth = depth.saturating_sub(1);
            (LogKind::Failure, at)
        } else {
            (LogKind::Other, depth)
        };

        let Some(group) = current.and_then(|index| groups.get_mut(index)) else {
            tracing::debug!(line = %line, "log line outside any instruction");
            continue;
        };
        if kind == LogKind::Failure && line_depth == 1 {
            group.failed = true;
        }
        group.lines.push(LogLine {
            depth: line_depth,
            kind,
            text: line.clone(),
        });
    }
    groups
}
