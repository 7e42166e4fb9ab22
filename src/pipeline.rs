use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::config::DecodeConfig;
use crate::dispatch::{self, DispatchContext, InstructionInput};
use crate::error::{AccountResolutionError, Error, ValidationError};
use crate::programs::anchor::{Idl, IdlSource, NoIdls};
use crate::programs::{Program, ProgramKind, ProgramRegistry};
use crate::resolver::{
    FetchStatus, LookupTableSource, NoLookupTables, ResolvedAccount, raw_instruction, resolve,
};
use crate::types::{
    CompiledInstruction, InnerInstruction, InstructionFailure, ParsedInstruction, RawInstruction,
    TransactionInput,
};
use crate::view::{FallbackReason, InstructionViewModel};

/// The decoded form of one transaction: either every instruction, or a single error view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TransactionView {
    Instructions {
        signature: Option<String>,
        instructions: Vec<InstructionViewModel>,
    },
    Error {
        signature: Option<String>,
        error: AccountResolutionError,
        message: String,
    },
}

impl TransactionView {
    pub fn instructions(&self) -> &[InstructionViewModel] {
        match self {
            Self::Instructions { instructions, .. } => instructions,
            Self::Error { .. } => &[],
        }
    }
}

/// Decodes whole transactions against a registry and the caller's lookup-table
/// and IDL caches. Holds no mutable state; one decoder may serve many threads.
pub struct InstructionDecoder<'a> {
    registry: ProgramRegistry,
    lookup_tables: &'a (dyn LookupTableSource + Sync),
    idls: &'a (dyn IdlSource + Sync),
}

struct TransactionScope<'t> {
    signature: Option<&'t str>,
    resolved: &'t [ResolvedAccount],
}

impl<'a> InstructionDecoder<'a> {
    pub fn new(registry: ProgramRegistry) -> Self {
        Self {
            registry,
            lookup_tables: &NoLookupTables,
            idls: &NoIdls,
        }
    }

    pub fn with_lookup_tables(mut self, lookup_tables: &'a (dyn LookupTableSource + Sync)) -> Self {
        self.lookup_tables = lookup_tables;
        self
    }

    pub fn with_idls(mut self, idls: &'a (dyn IdlSource + Sync)) -> Self {
        self.idls = idls;
        self
    }

    pub fn registry(&self) -> &ProgramRegistry {
        &self.registry
    }

    /// Total: header problems become a single error view, everything else degrades per instruction.
    pub fn decode_transaction(&self, input: &TransactionInput) -> TransactionView {
        let signature = input.signature.clone();
        match self.decode_instructions(input) {
            Ok(instructions) => TransactionView::Instructions {
                signature,
                instructions,
            },
            Err(error) => {
                tracing::warn!(
                    signature = signature.as_deref().unwrap_or_default(),
                    %error,
                    "account resolution failed"
                );
                TransactionView::Error {
                    signature,
                    message: error.to_string(),
                    error,
                }
            }
        }
    }

    /// Validate and format a single, already-resolved instruction with no inner instructions.
    pub fn decode_instruction(
        &self,
        index: usize,
        raw: &RawInstruction,
        parsed: Option<&ParsedInstruction>,
    ) -> InstructionViewModel {
        self.view(None, index, raw, parsed, None, Vec::new())
    }

    fn decode_instructions(
        &self,
        input: &TransactionInput,
    ) -> Result<Vec<InstructionViewModel>, AccountResolutionError> {
        let resolved = resolve(&input.message, self.lookup_tables)?;
        let failure = input.result.instruction_failure();
        let scope = TransactionScope {
            signature: input.signature.as_deref(),
            resolved: &resolved,
        };

        input
            .message
            .instructions
            .iter()
            .enumerate()
            .map(|(index, compiled)| {
                let inner: Vec<&InnerInstruction> = input
                    .inner_instructions
                    .iter()
                    .filter(|group| usize::from(group.index) == index)
                    .flat_map(|group| &group.instructions)
                    .collect();
                let inner = self.decode_inner(&scope, index, &inner)?;
                let parsed = input
                    .parsed_instructions
                    .get(index)
                    .and_then(Option::as_ref);
                let raw = materialize(compiled, &scope, index)?;
                Ok(self.view(
                    scope.signature,
                    index,
                    &raw,
                    parsed,
                    failure.as_ref(),
                    inner,
                ))
            })
            .collect()
    }

    fn decode_inner(
        &self,
        scope: &TransactionScope<'_>,
        top_level: usize,
        items: &[&InnerInstruction],
    ) -> Result<Vec<InstructionViewModel>, AccountResolutionError> {
        let heights: Vec<Option<u32>> = items
            .iter()
            .map(|item| {
                item.compiled
                    .stack_height
                    .or_else(|| item.parsed.as_ref().and_then(|p| p.stack_height))
            })
            .collect();
        let tree = InnerTree::from_stack_heights(&heights);
        self.inner_level(scope, top_level, items, &tree, &tree.roots)
    }

    /// Children are built before their parent so the parent can own them.
    fn inner_level(
        &self,
        scope: &TransactionScope<'_>,
        top_level: usize,
        items: &[&InnerInstruction],
        tree: &InnerTree,
        nodes: &[usize],
    ) -> Result<Vec<InstructionViewModel>, AccountResolutionError> {
        nodes
            .iter()
            .filter_map(|&node| items.get(node).map(|item| (node, *item)))
            .enumerate()
            .map(|(position, (node, item))| {
                let inner = self.inner_level(scope, top_level, items, tree, tree.children(node))?;
                let raw = materialize(&item.compiled, scope, top_level)?;
                Ok(self.view(
                    scope.signature,
                    position,
                    &raw,
                    item.parsed.as_ref(),
                    None,
                    inner,
                ))
            })
            .collect()
    }

    fn view(
        &self,
        signature: Option<&str>,
        index: usize,
        raw: &RawInstruction,
        parsed: Option<&ParsedInstruction>,
        failure: Option<&InstructionFailure>,
        inner: Vec<InstructionViewModel>,
    ) -> InstructionViewModel {
        let program = self.registry.identify(&raw.program_id);
        let ctx = DispatchContext {
            index,
            raw,
            failure,
            inner,
        };
        let Program::Known(kind) = program else {
            tracing::debug!(index, program_id = %raw.program_id, "routing to unknown formatter");
            return dispatch::format_unknown(None, FallbackReason::UnknownProgram, ctx);
        };

        let idl = match kind {
            ProgramKind::Anchor => self.idls.idl(&raw.program_id),
            _ => None,
        };
        let input = InstructionInput {
            kind,
            raw,
            parsed,
            idl: idl.as_deref(),
        };
        let validated = dispatch::validate(&input);
        if let Err(error) = &validated
            && !matches!(error, ValidationError::NoSchema { .. })
        {
            tracing::warn!(
                signature = signature.unwrap_or_default(),
                index,
                program = %kind,
                %error,
                "instruction failed validation"
            );
        }
        dispatch::format(program, validated.as_ref(), ctx)
    }
}

fn materialize(
    compiled: &CompiledInstruction,
    scope: &TransactionScope<'_>,
    instruction: usize,
) -> Result<RawInstruction, AccountResolutionError> {
    match raw_instruction(compiled, scope.resolved) {
        Ok(raw) => Ok(raw),
        Err(reason) => Err(AccountResolutionError::ProgramIdUnresolved {
            instruction,
            reason,
        }),
    }
}

/// Parent links for a run of inner instructions.
///
/// With stack heights, each instruction nests under the nearest preceding one
/// of lower height (top level is 1). If any height is missing the run stays flat.
#[derive(Debug, Default, PartialEq, Eq)]
struct InnerTree {
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
}

impl InnerTree {
    fn from_stack_heights(heights: &[Option<u32>]) -> Self {
        let mut tree = Self {
            roots: Vec::new(),
            children: vec![Vec::new(); heights.len()],
        };
        if heights.iter().any(Option::is_none) {
            tree.roots = (0..heights.len()).collect();
            return tree;
        }

        let mut open: Vec<(usize, u32)> = Vec::new();
        for (node, height) in heights.iter().flatten().copied().enumerate() {
            while open.last().is_some_and(|&(_, top)| top >= height) {
                open.pop();
            }
            let parent = open.last().map(|&(parent, _)| parent);
            match parent.and_then(|parent| tree.children.get_mut(parent)) {
                Some(siblings) => siblings.push(node),
                None => tree.roots.push(node),
            }
            open.push((node, height));
        }
        tree
    }

    fn children(&self, node: usize) -> &[usize] {
        self.children.get(node).map_or(&[], Vec::as_slice)
    }
}

/// Self-contained decode request, the JSON shape the browser bindings accept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeRequest {
    #[serde(default)]
    pub config: DecodeConfig,
    pub transaction: TransactionInput,
    #[serde(default)]
    pub lookup_tables: HashMap<Address, FetchStatus>,
    #[serde(default)]
    pub idls: HashMap<Address, Arc<Idl>>,
}

impl DecodeRequest {
    pub fn decode(&self) -> TransactionView {
        InstructionDecoder::new(self.config.registry())
            .with_lookup_tables(&self.lookup_tables)
            .with_idls(&self.idls)
            .decode_transaction(&self.transaction)
    }
}

pub fn decode_transaction_json(json: &str) -> Result<TransactionView, Error> {
    let request: DecodeRequest = serde_json::from_str(json)?;
    Ok(request.decode())
}
