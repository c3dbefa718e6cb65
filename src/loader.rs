//! Loading inference inputs from JSON files.

use anyhow::{Context, Result};
use dtsgen_ast::{Ast, AstId, NodeKind};
use dtsgen_heap::Snapshot;
use dtsgen_infer::InferenceOptions;
use std::path::Path;
use tracing::debug;

/// Everything one inference run reads.
#[derive(Clone, Debug)]
pub struct Inputs {
    pub ast: Ast,
    /// Top-level program node, walked in the global object's scope.
    pub program: Option<AstId>,
    pub snapshot: Snapshot,
    pub options: InferenceOptions,
}

pub fn load_ast(path: &Path) -> Result<Ast> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read syntax tree {}", path.display()))?;
    Ast::from_json_str(&source)
        .with_context(|| format!("failed to decode syntax tree {}", path.display()))
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read heap snapshot {}", path.display()))?;
    Snapshot::from_json_str(&source)
        .with_context(|| format!("failed to decode heap snapshot {}", path.display()))
}

/// Options file, or defaults when no path is given.
pub fn load_options(path: Option<&Path>) -> Result<InferenceOptions> {
    let Some(path) = path else {
        return Ok(InferenceOptions::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read options {}", path.display()))?;
    InferenceOptions::from_json_str(&source)
        .with_context(|| format!("invalid options in {}", path.display()))
}

/// The outermost `Program` node, if the tree has one.
pub fn find_program(ast: &Ast) -> Option<AstId> {
    ast.iter()
        .find(|(id, kind)| matches!(kind, NodeKind::Program { .. }) && ast.parent(*id).is_none())
        .map(|(id, _)| id)
}

pub fn load_inputs(ast: &Path, snapshot: &Path, options: Option<&Path>) -> Result<Inputs> {
    let ast = load_ast(ast)?;
    let snapshot = load_snapshot(snapshot)?;
    let options = load_options(options)?;
    let program = find_program(&ast);
    debug!(
        nodes = ast.len(),
        objects = snapshot.len(),
        has_program = program.is_some(),
        "loaded inputs"
    );
    Ok(Inputs {
        ast,
        program,
        snapshot,
        options,
    })
}
