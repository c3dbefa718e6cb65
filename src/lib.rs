//! dtsgen: trace-guided type inference for declaration generation.
//!
//! Inputs are a syntax tree and a heap snapshot recorded while the program
//! ran; the output is a solved node graph describing the kinds, fields and
//! call shapes every value was observed or inferred to have.
//!
//! - [`loader`] reads the three JSON inputs
//! - [`infer`] extracts library classes and runs the analysis
//! - [`report`] summarises a finished run
//! - [`tracing_config`] installs a subscriber from `DTSGEN_LOG`

pub mod loader;
pub mod report;
pub mod tracing_config;

pub use dtsgen_ast as ast;
pub use dtsgen_heap as heap;
pub use dtsgen_infer::{
    ClassNodes, ClassOptions, InferError, InferenceOptions, InferenceResult, TypeAnalysis,
};
pub use dtsgen_solver as solver;

use dtsgen_ast::{Ast, AstId};
use dtsgen_heap::{ClassHierarchyExtractor, ClassRegistry, Snapshot};
use tracing::info;

/// A finished run together with the classes it was solved against.
#[derive(Clone, Debug)]
pub struct Inference {
    pub classes: ClassRegistry,
    pub result: InferenceResult,
}

/// Analyse `program` (if any) and, when the options ask for it, every
/// closure reachable from the global object.
pub fn infer(
    ast: &Ast,
    snapshot: &Snapshot,
    program: Option<AstId>,
    options: &InferenceOptions,
) -> Result<Inference, InferError> {
    let classes = ClassHierarchyExtractor::new(snapshot).extract();
    let mut analysis = TypeAnalysis::new(ast, snapshot, &classes, options);
    if let Some(program) = program {
        analysis.analyse_program(program)?;
    }
    if options.analyse_all_closures {
        analysis.analyse_reachable_closures()?;
    }
    let result = analysis.finish();
    let stats = result.stats();
    info!(
        classes = classes.len(),
        closures = result.entered_closures().len(),
        nodes = stats.nodes,
        merges = stats.merges,
        "inference finished"
    );
    Ok(Inference { classes, result })
}

/// Load inputs from disk and run [`infer`].
pub fn infer_files(
    ast: &std::path::Path,
    snapshot: &std::path::Path,
    options: Option<&std::path::Path>,
) -> anyhow::Result<Inference> {
    let inputs = loader::load_inputs(ast, snapshot, options)?;
    let inference = infer(
        &inputs.ast,
        &inputs.snapshot,
        inputs.program,
        &inputs.options,
    )?;
    Ok(inference)
}
