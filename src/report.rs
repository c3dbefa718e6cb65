//! A serializable summary of a finished run, for logs and tooling.

use dtsgen_heap::ObjId;
use dtsgen_infer::InferenceResult;
use dtsgen_solver::{NodeId, PrimitiveSet};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceReport {
    pub nodes: usize,
    pub merges: usize,
    pub includes: usize,
    pub resolver_triggers: usize,
    pub closures: Vec<ClosureReport>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureReport {
    pub closure: u32,
    pub walks: usize,
    pub arity: usize,
    /// Primitive kinds of the return value, lowercase.
    pub returns: Vec<String>,
}

impl InferenceReport {
    pub fn new(result: &InferenceResult) -> InferenceReport {
        let stats = result.stats();
        let closures = result
            .function_nodes()
            .map(|(closure, function)| closure_report(result, closure, function))
            .collect();
        InferenceReport {
            nodes: stats.nodes,
            merges: stats.merges,
            includes: stats.includes,
            resolver_triggers: stats.resolver_triggers,
            closures,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn closure_report(
    result: &InferenceResult,
    closure: ObjId,
    function: NodeId,
) -> ClosureReport {
    let shape = result.function_shape(function);
    let returns = shape
        .as_ref()
        .map(|shape| kind_names(result.kinds(shape.ret)))
        .unwrap_or_default();
    ClosureReport {
        closure: closure.0,
        walks: result.walk_count(closure),
        arity: shape.map_or(0, |shape| shape.args.len()),
        returns,
    }
}

fn kind_names(kinds: PrimitiveSet) -> Vec<String> {
    kinds
        .iter_names()
        .map(|(name, _)| name.to_lowercase())
        .collect()
}
