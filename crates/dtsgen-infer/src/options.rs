//! Inference options, read from JSON the same way compiler options are.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassOptions {
    /// Unify the receiver of `new C()` with the class's new-instance node.
    pub use_this_object_usages: bool,
    /// Unify the class's constructor-usage node with every `new` callee.
    pub use_constructor_usages: bool,
}

impl Default for ClassOptions {
    fn default() -> Self {
        ClassOptions {
            use_this_object_usages: true,
            use_constructor_usages: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InferenceOptions {
    pub class_options: ClassOptions,
    /// Seed free variables of a walked closure from its recorded environment.
    pub seed_environment: bool,
    /// Walk every closure reachable from the global object, not just the entry.
    pub analyse_all_closures: bool,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        InferenceOptions {
            class_options: ClassOptions::default(),
            seed_environment: true,
            analyse_all_closures: true,
        }
    }
}

impl InferenceOptions {
    /// Missing keys keep their defaults.
    pub fn from_json_str(source: &str) -> Result<InferenceOptions, serde_json::Error> {
        serde_json::from_str(source)
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
