//! Subscriber setup for inference runs.
//!
//! `DTSGEN_LOG` takes either a full `EnvFilter` directive string or a bare
//! level. A bare level is applied to the dtsgen crates only, so
//! `DTSGEN_LOG=debug` shows closure walks and resolver dispatch without
//! turning on every dependency's logging. `RUST_LOG` is used verbatim when
//! `DTSGEN_LOG` is unset.
//!
//! `DTSGEN_LOG_FORMAT` picks the output:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: `tracing-tree` output, nested by the `analyse_program` and
//!   `analyse_closure` spans
//! - `json`: one object per event
//!
//! ```bash
//! DTSGEN_LOG=debug DTSGEN_LOG_FORMAT=tree cargo test --test pipeline_tests
//! DTSGEN_LOG="dtsgen_infer=trace,dtsgen_solver=debug" cargo bench
//! ```

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Crates that log under their own target.
pub const TARGETS: &[&str] = &[
    "dtsgen",
    "dtsgen_ast",
    "dtsgen_heap",
    "dtsgen_solver",
    "dtsgen_infer",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Parse a `DTSGEN_LOG_FORMAT` value; anything unknown is `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Turn a bare level into one directive per dtsgen crate; anything else is
/// already a directive list and passes through.
pub fn expand_directives(value: &str) -> String {
    let level = value.trim().to_ascii_lowercase();
    if level.is_empty() || level.parse::<LevelFilter>().is_err() {
        return value.trim().to_string();
    }
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// What to install, resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub filter: String,
    pub format: LogFormat,
    /// Route output through libtest's capture instead of stderr.
    pub test_writer: bool,
}

impl TracingConfig {
    /// `None` when neither `DTSGEN_LOG` nor `RUST_LOG` is set.
    pub fn from_env() -> Option<Self> {
        let filter = match std::env::var("DTSGEN_LOG") {
            Ok(value) => expand_directives(&value),
            Err(_) => std::env::var("RUST_LOG").ok()?,
        };
        let format = LogFormat::parse(&std::env::var("DTSGEN_LOG_FORMAT").unwrap_or_default());
        Some(TracingConfig {
            filter,
            format,
            test_writer: false,
        })
    }

    pub fn for_tests(mut self) -> Self {
        self.test_writer = true;
        self
    }

    fn writer(&self) -> BoxMakeWriter {
        if self.test_writer {
            BoxMakeWriter::new(fmt::TestWriter::new())
        } else {
            BoxMakeWriter::new(std::io::stderr)
        }
    }

    /// Install as the global subscriber. False when one is already set.
    pub fn install(&self) -> bool {
        let filter = EnvFilter::builder().parse_lossy(&self.filter);
        let installed = match self.format {
            LogFormat::Tree => {
                let layer = tracing_tree::HierarchicalLayer::default()
                    .with_writer(self.writer())
                    .with_indent_amount(2)
                    .with_indent_lines(true)
                    .with_deferred_spans(true)
                    .with_targets(true);
                Registry::default().with(filter).with(layer).try_init().is_ok()
            }
            LogFormat::Json => {
                let layer = fmt::layer().json().with_writer(self.writer());
                Registry::default().with(filter).with(layer).try_init().is_ok()
            }
            LogFormat::Text => fmt()
                .with_env_filter(filter)
                .with_writer(self.writer())
                .try_init()
                .is_ok(),
        };
        if installed {
            tracing::debug!(filter = %self.filter, format = ?self.format, "tracing installed");
        }
        installed
    }
}

/// Install a stderr subscriber if the environment asks for one.
pub fn init_tracing() -> bool {
    TracingConfig::from_env().is_some_and(|config| config.install())
}

/// Like [`init_tracing`], but output is captured per test.
pub fn init_test_tracing() -> bool {
    TracingConfig::from_env().is_some_and(|config| config.for_tests().install())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_formats_fall_back_to_text() {
        assert_eq!(LogFormat::parse("TREE"), LogFormat::Tree);
        assert_eq!(LogFormat::parse(" json "), LogFormat::Json);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
        assert_eq!(LogFormat::parse("yaml"), LogFormat::Text);
    }

    #[test]
    fn bare_levels_expand_to_every_dtsgen_crate() {
        assert_eq!(
            expand_directives(" Debug "),
            "dtsgen=debug,dtsgen_ast=debug,dtsgen_heap=debug,dtsgen_solver=debug,dtsgen_infer=debug"
        );
        assert_eq!(
            expand_directives("dtsgen_infer=trace,dtsgen_solver=debug"),
            "dtsgen_infer=trace,dtsgen_solver=debug"
        );
        assert_eq!(expand_directives(""), "");
    }

    #[test]
    fn test_configs_use_the_capturing_writer() {
        let config = TracingConfig {
            filter: "dtsgen=info".into(),
            format: LogFormat::Tree,
            test_writer: false,
        }
        .for_tests();
        assert!(config.test_writer);
        assert_eq!(config.format, LogFormat::Tree);
    }
}
