// src/errors/mod.rs
//! Top-level failures of the scenario runner and their rendering.

#![allow(unused_assignments)] // False positives from thiserror derive

pub mod report;

use miette::Diagnostic;
use thiserror::Error;

use callsite_codegen::{CompileError, ExecutionStrategy};
use callsite_runtime::RuntimeError;
use callsite_sema::CallError;

pub use report::{render_to_stderr, render_to_string, render_to_writer};

#[derive(Error, Debug, Diagnostic)]
pub enum ScenarioError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Construct(#[from] CallError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("unknown scenario '{name}'")]
    #[diagnostic(code(E9001), help("run `callsite list` to see the available scenarios"))]
    UnknownScenario { name: String },

    #[error("scenario '{scenario}' ({strategy}) produced [{found}], expected [{expected}]")]
    #[diagnostic(code(E9002))]
    Mismatch {
        scenario: &'static str,
        strategy: ExecutionStrategy,
        expected: String,
        found: String,
    },
}
