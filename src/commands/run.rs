// src/commands/run.rs

use std::process::ExitCode;

use crate::cli::ColorMode;
use crate::errors::{ScenarioError, render_to_stderr};
use crate::scenarios::Scenario;
use callsite_codegen::ExecutionStrategy;

/// Run one scenario and print the expression and each invocation's result.
pub fn run_scenario(
    name: &str,
    strategy: ExecutionStrategy,
    invocations: Option<usize>,
    color: ColorMode,
) -> ExitCode {
    match try_run(name, strategy, invocations) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            render_to_stderr(&err, color);
            ExitCode::FAILURE
        }
    }
}

fn try_run(
    name: &str,
    strategy: ExecutionStrategy,
    invocations: Option<usize>,
) -> Result<(), ScenarioError> {
    let scenario: Scenario = name.parse()?;
    let count = invocations.unwrap_or_else(|| scenario.default_invocations());
    let outcome = scenario.run(strategy, count)?;
    println!("{} [{}]: {}", scenario, strategy, outcome.expression);
    println!("  {}", outcome.rendered_results());
    Ok(())
}
