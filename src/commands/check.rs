// src/commands/check.rs

use std::process::ExitCode;

use crate::cli::ColorMode;
use crate::errors::render_to_stderr;
use crate::scenarios::Scenario;
use callsite_codegen::ExecutionStrategy;

/// Run every scenario under the selected strategies; failures are rendered
/// as they occur and the exit code reports whether any were seen.
pub fn check_scenarios(strategy: Option<ExecutionStrategy>, color: ColorMode) -> ExitCode {
    let strategies: Vec<ExecutionStrategy> = match strategy {
        Some(strategy) => vec![strategy],
        None => ExecutionStrategy::ALL.to_vec(),
    };

    let mut passed = 0usize;
    let mut failed = 0usize;
    for strategy in strategies {
        for scenario in Scenario::ALL {
            match scenario.check(strategy) {
                Ok(outcome) => {
                    passed += 1;
                    println!(
                        "ok    {:20} {:12} {}",
                        scenario.name(),
                        strategy.name(),
                        outcome.rendered_results()
                    );
                }
                Err(err) => {
                    failed += 1;
                    println!("FAIL  {:20} {:12}", scenario.name(), strategy.name());
                    render_to_stderr(&err, color);
                }
            }
        }
    }

    println!("\n{passed} passed, {failed} failed");
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
