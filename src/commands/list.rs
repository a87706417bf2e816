// src/commands/list.rs

use std::process::ExitCode;

use crate::fixtures::Fixtures;
use crate::scenarios::{Scenario, render_values};

pub fn list_scenarios() -> ExitCode {
    // Expected values only need type names, which any fixture runtime can render.
    let rt = Fixtures::new().into_runtime();
    let width = Scenario::ALL
        .iter()
        .map(|s| s.name().len())
        .max()
        .unwrap_or(0);
    for scenario in Scenario::ALL {
        println!(
            "{:width$}  {}",
            scenario.name(),
            render_values(&rt, &scenario.expected()),
        );
    }
    ExitCode::SUCCESS
}
