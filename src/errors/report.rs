// src/errors/report.rs
//! Rendering utilities for miette diagnostics.

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, ThemeCharacters, ThemeStyles};
use std::io::Write as IoWrite;

use crate::cli::ColorMode;

/// Handler for terminal output (unicode, colors unless disabled).
pub fn terminal_handler(color: ColorMode) -> GraphicalReportHandler {
    let styles = match color {
        ColorMode::Never => ThemeStyles::none(),
        ColorMode::Auto | ColorMode::Always => ThemeStyles::ansi(),
    };
    GraphicalReportHandler::new_themed(GraphicalTheme {
        characters: ThemeCharacters::unicode(),
        styles,
    })
}

/// Handler for plain output (ascii, no colors).
pub fn plain_handler() -> GraphicalReportHandler {
    GraphicalReportHandler::new_themed(GraphicalTheme {
        characters: ThemeCharacters::ascii(),
        styles: ThemeStyles::none(),
    })
}

pub fn render_to_stderr(report: &dyn Diagnostic, color: ColorMode) {
    let handler = terminal_handler(color);
    let mut output = String::new();
    if handler.render_report(&mut output, report).is_ok() {
        eprint!("{}", output);
    }
}

/// Render without colors (for tests).
pub fn render_to_string(report: &dyn Diagnostic) -> String {
    let mut output = String::new();
    let _ = plain_handler().render_report(&mut output, report);
    output
}

pub fn render_to_writer<W: IoWrite>(report: &dyn Diagnostic, mut writer: W) -> std::io::Result<()> {
    writer.write_all(render_to_string(report).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ScenarioError;
    use callsite_runtime::RuntimeError;
    use callsite_sema::{CallError, Slot};

    #[test]
    fn render_construction_error_with_code() {
        let err = ScenarioError::from(CallError::null(Slot::Method));
        let output = render_to_string(&err);
        assert!(output.contains("E2101"), "should contain error code: {output}");
        assert!(output.contains("parameter 'method'"));
    }

    #[test]
    fn render_runtime_error() {
        let err = ScenarioError::from(RuntimeError::failed("Methods.Throw", "boom"));
        let output = render_to_string(&err);
        assert!(output.contains("E5006"));
        assert!(output.contains("Methods.Throw failed: boom"));
    }

    #[test]
    fn render_with_help() {
        let err = ScenarioError::UnknownScenario {
            name: "nope".to_string(),
        };
        let output = render_to_string(&err);
        assert!(output.contains("unknown scenario 'nope'"));
        assert!(output.contains("callsite list"));
    }

    #[test]
    fn render_to_writer_matches_string() {
        let err = ScenarioError::UnknownScenario {
            name: "x".to_string(),
        };
        let mut buffer = Vec::new();
        render_to_writer(&err, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), render_to_string(&err));
    }
}
