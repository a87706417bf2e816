// src/cli/args.rs

use clap::{Parser, Subcommand, ValueEnum};

use callsite_codegen::ExecutionStrategy;

/// Color output mode
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect based on terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Build, compile and run method-call scenarios
#[derive(Parser, Debug)]
#[command(name = "callsite")]
#[command(version)]
#[command(about = "Method-call construction, resolution and addressable execution", long_about = None)]
pub struct Cli {
    /// Color output: auto, always, never
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one scenario and print each invocation's result
    #[command(visible_alias = "r")]
    Run {
        /// Scenario name (see `list`)
        #[arg(short, long, value_name = "NAME")]
        scenario: String,

        /// Execution strategy: compiled or interpreted
        #[arg(long, default_value_t = ExecutionStrategy::Compiled)]
        strategy: ExecutionStrategy,

        /// Number of invocations (defaults to the scenario's own count)
        #[arg(short = 'n', long)]
        invocations: Option<usize>,
    },
    /// List the available scenarios with their expected results
    #[command(visible_alias = "l")]
    List,
    /// Run every scenario under every strategy and compare against expectations
    #[command(visible_alias = "c")]
    Check {
        /// Restrict to one strategy
        #[arg(long)]
        strategy: Option<ExecutionStrategy>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_strategy() {
        let cli = Cli::try_parse_from([
            "callsite",
            "run",
            "--scenario",
            "unbox",
            "--strategy",
            "interpreted",
            "-n",
            "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                scenario,
                strategy,
                invocations,
            } => {
                assert_eq!(scenario, "unbox");
                assert_eq!(strategy, ExecutionStrategy::Interpreted);
                assert_eq!(invocations, Some(2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(Cli::try_parse_from(["callsite", "check", "--strategy", "jit"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
