// src/crates/callsite-codegen/src/strategy.rs
//
// Strategy selection and the `Callable` handle both strategies produce.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::compiled::ClosureCompiler;
use crate::errors::CompileResult;
use crate::frame::{Bindings, Frame};
use crate::interp::Lowering;
use callsite_expr::Lambda;
use callsite_runtime::{Runtime, RuntimeError, Value};

/// How a lambda is turned into something executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionStrategy {
    /// Ahead of time: a tree of closures built once
    #[default]
    Compiled,
    /// Lowered to instructions and stepped by a small stack machine
    Interpreted,
}

impl ExecutionStrategy {
    pub const ALL: [ExecutionStrategy; 2] =
        [ExecutionStrategy::Compiled, ExecutionStrategy::Interpreted];

    pub fn name(self) -> &'static str {
        match self {
            ExecutionStrategy::Compiled => "compiled",
            ExecutionStrategy::Interpreted => "interpreted",
        }
    }
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExecutionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compiled" => Ok(ExecutionStrategy::Compiled),
            "interpreted" => Ok(ExecutionStrategy::Interpreted),
            other => Err(format!("unknown strategy '{other}' (expected compiled or interpreted)")),
        }
    }
}

/// A compiled lambda body, run against a fresh frame per invocation.
pub trait Executable: Send + Sync {
    fn execute(&self, frame: &mut Frame, rt: &Runtime) -> Result<Value, RuntimeError>;
}

/// An executable call. Immutable and shareable across threads; every
/// invocation gets its own frame.
pub struct Callable {
    executable: Box<dyn Executable>,
    runtime: Arc<Runtime>,
    strategy: ExecutionStrategy,
    param_count: usize,
    temp_count: usize,
}

impl Callable {
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// Run the lambda with `args` bound to its parameters, in order.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        if args.len() != self.param_count {
            return Err(RuntimeError::ArgumentCount {
                expected: self.param_count,
                found: args.len(),
            });
        }
        let mut frame = Frame::new(args, self.temp_count);
        self.executable.execute(&mut frame, &self.runtime)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("strategy", &self.strategy)
            .field("param_count", &self.param_count)
            .field("temp_count", &self.temp_count)
            .finish()
    }
}

/// Compile a lambda with the chosen strategy.
#[tracing::instrument(level = "debug", skip(lambda, runtime), fields(params = lambda.params.len()))]
pub fn compile(
    lambda: &Lambda,
    runtime: &Arc<Runtime>,
    strategy: ExecutionStrategy,
) -> CompileResult<Callable> {
    let mut bindings = Bindings::for_lambda(lambda)?;
    let executable: Box<dyn Executable> = match strategy {
        ExecutionStrategy::Compiled => {
            Box::new(ClosureCompiler::new(runtime, &mut bindings).compile(&lambda.body)?)
        }
        ExecutionStrategy::Interpreted => {
            Box::new(Lowering::new(runtime, &mut bindings).lower(&lambda.body)?)
        }
    };
    tracing::debug!(
        %strategy,
        temps = bindings.temp_count(),
        "lambda compiled"
    );
    Ok(Callable {
        executable,
        runtime: Arc::clone(runtime),
        strategy,
        param_count: lambda.params.len(),
        temp_count: bindings.temp_count(),
    })
}
