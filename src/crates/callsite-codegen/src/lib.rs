//! Callsite code generation: compiles lambdas over call expressions into
//! `Callable`s, either as closure trees or as interpreted instruction lists.

mod compiled;
pub mod errors;
mod frame;
pub mod interp;
mod invoke;
mod literal;
mod place;
mod strategy;


pub use errors::{CompileError, CompileResult};
pub use frame::Frame;
pub use invoke::ReceiverMode;
pub use place::Place;
pub use strategy::{Callable, Executable, ExecutionStrategy, compile};
