// src/crates/callsite-codegen/src/interp/mod.rs
//! Interpreted strategy: lambda bodies lowered to a flat instruction list and
//! stepped by a stack machine.

mod lower;
mod vm;

#[cfg(test)]
mod tests;

pub use lower::Lowering;
pub use vm::{Instr, Program};
