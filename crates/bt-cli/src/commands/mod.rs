//! Subcommand implementations.
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod demo;
mod nodes;
mod run;

pub use demo::Demo;
pub use nodes::Nodes;
pub use run::Run;
