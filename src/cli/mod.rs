//! CLI layer for es-agent.
//!
//! Answers a single request given on the command line, or runs an
//! interactive session when no request is given.

pub mod commands;
pub mod output;
pub mod parser;
pub mod repl;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::Cli;
