//! CLI module
//!
//! Command-line interface for the demo binary.
//!
//! # Commands
//!
//! - `check` - Fetch one page to verify connectivity
//! - `read` - Open a listing and scroll through it

mod commands;
mod runner;

pub use commands::{Cli, Commands, EngineArg};
pub use runner::Runner;
