//! QCA CLI library.
//!
//! Command definitions and execution for the `qca` binary; the binary in
//! `main.rs` only parses arguments and sets up logging.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};
