//! CLI Adapter
//!
//! Command-line interface for the graduate watcher.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, RunCmd, ScanCmd, HoldersCmd, CheckConfigCmd};

/// Parse the process arguments
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}
