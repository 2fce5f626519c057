//! CLI Adapter
//!
//! Command-line interface for alpha-watch.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    render_table, CliApp, Command, RunCmd, ShowCmd, TargetArgs, WatchCmd, DEFAULT_CONFIG_PATH,
};

use anyhow::Result;

/// Parse the command line
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    commands::execute(app).await
}
