//! genflow-cli
//!
//! The `genflow` binary: `describe` sends an image to a multimodal Ollama
//! model, `flow` runs `shortTerrorFlow` on Gemini.
#![deny(unsafe_code)]

pub mod args;
pub mod commands;
pub mod error;
pub mod shutdown;

use genflow::FlowContext;

pub use args::{Cli, Command};
pub use error::{CliError, Result};

/// Dispatch a parsed command line. Output goes to stdout.
pub async fn run(cli: Cli, ctx: &FlowContext) -> Result<()> {
    let mut stdout = std::io::stdout();
    match cli.command {
        Command::Describe(args) => {
            commands::describe::run(&args, &cli.ollama_address, ctx, &mut stdout).await
        }
        Command::Flow(args) => commands::flow::run(&args, ctx, &mut stdout).await,
    }
}
