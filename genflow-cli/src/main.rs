use std::process::ExitCode;

use clap::Parser;
use genflow::FlowContext;
use genflow_cli::{Cli, shutdown};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match genflow_extras::telemetry::init_from_env() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let ctx = FlowContext::new();
    tokio::spawn(shutdown::cancel_on_signal(ctx.clone()));

    match genflow_cli::run(cli, &ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
