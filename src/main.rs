use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    linkcart::logging::init().context("init logging")?;

    let cli = linkcart::cli::Cli::parse();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), ?cli, "parsed cli");

    let command = cli.command.name();
    linkcart::commands::run(cli)
        .await
        .with_context(|| format!("linkcart {command}"))
}
