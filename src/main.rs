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
    amrito::logging::init().context("init logging")?;

    let cli = amrito::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        amrito::cli::Command::Languages(args) => {
            amrito::fetch::languages(args).context("languages")?;
        }
        amrito::cli::Command::Fetch(args) => {
            amrito::fetch::run(args).await.context("fetch")?;
        }
        amrito::cli::Command::Parse(args) => {
            amrito::fetch::parse(args).context("parse")?;
        }
        amrito::cli::Command::Render(args) => {
            amrito::render::run(args).context("render")?;
        }
        amrito::cli::Command::Export(args) => {
            amrito::export::run(args).context("export")?;
        }
        amrito::cli::Command::Narration(args) => {
            amrito::render::narration(args).context("narration")?;
        }
        amrito::cli::Command::State(args) => {
            amrito::session::run(args).await.context("state")?;
        }
    }

    Ok(())
}
