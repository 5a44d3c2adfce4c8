//! Maize Advisor - command-line entry point
//!
//! Fertilizer recommendations and planting-timing advice for smallholder
//! maize farmers in Kenya.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use maize_advisor::cli::{self, Cli};
use maize_advisor::{build_orchestrator, init_tracing, AppError, AppResult, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match start(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            report(&cli, &err);
            ExitCode::from(err.exit_code())
        }
    }
}

async fn start(cli: &Cli) -> AppResult<u8> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("{:#}", e);
    }
    tracing::info!("Starting Maize Advisor");
    tracing::info!("Environment: {}", config.environment);

    let orchestrator = build_orchestrator(&config)?;

    let stdin = io::stdin();
    let outcome = if cli.json {
        cli::run(cli, &orchestrator, stdin.lock(), io::stderr(), io::stdout().lock()).await?
    } else {
        cli::run(cli, &orchestrator, stdin.lock(), io::stdout(), io::stdout()).await?
    };
    Ok(outcome.exit_code())
}

fn report(cli: &Cli, err: &AppError) {
    tracing::error!("Error: {:?}", err);

    let detail = err.detail();
    let mut stdout = io::stdout().lock();
    if cli.json {
        if serde_json::to_writer_pretty(&mut stdout, &err.response()).is_ok() {
            let _ = writeln!(stdout);
        }
    } else {
        eprintln!("{} [{}]", detail.message(cli.language), detail.code);
    }
}
