mod build;
mod cli;
mod error;
mod input;

use crate::cli::{Cli, Commands};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use std::io::Write;
use std::process::ExitCode;
use subcat_config::Config;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(retryable = err.is_retryable(), "{err:?}");
            ExitCode::FAILURE
        },
    }
}

/// Logs go to stderr; stdout carries catalog output.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = || Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config);
    match &cli.command {
        Commands::Build(args) => {
            let summary = build::run(&config()?, args)?;
            summary.log();
        },
        Commands::Classify { filenames } => {
            let mut stdout = std::io::stdout().lock();
            for filename in filenames {
                let line = serde_json::json!({ "filename": filename, "classification": subcat_classify::classify(filename) });
                writeln!(stdout, "{line}").or_raise(|| ErrorKind::Output("stdout".into()))?;
            }
        },
        Commands::Config => {
            let config = config()?;
            let rendered = serde_json::to_string_pretty(&config).or_raise(|| ErrorKind::Output("stdout".into()))?;
            println!("{rendered}");
        },
    }
    Ok(())
}
