//! Replay CLI: loads the four fixture files (§6), runs `replay`, prints
//! the resulting `ReplayResult` as JSON, and exits `0`/`1` per §6 "Process
//! exit codes".

use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

use xrpl_replay::{check, fixtures, replay, ReplayResult};

/// Replay a fixture block against a pre-state and report whether the
/// resulting ledger matches the reference.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply a block of transactions and close the resulting ledger.
    Replay(ReplayArgs),
}

#[derive(Debug, clap::Args)]
pub struct ReplayArgs {
    /// Path to state.json (pre-state entries).
    #[arg(long)]
    state: PathBuf,

    /// Path to env.json (close-time, fees, amendments).
    #[arg(long)]
    env: PathBuf,

    /// Path to txs.json (the block's transaction blobs).
    #[arg(long)]
    txs: PathBuf,

    /// Path to expected.json. When omitted, the computed roots are printed
    /// without being checked against anything.
    #[arg(long)]
    expected: Option<PathBuf>,
}

#[derive(Debug, Parser)]
#[clap(name = "xrpl-replay")]
#[clap(bin_name = "xrpl-replay")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
#[clap(about = "Fixture-driven replay driver for the ledger state-transition core")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn run_replay(args: ReplayArgs) -> Result<ReplayResult, Box<dyn Error>> {
    let state: fixtures::StateFixture = fixtures::load(&args.state)?;
    let env: fixtures::EnvFixture = fixtures::load(&args.env)?;
    let txs: fixtures::TxsFixture = fixtures::load(&args.txs)?;

    let mut result = replay(&state, &env, &txs)?;

    if let Some(expected_path) = args.expected {
        let expected: fixtures::ExpectedFixture = fixtures::load(&expected_path)?;
        if let Err(mismatches) = check(&result, &expected) {
            result.error = Some(mismatches.join("; "));
        }
    }

    Ok(result)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Replay(args) => run_replay(args),
    };

    match result {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result).expect("ReplayResult always serializes"));
            if result.error.is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            tracing::error!(%err, "replay failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
