//! cnos-intfcfg - CNOS interface configuration
//!
//! Entry point for the cnos-intfcfg command.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use cnos_intfcfg::{apply, Plugin};
use recon_common::config::{ReconConfig, TaskFile};
use recon_common::logging::init_logging;
use recon_common::shell::ShellSession;
use recon_common::{ExecutionMode, Outcome};

/// Apply one interface or port-channel command to a CNOS switch
#[derive(Parser, Debug)]
#[command(name = "cnos-intfcfg")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session and logging configuration (TOML)
    #[arg(short = 's', long, default_value = "/etc/recon/cnos.toml")]
    session: PathBuf,

    /// Task parameters (TOML with a [params] table)
    #[arg(short = 't', long)]
    task: PathBuf,

    /// Plugin to run (interface, port-channel); overrides the task file
    #[arg(short = 'p', long)]
    plugin: Option<String>,

    /// Report what would change without sending commands
    #[arg(long)]
    check: bool,
}

async fn run(args: Args) -> anyhow::Result<Outcome> {
    let config = ReconConfig::load_or_default(&args.session)?;
    init_logging(&config.logging.level)?;

    let task = TaskFile::load(&args.task)
        .with_context(|| format!("Failed to load task {}", args.task.display()))?;
    let plugin: Plugin = args
        .plugin
        .as_deref()
        .or(task.plugin.as_deref())
        .unwrap_or("interface")
        .parse()?;
    let params = task.field_values()?;

    let mode = if args.check {
        ExecutionMode::Check
    } else {
        ExecutionMode::Apply
    };

    let mut session = ShellSession::open(&config.session).await?;
    info!(plugin = %plugin, ?mode, "--- Starting cnos-intfcfg ---");

    Ok(apply(plugin, &mut session, params, mode).await)
}

#[tokio::main]
async fn main() -> ExitCode {
    let outcome = match run(Args::parse()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("cnos-intfcfg failed: {:#}", e);
            Outcome {
                changed: false,
                error_message: Some(format!("{:#}", e)),
            }
        }
    };

    match outcome.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("cnos-intfcfg: failed to encode outcome: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if outcome.is_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
