mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\nError: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("alfkit CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = match cli.command {
        Commands::Run(args) => {
            info!("Dispatching to 'run' command.");
            commands::run::run(args).await
        }
        Commands::Obs(args) => {
            info!("Dispatching to 'obs' command.");
            commands::obs::run(args).await
        }
        Commands::Params(args) => {
            info!("Dispatching to 'params' command.");
            commands::params::run(args).await
        }
        Commands::Batch(args) => {
            info!("Dispatching to 'batch' command.");
            commands::batch::run(args).await
        }
    };

    match &command_result {
        Ok(_) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }
    command_result
}
