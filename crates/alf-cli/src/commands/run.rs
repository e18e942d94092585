use super::obs::write_table;
use crate::cli::RunArgs;
use crate::config::PartialSimulationConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use alfkit::engine::progress::ProgressReporter;
use alfkit::workflows::simulation::Simulation;
use tracing::{info, warn};

pub async fn run(args: RunArgs) -> Result<()> {
    let partial = PartialSimulationConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let plan = partial.merge_with_cli(&args)?;

    info!(
        "Simulation of {} in {:?} (configure: {})",
        plan.config.ham_name,
        &plan.config.sim_dir,
        plan.config.configure_args()
    );
    let sim_dir = plan.config.sim_dir.clone();
    let simulation = Simulation::new(plan.config).shape_mode(plan.shape_mode);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting simulation in {}", sim_dir.display());
    let observables =
        tokio::task::block_in_place(|| simulation.execute(plan.stages, &reporter))?;

    if observables.is_empty() {
        warn!("No analysed observables in {:?}", &sim_dir);
    }
    write_table(&observables, &mut std::io::stdout().lock())?;
    Ok(())
}
