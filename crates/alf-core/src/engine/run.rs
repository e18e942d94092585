use super::config::{ConfigError, Launcher, ParameterSets, SimulationConfig};
use super::error::EngineError;
use super::prepare::prepare_directory;
use super::runner::{CommandRunner, CommandSpec, capture_environment};
use crate::core::params::namelist::PARAMETERS_FILE;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

pub fn alf_executable(config: &SimulationConfig) -> PathBuf {
    config.alf_dir.join("Prog").join("ALF.out")
}

/// Prepares every directory the run needs. For tempering, the top-level
/// directory gets the first parameter set and each replica `Temp_{i}` its own.
pub fn prepare_directories(config: &SimulationConfig) -> Result<(), EngineError> {
    match &config.parameters {
        ParameterSets::Single(overrides) => {
            prepare_directory(&config.alf_dir, &config.sim_dir, &config.ham_name, overrides)?;
        }
        ParameterSets::Tempering(sets) => {
            let first = sets.first().ok_or(ConfigError::EmptyTempering)?;
            prepare_directory(&config.alf_dir, &config.sim_dir, &config.ham_name, first)?;
            for (i, overrides) in sets.iter().enumerate() {
                prepare_directory(
                    &config.alf_dir,
                    &config.replica_dir(i),
                    &config.ham_name,
                    overrides,
                )?;
            }
        }
    }
    Ok(())
}

/// The command that starts the simulation program in `sim_dir`.
pub fn run_command(config: &SimulationConfig) -> CommandSpec {
    let executable = alf_executable(config).to_string_lossy().into_owned();
    match &config.launcher {
        Launcher::Serial => CommandSpec::new(executable, &config.sim_dir),
        Launcher::Mpi { n_mpi, mpiexec } => CommandSpec::new(mpiexec.clone(), &config.sim_dir)
            .arg("-n")
            .arg(n_mpi.to_string())
            .arg(executable),
    }
}

/// Prepares the simulation directories and runs the Monte Carlo program.
///
/// On failure the `parameters` file of the run is logged before the error
/// is returned.
pub fn run(runner: &dyn CommandRunner, config: &SimulationConfig) -> Result<(), EngineError> {
    prepare_directories(config)?;

    let env = capture_environment(runner, &config.alf_dir, &config.configure_args())
        .map_err(|e| e.in_step("configure"))?;
    let command = run_command(config)
        .env_clear_with(env)
        .env("OMP_NUM_THREADS", config.n_omp.to_string());

    info!("Run {}", alf_executable(config).display());
    if let Err(e) = runner.run(&command) {
        error!("Error while running {}.", alf_executable(config).display());
        let params_path = config.sim_dir.join(PARAMETERS_FILE);
        match fs::read_to_string(&params_path) {
            Ok(params) => error!("parameters:\n{}", params),
            Err(read_err) => error!(
                "Could not read {}: {}",
                params_path.display(),
                read_err
            ),
        }
        return Err(e.in_step("run"));
    }
    Ok(())
}
