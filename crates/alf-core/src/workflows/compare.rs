use super::simulation::{Simulation, Stages};
use crate::core::compare::{ComparisonReport, Tolerance};
use crate::core::io::shape::ShapeMode;
use crate::engine::config::SimulationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::runner::CommandRunner;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// `path` with `suffix` appended to its final component.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

/// Directory for the test side of a comparison: `{sim_dir}_test`.
pub fn test_sim_dir(sim_dir: &Path) -> PathBuf {
    with_suffix(sim_dir, "_test")
}

/// Where the comparison report for `sim_dir` is written: `{sim_dir}.txt`.
pub fn report_path(sim_dir: &Path) -> PathBuf {
    with_suffix(sim_dir, ".txt")
}

/// Re-targets `config` at the test directory next to its usual one.
pub fn as_test_config(config: SimulationConfig) -> SimulationConfig {
    let sim_dir = test_sim_dir(&config.sim_dir);
    config.with_sim_dir(sim_dir)
}

/// Runs the same simulation from two branches and compares the results.
///
/// `reference` runs in its own directory, `test` in `{sim_dir}_test`. The
/// report is written to `{reference sim_dir}.txt`.
#[instrument(skip_all, name = "branch_comparison", fields(sim_dir = %reference.sim_dir.display()))]
pub fn compare_branches<R: CommandRunner + Clone>(
    runner: R,
    reference: SimulationConfig,
    test: SimulationConfig,
    shape_mode: ShapeMode,
    reporter: &ProgressReporter,
) -> Result<ComparisonReport, EngineError> {
    let test = as_test_config(test);
    let report_file = report_path(&reference.sim_dir);

    let reference_sim = Simulation::with_runner(reference, runner.clone()).shape_mode(shape_mode);
    let reference_obs = reference_sim.execute(Stages::default(), reporter)?;

    let test_sim = Simulation::with_runner(test, runner).shape_mode(shape_mode);
    let test_obs = test_sim.execute(Stages::default(), reporter)?;

    let report = ComparisonReport::compare(&reference_obs, &test_obs, Tolerance::default());
    report
        .write_to_path(&report_file)
        .map_err(|e| EngineError::io(&report_file, e))?;

    if report.all_close() {
        info!("All observables agree; report in {}", report_file.display());
    } else {
        warn!("Observables differ; report in {}", report_file.display());
    }
    Ok(report)
}
