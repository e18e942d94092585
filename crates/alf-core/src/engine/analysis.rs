use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::runner::{CommandRunner, CommandSpec};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Suffixes of raw bin files, in the order they are analysed.
const BIN_SUFFIXES: [&str; 3] = ["_scal", "_eq", "_tau"];

pub fn ana_executable(alf_dir: &Path) -> PathBuf {
    alf_dir.join("Analysis").join("ana.out")
}

pub fn ana_hdf5_executable(alf_dir: &Path) -> PathBuf {
    alf_dir.join("Analysis").join("ana_hdf5.out")
}

/// Raw bin files in `dir`: scalars first, then equal-time, then
/// time-displaced observables, each group sorted by name.
pub fn analysis_targets(dir: &Path) -> Result<Vec<String>, EngineError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| EngineError::io(dir, e))? {
        let entry = entry.map_err(|e| EngineError::io(dir, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    Ok(BIN_SUFFIXES
        .iter()
        .flat_map(|suffix| names.iter().filter(move |name| name.ends_with(suffix)))
        .cloned()
        .collect())
}

/// Runs the default error analysis on the bins in `dir`.
pub fn analyse_directory(
    runner: &dyn CommandRunner,
    alf_dir: &Path,
    dir: &Path,
    hdf5: bool,
    reporter: &ProgressReporter,
) -> Result<(), EngineError> {
    if hdf5 {
        let executable = ana_hdf5_executable(alf_dir);
        info!("Analysing {}", dir.display());
        let command = CommandSpec::new(executable.to_string_lossy(), dir).env("OMP_NUM_THREADS", "1");
        return runner.run(&command);
    }

    let targets = analysis_targets(dir)?;
    let executable = ana_executable(alf_dir);
    reporter.report(Progress::TaskStart {
        total_steps: targets.len() as u64,
    });
    for name in targets {
        info!("Analysing {}", name);
        reporter.report(Progress::Message(format!("Analysing {name}")));
        let command = CommandSpec::new(executable.to_string_lossy(), dir)
            .arg(name)
            .env("OMP_NUM_THREADS", "1");
        runner.run(&command)?;
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    Ok(())
}
