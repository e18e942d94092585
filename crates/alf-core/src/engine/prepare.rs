use super::error::EngineError;
use crate::core::params::namelist::{PARAMETERS_FILE, ParameterSet};
use crate::core::params::value::Overrides;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const SEEDS_FILE: &str = "seeds";

/// Location of the seed file shipped with the source tree.
pub fn seeds_source(alf_dir: &Path) -> PathBuf {
    alf_dir
        .join("Scripts_and_Parameters_files")
        .join("Start")
        .join(SEEDS_FILE)
}

/// Whether `dir` holds the final configuration of an earlier run.
pub fn has_previous_run(dir: &Path) -> bool {
    dir.join("confout_0").exists() || dir.join("confout_0.h5").exists()
}

/// Readies `sim_dir` for a Monte Carlo run: seeds, the `parameters` file for
/// `ham_name` with `overrides` applied, and the output configurations of a
/// previous run turned into input configurations.
///
/// Returns `true` when an earlier run is being resumed.
pub fn prepare_directory(
    alf_dir: &Path,
    sim_dir: &Path,
    ham_name: &str,
    overrides: &Overrides,
) -> Result<bool, EngineError> {
    info!("Prepare directory \"{}\" for Monte Carlo run.", sim_dir.display());
    if !sim_dir.exists() {
        debug!("Create new directory.");
        fs::create_dir_all(sim_dir).map_err(|e| EngineError::io(sim_dir, e))?;
    }

    let resumed = has_previous_run(sim_dir);
    if resumed {
        warn!("Resuming previous run in {}.", sim_dir.display());
    }

    let seeds = seeds_source(alf_dir);
    fs::copy(&seeds, sim_dir.join(SEEDS_FILE)).map_err(|e| EngineError::io(&seeds, e))?;

    let params = ParameterSet::for_simulation(ham_name, overrides)?;
    let params_path = sim_dir.join(PARAMETERS_FILE);
    params
        .write_to_path(&params_path)
        .map_err(|e| EngineError::io(&params_path, e))?;

    out_to_in(sim_dir)?;
    Ok(resumed)
}

/// Renames every `confout_*` in `dir` to `confin_*` so the next run
/// continues from the last configuration. Returns the new names.
pub fn out_to_in(dir: &Path) -> Result<Vec<String>, EngineError> {
    let mut renamed = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| EngineError::io(dir, e))? {
        let entry = entry.map_err(|e| EngineError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(suffix) = name.strip_prefix("confout_") else {
            continue;
        };
        let target = format!("confin_{suffix}");
        debug!("mv {} {}", name, target);
        fs::rename(entry.path(), dir.join(&target)).map_err(|e| EngineError::io(entry.path(), e))?;
        renamed.push(target);
    }
    renamed.sort();
    Ok(renamed)
}
