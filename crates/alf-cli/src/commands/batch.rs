use crate::cli::BatchArgs;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use alfkit::core::io::shape::ShapeMode;
use alfkit::core::params::value::Overrides;
use alfkit::engine::config::{Machine, ParameterSets, SimulationConfig, SimulationConfigBuilder};
use alfkit::engine::progress::ProgressReporter;
use alfkit::engine::runner::SystemRunner;
use alfkit::workflows::compare::{as_test_config, compare_branches, report_path};
use alfkit::workflows::simulation::{Simulation, Stages};
use std::path::Path;
use tracing::{error, info};

/// One simulation from the batch file.
#[derive(Debug, PartialEq)]
pub struct BatchEntry {
    pub line: usize,
    /// Hamiltonian named in the line itself, taking precedence over the
    /// command-line choice.
    pub ham_name: Option<String>,
    pub overrides: Overrides,
}

/// Parses the batch file: one JSON object per line, blank lines skipped,
/// a line reading `stop` ends the batch.
pub fn parse_batch(content: &str, path: &Path) -> Result<Vec<BatchEntry>> {
    let mut entries = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed == "stop" {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }
        let mut overrides: Overrides =
            serde_json::from_str(trimmed).map_err(|e| CliError::FileParsing {
                path: path.to_path_buf(),
                source: anyhow::Error::from(e).context(format!("line {}", i + 1)),
            })?;
        let ham_name = match overrides.take("ham_name") {
            Some(value) => Some(
                value
                    .as_str()
                    .ok_or_else(|| {
                        CliError::Config(format!("line {}: ham_name must be a string", i + 1))
                    })?
                    .to_string(),
            ),
            None => None,
        };
        entries.push(BatchEntry {
            line: i + 1,
            ham_name,
            overrides,
        });
    }
    Ok(entries)
}

fn entry_config(
    args: &BatchArgs,
    entry: &BatchEntry,
    ham_name: &str,
    branch: &str,
) -> Result<SimulationConfig> {
    let mut builder = SimulationConfigBuilder::new()
        .ham_name(entry.ham_name.as_deref().unwrap_or(ham_name))
        .parameters(ParameterSets::Single(entry.overrides.clone()))
        .alf_dir(&args.alf_dir)
        .branch(Some(branch.to_string()))
        .machine(args.machine.parse::<Machine>()?)
        .mpi(args.mpi)
        .n_mpi(Some(args.n_mpi));
    if let Some(sim_root) = &args.sim_root {
        builder = builder.sim_root(sim_root);
    }
    Ok(builder.build()?)
}

pub async fn run(args: BatchArgs) -> Result<()> {
    if !args.reference && !args.test {
        return Err(CliError::Argument(
            "Nothing to do: pass -R, -T or both.".to_string(),
        ));
    }
    let content = std::fs::read_to_string(&args.file)?;
    let entries = parse_batch(&content, &args.file)?;
    println!("Number of simulations: {}", entries.len());

    let shape_mode = if args.legacy {
        ShapeMode::Legacy
    } else {
        ShapeMode::Strict
    };
    let ham_name_t = args.ham_name_t.as_deref().unwrap_or(&args.ham_name_r);
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let mut failed = 0;
    let mut compared = 0;
    for entry in &entries {
        info!("Batch line {}", entry.line);
        let reference = entry_config(&args, entry, &args.ham_name_r, &args.branch_r)?;
        let test = entry_config(&args, entry, ham_name_t, &args.branch_t)?;

        if args.reference && args.test {
            compared += 1;
            let report = tokio::task::block_in_place(|| {
                compare_branches(SystemRunner, reference.clone(), test, shape_mode, &reporter)
            })?;
            let verdict = if report.all_close() { "passed" } else { "FAILED" };
            if !report.all_close() {
                failed += 1;
                error!("Comparison for line {} failed", entry.line);
            }
            println!(
                "Line {}: {} ({})",
                entry.line,
                verdict,
                report_path(&reference.sim_dir).display()
            );
        } else {
            let config = if args.reference {
                reference
            } else {
                as_test_config(test)
            };
            let sim_dir = config.sim_dir.clone();
            let simulation = Simulation::new(config).shape_mode(shape_mode);
            let observables = tokio::task::block_in_place(|| {
                simulation.execute(Stages::default(), &reporter)
            })?;
            println!(
                "Line {}: {} observable(s) in {}",
                entry.line,
                observables.len(),
                sim_dir.display()
            );
        }
    }

    if failed > 0 {
        return Err(CliError::ComparisonFailed {
            failed,
            total: compared,
        });
    }
    Ok(())
}
