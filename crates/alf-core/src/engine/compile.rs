use super::config::SimulationConfig;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::runner::{CommandRunner, CommandSpec, capture_environment};
use std::fs;
use tracing::info;

const MAKE_TARGETS: [&str; 3] = ["clean", "ana", "program"];

/// Fetches the source tree if needed, checks out the configured branch and
/// builds the analysis and simulation programs.
pub fn compile(
    runner: &dyn CommandRunner,
    config: &SimulationConfig,
    reporter: &ProgressReporter,
) -> Result<(), EngineError> {
    let alf_dir = &config.alf_dir;

    if !alf_dir.exists() {
        info!(
            "Repository {} does not exist, cloning from {}",
            alf_dir.display(),
            config.repository_url
        );
        let parent = alf_dir.parent().unwrap_or(alf_dir.as_path());
        fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
        let clone = CommandSpec::new("git", parent)
            .arg("clone")
            .arg(&config.repository_url)
            .arg(alf_dir.to_string_lossy());
        runner.run(&clone).map_err(|e| e.in_step("clone"))?;
    }

    if let Some(branch) = &config.branch {
        info!("Checking out branch {}", branch);
        let checkout = CommandSpec::new("git", alf_dir).arg("checkout").arg(branch);
        runner.run(&checkout).map_err(|e| e.in_step("checkout"))?;
    }

    let env = capture_environment(runner, alf_dir, &config.configure_args())
        .map_err(|e| e.in_step("configure"))?;

    info!("Compiling ALF in {}", alf_dir.display());
    reporter.report(Progress::TaskStart {
        total_steps: MAKE_TARGETS.len() as u64,
    });
    for target in MAKE_TARGETS {
        reporter.report(Progress::Message(format!("make {target}")));
        let make = CommandSpec::new("make", alf_dir)
            .arg(target)
            .env_clear_with(env.clone());
        runner.run(&make).map_err(|e| e.in_step("make"))?;
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    info!("Compilation done.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{ParameterSets, SimulationConfigBuilder};
    use crate::engine::runner::mock::{RecordingRunner, writes_environment};
    use tempfile::tempdir;

    fn config_in(alf_dir: &std::path::Path, branch: Option<&str>) -> SimulationConfig {
        SimulationConfigBuilder::new()
            .ham_name("Hubbard")
            .parameters(ParameterSets::default())
            .alf_dir(alf_dir)
            .sim_root(alf_dir.join("runs"))
            .branch(branch.map(str::to_string))
            .build()
            .unwrap()
    }

    #[test]
    fn existing_checkout_is_configured_and_built() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path(), Some("master"));
        let runner = RecordingRunner::with_hook(writes_environment("FC=gfortran\n"));

        compile(&runner, &config, &ProgressReporter::new()).unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "git checkout master".to_string(),
                "bash -c . ./configure.sh GNU NOMPI NO-INTERACTIVE || exit 1 && env > environment"
                    .to_string(),
                "make clean".to_string(),
                "make ana".to_string(),
                "make program".to_string(),
            ]
        );
        let calls = runner.calls();
        for make in &calls[2..] {
            assert_eq!(make.working_dir, config.alf_dir);
            assert_eq!(make.env_value("FC"), Some("gfortran"));
        }
    }

    #[test]
    fn missing_checkout_is_cloned_first() {
        let dir = tempdir().unwrap();
        let alf_dir = dir.path().join("ALF");
        let config = config_in(&alf_dir, None);
        let runner = RecordingRunner::with_hook(|spec| {
            if spec.program == "git" {
                fs::create_dir_all(spec.working_dir.join("ALF")).unwrap();
            }
            writes_environment("")(spec)
        });

        compile(&runner, &config, &ProgressReporter::new()).unwrap();

        let lines = runner.command_lines();
        assert_eq!(
            lines[0],
            format!(
                "git clone https://git.physik.uni-wuerzburg.de/ALF/ALF.git {}",
                config.alf_dir.display()
            )
        );
        assert_eq!(runner.calls()[0].working_dir, dir.path());
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn failing_make_names_the_step() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path(), None);
        let runner = RecordingRunner::with_hook(|spec| {
            writes_environment("")(spec)?;
            if spec.program == "make" && spec.args == ["ana"] {
                return Err(EngineError::CommandFailed {
                    command: spec.to_string(),
                    status: "exit status: 2".to_string(),
                });
            }
            Ok(())
        });

        let err = compile(&runner, &config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, EngineError::Step { step: "make", .. }));
        assert_eq!(runner.calls().len(), 3);
    }
}
