mod defaults;

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use alfkit::core::io::shape::ShapeMode;
use alfkit::core::params::value::{Overrides, ParamValue};
use alfkit::engine::config::{
    Machine, ParameterSets, SimulationConfig, SimulationConfigBuilder, Stabilization,
};
use alfkit::workflows::simulation::Stages;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use defaults::{CONFIG_FILE_NAME, discover};

/// Simulation settings as written in a TOML file; every field may be left
/// out and supplied on the command line instead.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialSimulationConfig {
    ham_name: Option<String>,
    alf_dir: Option<PathBuf>,
    sim_root: Option<PathBuf>,
    sim_dir: Option<PathBuf>,
    branch: Option<String>,
    machine: Option<String>,
    stab: Option<String>,
    mpi: Option<bool>,
    n_mpi: Option<usize>,
    n_omp: Option<usize>,
    mpiexec: Option<String>,
    devel: Option<bool>,
    hdf5: Option<bool>,
    repository_url: Option<String>,
    legacy: Option<bool>,
    parameters: Option<Overrides>,
    tempering: Option<Vec<Overrides>>,
}

/// Everything the `run` command needs after file and flags are merged.
#[derive(Debug)]
pub struct RunPlan {
    pub config: SimulationConfig,
    pub stages: Stages,
    pub shape_mode: ShapeMode,
}

impl PartialSimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads `--config`, or `alfkit.toml` from the working directory if it
    /// exists; otherwise starts from an empty configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir().ok().and_then(|cwd| discover(&cwd)),
        };
        match path {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("No {} found, using command-line values only.", CONFIG_FILE_NAME);
                Ok(Self::default())
            }
        }
    }

    /// Command-line values take precedence over the file; `-S` overrides
    /// are applied on top of the file's parameters (to every replica for
    /// parallel tempering).
    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<RunPlan> {
        let mut parameters = self.take_parameters()?;
        apply_set_values(&mut parameters, &args.set_values)?;

        let machine = args
            .machine
            .as_deref()
            .or(self.machine.as_deref())
            .map(str::parse::<Machine>)
            .transpose()?
            .unwrap_or_default();
        let stab = match args.stab.as_deref().or(self.stab.as_deref()) {
            Some(s) => Stabilization::parse_optional(s)?,
            None => None,
        };

        let mut builder = SimulationConfigBuilder::new()
            .parameters(parameters)
            .branch(args.branch.clone().or(self.branch))
            .mpi(args.mpi || self.mpi.unwrap_or(false))
            .n_mpi(args.n_mpi.or(self.n_mpi))
            .machine(machine)
            .stab(stab)
            .devel(args.devel || self.devel.unwrap_or(false))
            .hdf5(args.hdf5 || self.hdf5.unwrap_or(false));

        if let Some(ham_name) = args.ham_name.clone().or(self.ham_name) {
            builder = builder.ham_name(ham_name);
        }
        if let Some(alf_dir) = args.alf_dir.clone().or(self.alf_dir) {
            builder = builder.alf_dir(alf_dir);
        }
        if let Some(sim_root) = args.sim_root.clone().or(self.sim_root) {
            builder = builder.sim_root(sim_root);
        }
        if let Some(sim_dir) = args.sim_dir.clone().or(self.sim_dir) {
            builder = builder.sim_dir(sim_dir);
        }
        if let Some(n_omp) = args.n_omp.or(self.n_omp) {
            builder = builder.n_omp(n_omp);
        }
        if let Some(mpiexec) = args.mpiexec.clone().or(self.mpiexec) {
            builder = builder.mpiexec(mpiexec);
        }
        if let Some(url) = self.repository_url {
            builder = builder.repository_url(url);
        }

        let shape_mode = if args.legacy || self.legacy.unwrap_or(false) {
            ShapeMode::Legacy
        } else {
            ShapeMode::Strict
        };
        let stages = Stages {
            compile: !args.skip_compile,
            run: !args.skip_run,
            analysis: !args.skip_analysis,
        };

        Ok(RunPlan {
            config: builder.build()?,
            stages,
            shape_mode,
        })
    }

    fn take_parameters(&mut self) -> Result<ParameterSets> {
        match (self.parameters.take(), self.tempering.take()) {
            (Some(_), Some(_)) => Err(CliError::Config(
                "`parameters` and `tempering` cannot both be given".to_string(),
            )),
            (Some(single), None) => Ok(ParameterSets::Single(single)),
            (None, Some(sets)) => Ok(ParameterSets::Tempering(sets)),
            (None, None) => Ok(ParameterSets::default()),
        }
    }
}

/// Splits a `NAME=VALUE` argument, inferring the value's type.
pub fn parse_set_value(kv_pair: &str) -> Result<(String, ParamValue)> {
    let Some((name, value)) = kv_pair.split_once('=') else {
        return Err(CliError::Argument(format!(
            "Invalid --set format: '{}'. Expected NAME=VALUE.",
            kv_pair
        )));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::Argument(format!(
            "Missing parameter name in --set value '{}'",
            kv_pair
        )));
    }
    Ok((name.to_string(), ParamValue::parse_literal(value)))
}

pub fn overrides_from_set_values(set_values: &[String]) -> Result<Overrides> {
    let mut overrides = Overrides::new();
    for kv_pair in set_values {
        let (name, value) = parse_set_value(kv_pair)?;
        overrides.set(name, value);
    }
    Ok(overrides)
}

fn apply_set_values(parameters: &mut ParameterSets, set_values: &[String]) -> Result<()> {
    for kv_pair in set_values {
        let (name, value) = parse_set_value(kv_pair)?;
        match parameters {
            ParameterSets::Single(overrides) => overrides.set(name, value),
            ParameterSets::Tempering(sets) => {
                for overrides in sets.iter_mut() {
                    overrides.set(name.clone(), value.clone());
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use alfkit::engine::config::{ConfigError, Launcher};
    use alfkit::engine::error::EngineError;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["alfkit", "run"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Run(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    const FILE: &str = r#"
ham-name = "Hubbard"
alf-dir = "/opt/ALF"
sim-root = "/scratch/runs"
machine = "intel"
stab = "stab2"
n-omp = 2

[parameters]
L1 = 4
Ham_U = 4.0
Lattice_type = "Square"
"#;

    #[test]
    fn file_values_are_used_when_no_flags_are_given() {
        let partial = PartialSimulationConfig::from_toml_str(FILE).unwrap();
        let plan = partial.merge_with_cli(&run_args(&[])).unwrap();

        let config = plan.config;
        assert_eq!(config.ham_name, "Hubbard");
        assert_eq!(config.alf_dir, PathBuf::from("/opt/ALF"));
        assert_eq!(
            config.sim_dir,
            PathBuf::from("/scratch/runs/Hubbard_L1=4_U=4.0_Square")
        );
        assert_eq!(config.machine, Machine::Intel);
        assert_eq!(config.stab, Some(Stabilization::Stab2));
        assert_eq!(config.n_omp, 2);
        assert_eq!(config.launcher, Launcher::Serial);
        assert_eq!(plan.stages, Stages::default());
        assert_eq!(plan.shape_mode, ShapeMode::Strict);
    }

    #[test]
    fn flags_and_set_values_override_the_file() {
        let partial = PartialSimulationConfig::from_toml_str(FILE).unwrap();
        let args = run_args(&[
            "--machine", "GNU", "-S", "l1=6", "-S", "Beta=10.0", "--mpi", "--n-mpi", "4",
            "--skip-compile", "--legacy",
        ]);
        let plan = partial.merge_with_cli(&args).unwrap();

        let config = plan.config;
        assert_eq!(config.machine, Machine::Gnu);
        let ParameterSets::Single(overrides) = &config.parameters else {
            panic!("expected a single parameter set");
        };
        assert_eq!(overrides.get("L1"), Some(&ParamValue::Int(6)));
        assert_eq!(overrides.get("Beta"), Some(&ParamValue::Float(10.0)));
        assert!(config.sim_dir.ends_with("Hubbard_L1=6_U=4.0_Square_Beta=10.0"));
        assert!(config.uses_mpi());
        assert!(!plan.stages.compile && plan.stages.run && plan.stages.analysis);
        assert_eq!(plan.shape_mode, ShapeMode::Legacy);
    }

    #[test]
    fn tempering_sets_receive_every_set_value() {
        let content = r#"
ham-name = "Hubbard"
n-mpi = 2

[[tempering]]
Beta = 2.0

[[tempering]]
Beta = 4.0
"#;
        let partial = PartialSimulationConfig::from_toml_str(content).unwrap();
        let plan = partial
            .merge_with_cli(&run_args(&["-S", "Nsweep=5"]))
            .unwrap();

        let ParameterSets::Tempering(sets) = &plan.config.parameters else {
            panic!("expected tempering sets");
        };
        assert_eq!(sets.len(), 2);
        assert!(sets.iter().all(|s| s.get("Nsweep") == Some(&ParamValue::Int(5))));
        assert!(plan.config.uses_mpi());
        assert!(plan
            .config
            .sim_dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("temper_Hubbard"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(PartialSimulationConfig::from_toml_str("hamname = \"Hubbard\"").is_err());
    }

    #[test]
    fn parameters_and_tempering_are_exclusive() {
        let content = "ham-name = \"Hubbard\"\n[parameters]\nL1 = 4\n[[tempering]]\nL1 = 6\n";
        let partial = PartialSimulationConfig::from_toml_str(content).unwrap();
        let err = partial.merge_with_cli(&run_args(&[])).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn missing_hamiltonian_is_a_configuration_error() {
        let err = PartialSimulationConfig::default()
            .merge_with_cli(&run_args(&[]))
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Engine(EngineError::Config(ConfigError::MissingParameter("ham_name")))
        ));
    }

    #[test]
    fn malformed_set_value_is_an_argument_error() {
        assert!(matches!(parse_set_value("L1"), Err(CliError::Argument(_))));
        assert!(matches!(parse_set_value("=4"), Err(CliError::Argument(_))));
        assert_eq!(
            parse_set_value("Ham_U=4.0").unwrap(),
            ("Ham_U".to_string(), ParamValue::Float(4.0))
        );
    }

    #[test]
    fn config_file_is_reported_with_its_path_on_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "ham-name = ").unwrap();

        assert_eq!(discover(dir.path()), Some(path.clone()));
        let err = PartialSimulationConfig::from_file(&path).unwrap_err();
        match err {
            CliError::FileParsing { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
