use crate::core::params::ParamError;
use crate::core::params::defaults::params_list;
use crate::core::params::naming::directory_name;
use crate::core::params::value::Overrides;
use directories::BaseDirs;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_ALF_DIR: &str = "./ALF";
pub const DEFAULT_SIM_ROOT: &str = "ALF_data";
pub const DEFAULT_MPIEXEC: &str = "mpiexec";
pub const DEFAULT_REPOSITORY_URL: &str = "https://git.physik.uni-wuerzburg.de/ALF/ALF.git";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Illegal value {field}={value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Parallel tempering needs at least one parameter set")]
    EmptyTempering,

    #[error("The number of MPI processes (n_mpi) must be given when MPI is used")]
    MpiProcessesRequired,

    #[error("Cannot resolve path '{path}': {message}", path = path.display())]
    Path { path: PathBuf, message: String },

    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Target platform for the build configuration script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Machine {
    #[default]
    Gnu,
    Intel,
    Pgi,
    Juwels,
    SupermucNg,
}

impl Machine {
    pub fn as_str(self) -> &'static str {
        match self {
            Machine::Gnu => "GNU",
            Machine::Intel => "INTEL",
            Machine::Pgi => "PGI",
            Machine::Juwels => "JUWELS",
            Machine::SupermucNg => "SUPERMUC-NG",
        }
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Machine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GNU" => Ok(Machine::Gnu),
            "INTEL" => Ok(Machine::Intel),
            "PGI" => Ok(Machine::Pgi),
            "JUWELS" => Ok(Machine::Juwels),
            "SUPERMUC-NG" => Ok(Machine::SupermucNg),
            _ => Err(ConfigError::InvalidValue {
                field: "machine",
                value: s.to_string(),
            }),
        }
    }
}

/// Numerical stabilization scheme compiled into the simulation program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stabilization {
    Stab1,
    Stab2,
    Stab3,
    Log,
}

impl Stabilization {
    pub fn as_str(self) -> &'static str {
        match self {
            Stabilization::Stab1 => "STAB1",
            Stabilization::Stab2 => "STAB2",
            Stabilization::Stab3 => "STAB3",
            Stabilization::Log => "LOG",
        }
    }

    /// Parses a stabilization name; the empty string selects the default
    /// scheme of the build script.
    pub fn parse_optional(s: &str) -> Result<Option<Self>, ConfigError> {
        if s.trim().is_empty() {
            Ok(None)
        } else {
            s.parse().map(Some)
        }
    }
}

impl fmt::Display for Stabilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stabilization {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STAB1" => Ok(Stabilization::Stab1),
            "STAB2" => Ok(Stabilization::Stab2),
            "STAB3" => Ok(Stabilization::Stab3),
            "LOG" => Ok(Stabilization::Log),
            _ => Err(ConfigError::InvalidValue {
                field: "stab",
                value: s.to_string(),
            }),
        }
    }
}

/// Parameter overrides for one simulation, or one per replica for
/// parallel tempering.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSets {
    Single(Overrides),
    Tempering(Vec<Overrides>),
}

impl ParameterSets {
    pub fn is_tempering(&self) -> bool {
        matches!(self, ParameterSets::Tempering(_))
    }

    /// The set used for the top-level directory (and its name).
    pub fn primary(&self) -> Option<&Overrides> {
        match self {
            ParameterSets::Single(overrides) => Some(overrides),
            ParameterSets::Tempering(sets) => sets.first(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overrides> {
        let slice = match self {
            ParameterSets::Single(overrides) => std::slice::from_ref(overrides),
            ParameterSets::Tempering(sets) => sets.as_slice(),
        };
        slice.iter()
    }

    pub fn len(&self) -> usize {
        match self {
            ParameterSets::Single(_) => 1,
            ParameterSets::Tempering(sets) => sets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ParameterSets {
    fn default() -> Self {
        ParameterSets::Single(Overrides::default())
    }
}

/// How the simulation executable is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    Serial,
    Mpi { n_mpi: usize, mpiexec: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub ham_name: String,
    pub parameters: ParameterSets,
    pub alf_dir: PathBuf,
    pub sim_dir: PathBuf,
    pub branch: Option<String>,
    pub launcher: Launcher,
    pub n_omp: usize,
    pub machine: Machine,
    pub stab: Option<Stabilization>,
    pub devel: bool,
    pub hdf5: bool,
    pub repository_url: String,
}

impl SimulationConfig {
    pub fn is_tempering(&self) -> bool {
        self.parameters.is_tempering()
    }

    pub fn uses_mpi(&self) -> bool {
        matches!(self.launcher, Launcher::Mpi { .. })
    }

    /// Arguments passed to the build configuration script.
    pub fn configure_args(&self) -> String {
        let mut args = match self.stab {
            Some(stab) => format!("{} {}", self.machine, stab),
            None => self.machine.to_string(),
        };
        args.push_str(if self.uses_mpi() { " MPI" } else { " NOMPI" });
        if self.is_tempering() {
            args.push_str(" TEMPERING");
        }
        if self.devel {
            args.push_str(" DEVEL");
        }
        if self.hdf5 {
            args.push_str(" HDF5");
        }
        args.push_str(" NO-INTERACTIVE");
        args
    }

    /// Directory of replica `index` in a tempering run.
    pub fn replica_dir(&self, index: usize) -> PathBuf {
        self.sim_dir.join(format!("Temp_{index}"))
    }

    /// Every directory holding results: the replica directories for
    /// tempering, otherwise the simulation directory itself.
    pub fn result_dirs(&self) -> Vec<PathBuf> {
        if self.is_tempering() {
            (0..self.parameters.len())
                .map(|i| self.replica_dir(i))
                .collect()
        } else {
            vec![self.sim_dir.clone()]
        }
    }

    /// The same configuration with its results placed in `sim_dir`.
    pub fn with_sim_dir(mut self, sim_dir: PathBuf) -> Self {
        self.sim_dir = sim_dir;
        self
    }
}

/// Expands a leading `~` and makes the path absolute.
pub fn resolve_path(path: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };
    std::path::absolute(&expanded).map_err(|e| ConfigError::Path {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    ham_name: Option<String>,
    parameters: Option<ParameterSets>,
    alf_dir: Option<PathBuf>,
    sim_root: Option<PathBuf>,
    sim_dir: Option<PathBuf>,
    branch: Option<String>,
    mpi: bool,
    n_mpi: Option<usize>,
    n_omp: Option<usize>,
    mpiexec: Option<String>,
    machine: Option<Machine>,
    stab: Option<Stabilization>,
    devel: bool,
    hdf5: bool,
    repository_url: Option<String>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ham_name(mut self, name: impl Into<String>) -> Self {
        self.ham_name = Some(name.into());
        self
    }
    pub fn parameters(mut self, parameters: ParameterSets) -> Self {
        self.parameters = Some(parameters);
        self
    }
    pub fn alf_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.alf_dir = Some(path.into());
        self
    }
    pub fn sim_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.sim_root = Some(path.into());
        self
    }
    pub fn sim_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sim_dir = Some(path.into());
        self
    }
    pub fn branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }
    pub fn mpi(mut self, mpi: bool) -> Self {
        self.mpi = mpi;
        self
    }
    pub fn n_mpi(mut self, n: Option<usize>) -> Self {
        self.n_mpi = n;
        self
    }
    pub fn n_omp(mut self, n: usize) -> Self {
        self.n_omp = Some(n);
        self
    }
    pub fn mpiexec(mut self, command: impl Into<String>) -> Self {
        self.mpiexec = Some(command.into());
        self
    }
    pub fn machine(mut self, machine: Machine) -> Self {
        self.machine = Some(machine);
        self
    }
    pub fn stab(mut self, stab: Option<Stabilization>) -> Self {
        self.stab = stab;
        self
    }
    pub fn devel(mut self, devel: bool) -> Self {
        self.devel = devel;
        self
    }
    pub fn hdf5(mut self, hdf5: bool) -> Self {
        self.hdf5 = hdf5;
        self
    }
    pub fn repository_url(mut self, url: impl Into<String>) -> Self {
        self.repository_url = Some(url.into());
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let ham_name = self
            .ham_name
            .ok_or(ConfigError::MissingParameter("ham_name"))?;
        let parameters = self.parameters.unwrap_or_default();
        if parameters.is_empty() {
            return Err(ConfigError::EmptyTempering);
        }

        let known = params_list(&ham_name, true)?;
        for overrides in parameters.iter() {
            if let Some((name, _)) = overrides
                .iter()
                .find(|(name, _)| !known.contains(&name.to_uppercase()))
            {
                return Err(ParamError::UnknownParameter(name.to_string()).into());
            }
        }

        let mpi = self.mpi || parameters.is_tempering();
        let launcher = if mpi {
            Launcher::Mpi {
                n_mpi: self.n_mpi.ok_or(ConfigError::MpiProcessesRequired)?,
                mpiexec: self
                    .mpiexec
                    .unwrap_or_else(|| DEFAULT_MPIEXEC.to_string()),
            }
        } else {
            Launcher::Serial
        };

        let alf_dir = resolve_path(
            &self
                .alf_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ALF_DIR)),
        )?;
        let sim_dir_name = match self.sim_dir {
            Some(dir) => dir,
            None => {
                let primary = parameters.primary().ok_or(ConfigError::EmptyTempering)?;
                PathBuf::from(directory_name(
                    &ham_name,
                    primary,
                    parameters.is_tempering(),
                )?)
            }
        };
        let sim_root = self
            .sim_root
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SIM_ROOT));
        let sim_dir = resolve_path(&sim_root.join(sim_dir_name))?;

        Ok(SimulationConfig {
            ham_name,
            parameters,
            alf_dir,
            sim_dir,
            branch: self.branch,
            launcher,
            n_omp: self.n_omp.unwrap_or(1),
            machine: self.machine.unwrap_or_default(),
            stab: self.stab,
            devel: self.devel,
            hdf5: self.hdf5,
            repository_url: self
                .repository_url
                .unwrap_or_else(|| DEFAULT_REPOSITORY_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::value::ParamValue;

    fn hubbard_overrides() -> Overrides {
        [
            ("Lattice_type", ParamValue::from("Square")),
            ("L1", ParamValue::from(4_i64)),
            ("Ham_U", ParamValue::from(4.0)),
            ("Nsweep", ParamValue::from(10_i64)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn machine_and_stab_parse_case_insensitively() {
        assert_eq!("intel".parse::<Machine>().unwrap(), Machine::Intel);
        assert_eq!("SuperMUC-NG".parse::<Machine>().unwrap(), Machine::SupermucNg);
        assert!(matches!(
            "cray".parse::<Machine>(),
            Err(ConfigError::InvalidValue { field: "machine", .. })
        ));
        assert_eq!("log".parse::<Stabilization>().unwrap(), Stabilization::Log);
        assert_eq!(Stabilization::parse_optional("").unwrap(), None);
        assert_eq!(
            Stabilization::parse_optional("stab2").unwrap(),
            Some(Stabilization::Stab2)
        );
        assert!(Stabilization::parse_optional("stab9").is_err());
    }

    #[test]
    fn defaults_produce_serial_gnu_configuration() {
        let config = SimulationConfigBuilder::new()
            .ham_name("Hubbard")
            .parameters(ParameterSets::Single(hubbard_overrides()))
            .build()
            .unwrap();

        assert_eq!(config.launcher, Launcher::Serial);
        assert_eq!(config.n_omp, 1);
        assert_eq!(config.machine, Machine::Gnu);
        assert_eq!(config.configure_args(), "GNU NOMPI NO-INTERACTIVE");
        assert_eq!(config.repository_url, DEFAULT_REPOSITORY_URL);
        assert!(config.alf_dir.is_absolute());
        assert!(config.alf_dir.ends_with("ALF"));
        assert!(config.sim_dir.is_absolute());
        assert!(
            config
                .sim_dir
                .ends_with("ALF_data/Hubbard_Square_L1=4_U=4.0")
        );
        assert_eq!(config.result_dirs(), vec![config.sim_dir.clone()]);
    }

    #[test]
    fn configure_args_include_every_selected_option() {
        let config = SimulationConfigBuilder::new()
            .ham_name("Hubbard")
            .machine(Machine::Intel)
            .stab(Some(Stabilization::Log))
            .mpi(true)
            .n_mpi(Some(4))
            .devel(true)
            .hdf5(true)
            .build()
            .unwrap();
        assert_eq!(
            config.configure_args(),
            "INTEL LOG MPI DEVEL HDF5 NO-INTERACTIVE"
        );
        assert_eq!(
            config.launcher,
            Launcher::Mpi {
                n_mpi: 4,
                mpiexec: "mpiexec".to_string()
            }
        );
    }

    #[test]
    fn tempering_forces_mpi_and_names_replica_dirs() {
        let sets = vec![hubbard_overrides(), hubbard_overrides()];
        let config = SimulationConfigBuilder::new()
            .ham_name("Hubbard")
            .parameters(ParameterSets::Tempering(sets))
            .n_mpi(Some(2))
            .sim_root("/tmp/alf-runs")
            .build()
            .unwrap();

        assert!(config.uses_mpi());
        assert_eq!(
            config.configure_args(),
            "GNU MPI TEMPERING NO-INTERACTIVE"
        );
        assert_eq!(
            config.sim_dir,
            PathBuf::from("/tmp/alf-runs/temper_Hubbard_Square_L1=4_U=4.0")
        );
        assert_eq!(
            config.result_dirs(),
            vec![config.sim_dir.join("Temp_0"), config.sim_dir.join("Temp_1")]
        );
    }

    #[test]
    fn mpi_without_process_count_is_rejected() {
        let result = SimulationConfigBuilder::new()
            .ham_name("Hubbard")
            .mpi(true)
            .build();
        assert_eq!(result.unwrap_err(), ConfigError::MpiProcessesRequired);

        let tempering = SimulationConfigBuilder::new()
            .ham_name("Hubbard")
            .parameters(ParameterSets::Tempering(vec![Overrides::default()]))
            .build();
        assert_eq!(tempering.unwrap_err(), ConfigError::MpiProcessesRequired);
    }

    #[test]
    fn empty_tempering_list_is_rejected() {
        let result = SimulationConfigBuilder::new()
            .ham_name("Hubbard")
            .parameters(ParameterSets::Tempering(Vec::new()))
            .n_mpi(Some(2))
            .build();
        assert_eq!(result.unwrap_err(), ConfigError::EmptyTempering);
    }

    #[test]
    fn unknown_parameters_and_hamiltonians_are_rejected() {
        let mut overrides = hubbard_overrides();
        overrides.set("Not_A_Param", ParamValue::from(1_i64));
        let result = SimulationConfigBuilder::new()
            .ham_name("Hubbard")
            .parameters(ParameterSets::Single(overrides))
            .build();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::Param(ParamError::UnknownParameter("Not_A_Param".to_string()))
        );

        let result = SimulationConfigBuilder::new().ham_name("Heisenberg").build();
        assert!(matches!(
            result,
            Err(ConfigError::Param(ParamError::UnknownHamiltonian(_)))
        ));

        assert_eq!(
            SimulationConfigBuilder::new().build().unwrap_err(),
            ConfigError::MissingParameter("ham_name")
        );
    }

    #[test]
    fn generic_parameters_are_accepted_but_not_named() {
        let mut overrides = hubbard_overrides();
        overrides.set("Nbin", ParamValue::from(5_i64));
        let config = SimulationConfigBuilder::new()
            .ham_name("Hubbard")
            .parameters(ParameterSets::Single(overrides))
            .sim_root("/data")
            .build()
            .unwrap();
        assert_eq!(
            config.sim_dir,
            PathBuf::from("/data/Hubbard_Square_L1=4_U=4.0")
        );
    }

    #[test]
    fn explicit_sim_dir_is_joined_to_root() {
        let config = SimulationConfigBuilder::new()
            .ham_name("Kondo")
            .sim_root("/data")
            .sim_dir("custom")
            .build()
            .unwrap();
        assert_eq!(config.sim_dir, PathBuf::from("/data/custom"));

        let absolute = SimulationConfigBuilder::new()
            .ham_name("Kondo")
            .sim_root("/data")
            .sim_dir("/elsewhere/run")
            .build()
            .unwrap();
        assert_eq!(absolute.sim_dir, PathBuf::from("/elsewhere/run"));
    }

    #[test]
    fn tilde_is_expanded_to_home() {
        let resolved = resolve_path(Path::new("~/alf")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("alf"));
        if let Some(dirs) = BaseDirs::new() {
            assert_eq!(resolved, dirs.home_dir().join("alf"));
        }
    }
}
