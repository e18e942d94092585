use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "alfkit - compile, run and analyse ALF quantum Monte Carlo simulations and decode their results.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile ALF, run one simulation, analyse it and summarize the results.
    Run(RunArgs),
    /// Decode the analysed result files of a simulation directory.
    Obs(ObsArgs),
    /// Inspect the parameter tables of the supported Hamiltonians.
    Params(ParamsArgs),
    /// Run every simulation of a JSON-lines file, optionally comparing two branches.
    Batch(BatchArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to a simulation configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Name of the Hamiltonian (e.g., 'Hubbard', 'Kondo').
    #[arg(long = "ham", value_name = "NAME")]
    pub ham_name: Option<String>,

    /// Directory of the ALF sources; cloned if it does not exist.
    #[arg(long, value_name = "PATH")]
    pub alf_dir: Option<PathBuf>,

    /// Directory under which simulation directories are created.
    #[arg(long, value_name = "PATH")]
    pub sim_root: Option<PathBuf>,

    /// Simulation directory relative to the root, instead of the generated name.
    #[arg(long, value_name = "PATH")]
    pub sim_dir: Option<PathBuf>,

    /// Git branch to check out before compiling.
    #[arg(long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Machine configuration for the build script (GNU, INTEL, PGI, JUWELS, SUPERMUC-NG).
    #[arg(long, value_name = "MACHINE")]
    pub machine: Option<String>,

    /// Stabilization scheme (STAB1, STAB2, STAB3, LOG).
    #[arg(long, value_name = "STAB")]
    pub stab: Option<String>,

    /// Compile and run with MPI.
    #[arg(long)]
    pub mpi: bool,

    /// Number of MPI processes.
    #[arg(long, value_name = "INT")]
    pub n_mpi: Option<usize>,

    /// Number of OpenMP threads of the simulation program.
    #[arg(long, value_name = "INT")]
    pub n_omp: Option<usize>,

    /// Command used to start MPI programs.
    #[arg(long, value_name = "CMD")]
    pub mpiexec: Option<String>,

    /// Compile with development flags.
    #[arg(long)]
    pub devel: bool,

    /// Compile with HDF5 output and use the HDF5 analysis.
    #[arg(long)]
    pub hdf5: bool,

    /// Override a simulation parameter. Can be used multiple times.
    /// Example: -S L1=6 -S Ham_U=4.0
    #[arg(short = 'S', long = "set", value_name = "NAME=VALUE", num_args(0..))]
    pub set_values: Vec<String>,

    /// Do not compile ALF before running.
    #[arg(long)]
    pub skip_compile: bool,

    /// Do not run the simulation program.
    #[arg(long)]
    pub skip_run: bool,

    /// Do not run the error analysis.
    #[arg(long)]
    pub skip_analysis: bool,

    /// Decode result files with the lenient legacy shape inference.
    #[arg(long)]
    pub legacy: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human readable summary.
    #[default]
    Table,
    /// One row per value.
    Csv,
    /// Self-describing archive.
    Toml,
}

/// Arguments for the `obs` subcommand.
#[derive(Args, Debug)]
pub struct ObsArgs {
    /// Simulation directory containing `*_scalJ`, `*_eqJK` and `*_eqJR` files.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Only decode the named files. Can be used multiple times.
    #[arg(short, long = "name", value_name = "NAME")]
    pub names: Vec<String>,

    /// Decode with the lenient legacy shape inference.
    #[arg(long)]
    pub legacy: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write to a file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `params` subcommand.
#[derive(Args, Debug)]
pub struct ParamsArgs {
    #[command(subcommand)]
    pub command: ParamsCommands,
}

#[derive(Subcommand, Debug)]
pub enum ParamsCommands {
    /// List the parameters a Hamiltonian accepts.
    Show {
        /// Name of the Hamiltonian.
        ham: String,
        /// Also list the generic Monte Carlo parameters.
        #[arg(long)]
        generic: bool,
    },
    /// Render the `parameters` file for a Hamiltonian.
    Write {
        /// Name of the Hamiltonian.
        ham: String,
        /// Override a parameter. Can be used multiple times.
        #[arg(short = 'S', long = "set", value_name = "NAME=VALUE", num_args(0..))]
        set_values: Vec<String>,
        /// Write to a file instead of standard output.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Print the simulation directory name for a set of overrides.
    Dirname {
        /// Name of the Hamiltonian.
        ham: String,
        /// Override a parameter. Can be used multiple times.
        #[arg(short = 'S', long = "set", value_name = "NAME=VALUE", num_args(0..))]
        set_values: Vec<String>,
        /// Name the directory of a parallel tempering run.
        #[arg(long)]
        tempering: bool,
    },
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// File with one JSON object of parameters per line; a line `stop` ends the batch.
    #[arg(short, long, value_name = "PATH", default_value = "Sims")]
    pub file: PathBuf,

    /// Directory of the ALF sources.
    #[arg(long, value_name = "PATH", required = true)]
    pub alf_dir: PathBuf,

    /// Directory under which simulation directories are created.
    #[arg(long, value_name = "PATH")]
    pub sim_root: Option<PathBuf>,

    /// Hamiltonian of the reference runs.
    #[arg(long = "ham-name-r", value_name = "NAME", required = true)]
    pub ham_name_r: String,

    /// Hamiltonian of the test runs (default: the reference Hamiltonian).
    #[arg(long = "ham-name-t", value_name = "NAME")]
    pub ham_name_t: Option<String>,

    /// Do the reference runs.
    #[arg(short = 'R')]
    pub reference: bool,

    /// Do the test runs.
    #[arg(short = 'T')]
    pub test: bool,

    /// Git branch of the reference runs.
    #[arg(long = "branch-r", value_name = "BRANCH", default_value = "master")]
    pub branch_r: String,

    /// Git branch of the test runs.
    #[arg(long = "branch-t", value_name = "BRANCH", default_value = "master")]
    pub branch_t: String,

    /// Machine configuration for the build script.
    #[arg(long, value_name = "MACHINE", default_value = "GNU")]
    pub machine: String,

    /// Run with MPI.
    #[arg(long)]
    pub mpi: bool,

    /// Number of MPI processes.
    #[arg(long, value_name = "INT", default_value_t = 4)]
    pub n_mpi: usize,

    /// Decode result files with the lenient legacy shape inference.
    #[arg(long)]
    pub legacy: bool,
}
