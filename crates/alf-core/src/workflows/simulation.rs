use crate::core::io::results::{ObservableSet, read_observables};
use crate::core::io::shape::ShapeMode;
use crate::engine::analysis::analyse_directory;
use crate::engine::compile::compile;
use crate::engine::config::SimulationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::run::run;
use crate::engine::runner::{CommandRunner, SystemRunner};
use tracing::{info, instrument};

/// Which stages [`Simulation::execute`] performs before collecting results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    pub compile: bool,
    pub run: bool,
    pub analysis: bool,
}

impl Default for Stages {
    fn default() -> Self {
        Self {
            compile: true,
            run: true,
            analysis: true,
        }
    }
}

/// One simulation directory and everything needed to produce its results.
pub struct Simulation<R = SystemRunner> {
    config: SimulationConfig,
    runner: R,
    shape_mode: ShapeMode,
}

impl Simulation<SystemRunner> {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: CommandRunner> Simulation<R> {
    pub fn with_runner(config: SimulationConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            shape_mode: ShapeMode::default(),
        }
    }

    /// Selects how result files with ambiguous shapes are decoded.
    pub fn shape_mode(mut self, mode: ShapeMode) -> Self {
        self.shape_mode = mode;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Builds the simulation program, cloning the sources if needed.
    #[instrument(skip_all, name = "compile", fields(alf_dir = %self.config.alf_dir.display()))]
    pub fn compile(&self, reporter: &ProgressReporter) -> Result<(), EngineError> {
        compile(&self.runner, &self.config, reporter)
    }

    /// Prepares the simulation directory (or replica directories) and runs.
    #[instrument(skip_all, name = "run", fields(sim_dir = %self.config.sim_dir.display()))]
    pub fn run(&self) -> Result<(), EngineError> {
        run(&self.runner, &self.config)
    }

    /// Runs the default error analysis in every result directory.
    #[instrument(skip_all, name = "analysis", fields(sim_dir = %self.config.sim_dir.display()))]
    pub fn analysis(&self, reporter: &ProgressReporter) -> Result<(), EngineError> {
        for dir in self.config.result_dirs() {
            analyse_directory(
                &self.runner,
                &self.config.alf_dir,
                &dir,
                self.config.hdf5,
                reporter,
            )
            .map_err(|e| e.in_step("analysis"))?;
        }
        Ok(())
    }

    /// Analysed results in the simulation directory.
    pub fn observables(&self, names: Option<&[String]>) -> Result<ObservableSet, EngineError> {
        Ok(read_observables(&self.config.sim_dir, names, self.shape_mode)?)
    }

    /// Analysed results of each tempering replica, in replica order.
    pub fn replica_observables(
        &self,
        names: Option<&[String]>,
    ) -> Result<Vec<ObservableSet>, EngineError> {
        self.config
            .result_dirs()
            .iter()
            .map(|dir| Ok(read_observables(dir, names, self.shape_mode)?))
            .collect()
    }

    /// Performs the selected stages in order and collects the results.
    #[instrument(skip_all, name = "simulation_workflow", fields(ham = %self.config.ham_name))]
    pub fn execute(
        &self,
        stages: Stages,
        reporter: &ProgressReporter,
    ) -> Result<ObservableSet, EngineError> {
        if stages.compile {
            reporter.phase("Compile", || self.compile(reporter))?;
        }
        if stages.run {
            reporter.phase("Run", || self.run())?;
        }
        if stages.analysis {
            reporter.phase("Analysis", || self.analysis(reporter))?;
        }
        let observables = reporter.phase("Collect", || self.observables(None))?;
        reporter.report(Progress::Message(format!(
            "{} observable(s) in {}",
            observables.len(),
            self.config.sim_dir.display()
        )));
        info!(
            "Collected {} observable(s) from {}",
            observables.len(),
            self.config.sim_dir.display()
        );
        Ok(observables)
    }
}
