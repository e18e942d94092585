use alfkit::core::io::archive::ArchiveError;
use alfkit::core::io::error::ObservableError;
use alfkit::core::params::ParamError;
use alfkit::engine::config::ConfigError;
use alfkit::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Observables(#[from] ObservableError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("{failed} of {total} comparison(s) failed")]
    ComparisonFailed { failed: usize, total: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Engine(e.into())
    }
}

impl From<ParamError> for CliError {
    fn from(e: ParamError) -> Self {
        CliError::Engine(e.into())
    }
}
