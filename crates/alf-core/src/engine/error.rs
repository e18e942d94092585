use super::config::ConfigError;
use crate::core::io::error::ObservableError;
use crate::core::params::ParamError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Parameter error: {0}")]
    Param(#[from] ParamError),

    #[error("I/O error on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Command '{command}' failed with {status}")]
    CommandFailed { command: String, status: String },

    #[error("Step '{step}' failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<EngineError>,
    },

    #[error("Failed to read results: {0}")]
    Observables(#[from] ObservableError),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Attaches the name of the workflow step that produced this error.
    pub(crate) fn in_step(self, step: &'static str) -> Self {
        EngineError::Step {
            step,
            source: Box::new(self),
        }
    }
}
