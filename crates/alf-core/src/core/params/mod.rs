//! Simulation parameters: default tables, user overrides and the namelist
//! file the simulation reads at start-up.

pub mod defaults;
pub mod namelist;
pub mod naming;
pub mod value;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParamError {
    #[error("Unknown Hamiltonian '{0}'")]
    UnknownHamiltonian(String),

    #[error("'{0}' does not correspond to a parameter")]
    UnknownParameter(String),
}
