//! # Workflows Module
//!
//! High-level entry points that tie the [`crate::engine`] steps and the
//! [`crate::core`] decoders into complete procedures.
//!
//! - **Simulation** ([`simulation`]) - Compile, run, analyse and collect the results of one
//!   simulation directory, including parallel-tempering replicas.
//! - **Branch comparison** ([`compare`]) - Run identical parameters from a reference and a
//!   test branch and compare every analysed observable within tolerance.

pub mod compare;
pub mod simulation;
