//! # Engine Module
//!
//! Orchestration of the external toolchain around a simulation: the typed
//! configuration, the command runner abstraction and the individual steps
//! that build the program, prepare simulation directories, launch the Monte
//! Carlo run and invoke the analysis binaries.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated [`config::SimulationConfig`] and its builder
//! - **Commands** ([`runner`]) - [`runner::CommandSpec`] with an explicit working directory,
//!   the [`runner::CommandRunner`] trait and environment capture from the configure script
//! - **Steps** ([`compile`], [`prepare`], [`run`], [`analysis`]) - One function per workflow stage
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation

pub mod analysis;
pub mod compile;
pub mod config;
pub mod error;
pub mod prepare;
pub mod progress;
pub mod run;
pub mod runner;
