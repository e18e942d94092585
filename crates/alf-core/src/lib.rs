//! # alfkit Core Library
//!
//! Parameter resolution, run orchestration and result-file decoding for the
//! ALF auxiliary-field quantum Monte Carlo code.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture with a clear separation of concerns.
//!
//! - **[`core`]: The Foundation.** Stateless data: the per-Hamiltonian parameter tables and
//!   their namelist rendering, the decoders for the analysed `*_scalJ` and `*_eqJK`/`*_eqJR`
//!   result files (strict or legacy shape inference), a self-describing archive format,
//!   CSV export and tolerance comparison.
//!
//! - **[`engine`]: The Logic Core.** The validated [`engine::config::SimulationConfig`], the
//!   [`engine::runner::CommandRunner`] abstraction over external programs and the individual
//!   steps (build, directory preparation, run, analysis). Every step receives its working
//!   directory explicitly.
//!
//! - **[`workflows`]: The Public API.** [`workflows::simulation::Simulation`] drives a run from
//!   compilation to collected observables; [`workflows::compare`] runs two branches against each
//!   other and reports differences.

pub mod core;
pub mod engine;
pub mod workflows;
