//! Reading and writing the analysed result files of a simulation.
//!
//! The analysis binaries write `*_scalJ` (scalar observables) and
//! `*_eqJK`/`*_eqJR` (equal-time correlators in momentum/real space) as plain
//! text without stored dimensions. The decoders here reconstruct the record
//! shapes from line and field counts, strictly by default or with the
//! truncating legacy heuristics ([`shape::ShapeMode`]). Collected records can
//! be re-exported as a self-describing TOML archive or as flat CSV.

pub mod archive;
pub mod eqj;
pub mod error;
pub mod export;
pub mod results;
pub mod scal;
pub mod shape;
pub mod traits;
