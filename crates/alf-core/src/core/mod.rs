//! # Core Module
//!
//! Stateless building blocks: the parameter tables and namelist rendering
//! ([`params`]), the result-file decoders and encoders ([`io`]) and the
//! tolerance comparison of two result sets ([`compare`]).
//!
//! Nothing here spawns processes or touches directories other than the ones
//! passed in explicitly; orchestration lives in [`crate::engine`].

pub mod compare;
pub mod io;
pub mod params;
