pub mod batch;
pub mod obs;
pub mod params;
pub mod run;
