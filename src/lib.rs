//! Vivaria engine crate.
//!
//! A GPU-resident world simulation: four coupled 2D fields (elevation,
//! temperature, humidity, discrete biome class) evolved by double-buffered
//! compute kernels, with explicit hazard planning between kernel stages and
//! the visualization reader.
#![deny(missing_docs)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::dbg_macro, clippy::large_enum_variant)]

pub mod binding;
pub mod biome;
pub mod clock;
pub mod engine;
pub mod error;
pub mod field;
pub mod gpu;
pub mod grid;
pub mod hazard;
pub mod params;
pub mod schedule;
pub mod stage;

/// Returns the engine version string from Cargo metadata.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
