//! build-stats-core
//!
//! Core library for estimating how much of a linked binary each statically
//! linked object is responsible for, once the linker has dropped unused
//! sections and merged weak and local duplicates.
//!
//! This crate defines the data model, the symbol-table parser, the
//! `.stack_sizes` decoder, the attribution engine, report assembly and the
//! toolchain adapters used to collect the raw inputs. The CLI is a thin
//! wrapper around it so everything substantive stays testable here.

pub mod analysis;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod services;
pub mod stack_sizes;
pub mod symbols;

pub use error::{StatsError, StatsResult};

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
