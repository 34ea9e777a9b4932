//! Collaborators around the attribution engine: toolchain adapters that
//! produce the raw inputs, link command resolution, and the per-run
//! pipeline tying them together.

pub mod build_command;
pub mod pipeline;
pub mod toolchains;
