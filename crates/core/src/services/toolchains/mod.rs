//! Sources of raw toolchain output.
//!
//! - `BinutilsToolchain` runs ninja and binutils as subprocesses.
//! - `DumpDirToolchain` reads output captured earlier into a directory.
//!
//! Entries are paths relative to the build directory, exactly as they
//! appear in the link command.

use std::path::PathBuf;

use thiserror::Error;

pub mod binutils;
pub mod dump_dir;

pub use binutils::BinutilsToolchain;
pub use dump_dir::DumpDirToolchain;

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit { program: String, status: String, stderr: String },
    #[error("{program} printed output that is not valid UTF-8: {source}")]
    Utf8 {
        program: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("{0} produced no output")]
    Empty(String),
    #[error("Captured dump not found: {0}")]
    MissingDump(PathBuf),
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Trait implemented by toolchain adapters.
pub trait Toolchain {
    /// The command that links `target` (the last command ninja would run).
    fn target_command(&self, target: &str) -> Result<String, ToolchainError>;

    /// Whether a build-relative object or archive exists.
    fn has_artifact(&self, entry: &str) -> bool;

    /// `nm --format=posix` output for an entry.
    fn symbol_dump(&self, entry: &str) -> Result<String, ToolchainError>;

    /// `objdump -a` output for an entry, which names its file format.
    fn file_format(&self, entry: &str) -> Result<String, ToolchainError>;

    /// Raw bytes of the entry's `.stack_sizes` section.
    fn stack_sizes_section(&self, entry: &str) -> Result<Vec<u8>, ToolchainError>;

    fn name(&self) -> &'static str;
}
