use std::path::PathBuf;

use thiserror::Error;

use crate::services::toolchains::ToolchainError;

/// Error type for parsing, decoding and attribution.
///
/// Everything here is fatal for the target being analyzed. Symbols with an
/// unknown kind are not errors; they are collected as
/// [`KindWarning`](crate::analysis::KindWarning)s instead.
#[derive(Debug, Error)]
pub enum StatsError {
    /// A symbol-table line did not have the `name kind [address] [size]` shape.
    #[error("Malformed symbol record in {origin} at line {line}: {reason} ({text:?})")]
    MalformedSymbolRecord { origin: String, line: usize, text: String, reason: String },

    /// The file format descriptor matched neither the 32-bit nor 64-bit
    /// little-endian ELF patterns.
    #[error("Unknown binary format: {descriptor:?}")]
    UnknownBinaryFormat { descriptor: String },

    /// An address was expected but fewer than a full pointer width remained.
    #[error(
        "Truncated .stack_sizes section at offset {offset}: need {needed} bytes, {available} left"
    )]
    TruncatedStackSection { offset: usize, needed: usize, available: usize },

    /// A LEB128 stack size did not terminate within 10 bytes or exceeded 64 bits.
    #[error("Stack size at offset {offset} overflows a 64-bit LEB128 value")]
    StackSizeOverflow { offset: usize },

    /// A `.stack_sizes` entry points at an address with no code symbol.
    #[error("No code symbol at address {address:#x} (stack size {stack_size})")]
    DanglingStackSizeAddress { address: u64, stack_size: u64 },

    /// Attributed sizes add up to more than the binary itself.
    #[error("Attributed {dimension} size {attributed} exceeds the largest entry {max}")]
    NegativeUnattributedSize { dimension: &'static str, max: u64, attributed: u64 },

    /// A size map holds a kind that is neither binary nor static-RAM data.
    #[error("Unknown type {kind:?} in the size map of {object}")]
    UnclassifiedKind { object: String, kind: char },

    /// The link command for a target does not name an output with `-o`.
    #[error("Link command for target {target} has no -o output")]
    MissingLinkOutput { target: String },

    /// Failure wrapped with the target being analyzed.
    #[error("While analyzing target {target}: {source}")]
    InTarget {
        target: String,
        #[source]
        source: Box<StatsError>,
    },

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StatsError {
    /// Wrap the error with the name of the target it was raised for.
    pub fn in_target(self, target: impl Into<String>) -> Self {
        StatsError::InTarget { target: target.into(), source: Box::new(self) }
    }

    /// The innermost error, skipping any target wrappers.
    pub fn root_cause(&self) -> &StatsError {
        match self {
            StatsError::InTarget { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Convenience result type for library operations.
pub type StatsResult<T> = Result<T, StatsError>;
