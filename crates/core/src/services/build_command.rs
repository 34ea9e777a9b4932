//! Resolution of a build target into its link output and the static
//! objects and archives that went into it.

use log::debug;

use super::toolchains::Toolchain;
use crate::{StatsError, StatsResult};

/// CMake wraps shared library symlinks in a helper command; the real
/// target follows this token.
const SYMLINK_MARKER: &str = "cmake_symlink_library";

/// A resolved link step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCommand {
    /// Target name, after following a symlink step.
    pub target: String,
    /// Build-relative path of the linked binary.
    pub output: String,
    /// Build-relative objects and archives, deduplicated, in link order.
    pub objects: Vec<String>,
}

/// The real target named by a `cmake_symlink_library` command, if any.
pub fn symlink_target(command: &str) -> Option<&str> {
    let mut tokens = command.split_whitespace();
    tokens.by_ref().find(|token| *token == SYMLINK_MARKER)?;
    tokens.next()
}

/// The path following `-o`.
pub fn link_output(command: &str) -> Option<&str> {
    let mut tokens = command.split_whitespace();
    tokens.by_ref().find(|token| *token == "-o")?;
    tokens.next()
}

/// Every `.o`/`.a` token for which `exists` holds, first occurrence only.
pub fn contributing_objects(command: &str, exists: impl Fn(&str) -> bool) -> Vec<String> {
    let mut objects: Vec<String> = Vec::new();
    for token in command.split_whitespace() {
        if !(token.ends_with(".o") || token.ends_with(".a")) {
            continue;
        }
        if objects.iter().any(|seen| seen == token) || !exists(token) {
            continue;
        }
        objects.push(token.to_string());
    }
    objects
}

/// Ask the toolchain for `target`'s link command and break it down.
pub fn resolve_link_command<T: Toolchain + ?Sized>(
    toolchain: &T,
    target: &str,
) -> StatsResult<LinkCommand> {
    let mut target = target.to_string();
    let mut command = toolchain.target_command(&target)?;
    if let Some(real) = symlink_target(&command) {
        debug!("{target} is a library symlink, using {real}");
        target = real.to_string();
        command = toolchain.target_command(&target)?;
    }

    let output = link_output(&command)
        .ok_or_else(|| StatsError::MissingLinkOutput { target: target.clone() })?
        .to_string();
    let objects = contributing_objects(&command, |entry| toolchain.has_artifact(entry));
    Ok(LinkCommand { target, output, objects })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symlink_target_reads_the_following_token() {
        let command = "cd lib && cmake -E cmake_symlink_library libjxl.so.0.9 libjxl.so.0 libjxl.so";
        assert_eq!(symlink_target(command), Some("libjxl.so.0.9"));
        assert_eq!(symlink_target("c++ -o tool a.o"), None);
    }

    #[test]
    fn link_output_requires_a_value() {
        assert_eq!(link_output("c++ a.o -o tools/cjxl"), Some("tools/cjxl"));
        assert_eq!(link_output("c++ a.o -o"), None);
    }
}
