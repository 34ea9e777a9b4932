use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use super::{Toolchain, ToolchainError};

/// Toolchain backed by ninja and (optionally prefixed) binutils.
pub struct BinutilsToolchain {
    build_dir: PathBuf,
    prefix: String,
    ninja: String,
}

impl BinutilsToolchain {
    pub fn new(build_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self { build_dir: build_dir.into(), prefix: prefix.into(), ninja: "ninja".to_string() }
    }

    pub fn with_ninja(mut self, ninja: impl Into<String>) -> Self {
        self.ninja = ninja.into();
        self
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    fn tool(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn artifact_path(&self, entry: &str) -> PathBuf {
        self.build_dir.join(entry)
    }
}

impl Toolchain for BinutilsToolchain {
    fn target_command(&self, target: &str) -> Result<String, ToolchainError> {
        let args: Vec<OsString> = vec![
            "-C".into(),
            self.build_dir.clone().into_os_string(),
            "-t".into(),
            "commands".into(),
            target.into(),
        ];
        let stdout = run_text(&self.ninja, &args)?;
        stdout
            .lines()
            .last()
            .map(str::to_string)
            .ok_or_else(|| ToolchainError::Empty(format!("{} -t commands {target}", self.ninja)))
    }

    fn has_artifact(&self, entry: &str) -> bool {
        self.artifact_path(entry).exists()
    }

    fn symbol_dump(&self, entry: &str) -> Result<String, ToolchainError> {
        let args: Vec<OsString> =
            vec!["--format=posix".into(), self.artifact_path(entry).into_os_string()];
        run_text(&self.tool("nm"), &args)
    }

    fn file_format(&self, entry: &str) -> Result<String, ToolchainError> {
        let args: Vec<OsString> = vec!["-a".into(), self.artifact_path(entry).into_os_string()];
        run_text(&self.tool("objdump"), &args)
    }

    fn stack_sizes_section(&self, entry: &str) -> Result<Vec<u8>, ToolchainError> {
        // The temporary file is removed when it goes out of scope, on every path.
        let section = tempfile::NamedTempFile::new()
            .map_err(|source| ToolchainError::Io { path: std::env::temp_dir(), source })?;
        let args: Vec<OsString> = vec![
            "-O".into(),
            "binary".into(),
            "--only-section=.stack_sizes".into(),
            "--set-section-flags".into(),
            ".stack_sizes=alloc".into(),
            self.artifact_path(entry).into_os_string(),
            section.path().as_os_str().to_os_string(),
        ];
        run_capture(&self.tool("objcopy"), &args)?;
        fs::read(section.path())
            .map_err(|source| ToolchainError::Io { path: section.path().to_path_buf(), source })
    }

    fn name(&self) -> &'static str {
        "binutils"
    }
}

fn run_capture(program: &str, args: &[OsString]) -> Result<Vec<u8>, ToolchainError> {
    debug!("running {program} {args:?}");
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| ToolchainError::Spawn { program: program.to_string(), source })?;
    if !output.status.success() {
        return Err(ToolchainError::Exit {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}

/// Run a tool whose output is parsed as text; invalid UTF-8 is an error.
fn run_text(program: &str, args: &[OsString]) -> Result<String, ToolchainError> {
    decode_output(program, run_capture(program, args)?)
}

fn decode_output(program: &str, stdout: Vec<u8>) -> Result<String, ToolchainError> {
    String::from_utf8(stdout)
        .map_err(|source| ToolchainError::Utf8 { program: program.to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_names_carry_the_prefix() {
        let toolchain = BinutilsToolchain::new("build", "aarch64-linux-gnu-");
        assert_eq!(toolchain.tool("nm"), "aarch64-linux-gnu-nm");
        assert_eq!(toolchain.artifact_path("lib/a.o"), Path::new("build").join("lib/a.o"));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = run_capture("build-stats-no-such-program", &[]).unwrap_err();
        assert!(matches!(err, ToolchainError::Spawn { .. }), "unexpected error: {err}");
    }

    #[test]
    fn non_utf8_output_is_rejected() {
        let err = decode_output("nm", b"caf\xe9 T 0 4\n".to_vec()).unwrap_err();
        assert!(
            matches!(err, ToolchainError::Utf8 { ref program, .. } if program == "nm"),
            "unexpected error: {err}"
        );
        assert_eq!(decode_output("nm", b"main T 0 4\n".to_vec()).unwrap(), "main T 0 4\n");
    }

    #[test]
    fn missing_ninja_fails_target_command() {
        let toolchain = BinutilsToolchain::new("build", "").with_ninja("build-stats-no-ninja");
        assert!(toolchain.target_command("tool").is_err());
    }
}
