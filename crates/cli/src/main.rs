use std::path::PathBuf;

use anyhow::Result;
use build_stats::commands::{size_stats_command, StatsArgs};
use clap::Parser;

/// Estimate how much of a linked binary each static object accounts for.
///
/// Objects are credited only for the symbols the linker kept, with weak and
/// local duplicates counted once. Functions with large stack frames are
/// listed from the `.stack_sizes` section (clang `-fstack-size-section`).
#[derive(Parser, Debug)]
#[command(name = "build-stats", version, about, long_about = None)]
struct Cli {
    /// Target(s) to analyze.
    #[arg(required = true, num_args = 1..)]
    targets: Vec<String>,

    /// Config file (.json, .yaml or .yml); flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the build directory.
    #[arg(long)]
    build_dir: Option<PathBuf>,

    /// Prefix for binutils tools, such as `aarch64-linux-gnu-`.
    #[arg(long)]
    binutils: Option<String>,

    /// Program used to query link commands.
    #[arg(long)]
    ninja: Option<String>,

    /// Path to save the stats as a JSON file.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Number of stack entries to print (0 prints all).
    #[arg(long)]
    top_stack: Option<usize>,

    /// Read captured toolchain output from this directory instead of running tools.
    #[arg(long)]
    dumps: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    size_stats_command(&StatsArgs {
        targets: cli.targets,
        config: cli.config,
        build_dir: cli.build_dir,
        binutils: cli.binutils,
        ninja: cli.ninja,
        save: cli.save,
        top_stack: cli.top_stack,
        dumps: cli.dumps,
    })
}
