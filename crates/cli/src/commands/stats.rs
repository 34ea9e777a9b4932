use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use build_stats_core::config::StatsConfig;
use build_stats_core::report::render::{write_size_table, write_stack_table};
use build_stats_core::report::{StatsReport, TargetReport};
use build_stats_core::services::pipeline::SizeStats;
use build_stats_core::services::toolchains::{BinutilsToolchain, DumpDirToolchain, Toolchain};
use log::info;

use crate::resolve_dir;

/// Command-line overrides for a size statistics run.
#[derive(Debug, Clone, Default)]
pub struct StatsArgs {
    pub targets: Vec<String>,
    pub config: Option<PathBuf>,
    pub build_dir: Option<PathBuf>,
    pub binutils: Option<String>,
    pub ninja: Option<String>,
    pub save: Option<PathBuf>,
    pub top_stack: Option<usize>,
    pub dumps: Option<PathBuf>,
}

/// Load the config file (if any) and apply the command-line overrides.
pub fn load_config(args: &StatsArgs) -> Result<StatsConfig> {
    let mut config = match &args.config {
        Some(path) => StatsConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StatsConfig::default(),
    };
    if let Some(build_dir) = &args.build_dir {
        config.build_dir = build_dir.clone();
    }
    if let Some(binutils) = &args.binutils {
        config.binutils = binutils.clone();
    }
    if let Some(ninja) = &args.ninja {
        config.ninja = ninja.clone();
    }
    if let Some(save) = &args.save {
        config.save = Some(save.clone());
    }
    if let Some(top_stack) = args.top_stack {
        config.top_stack_entries = top_stack;
    }
    if let Some(dumps) = &args.dumps {
        config.dumps = Some(dumps.clone());
    }
    Ok(config)
}

/// Analyze the requested targets and print their tables to stdout.
pub fn size_stats_command(args: &StatsArgs) -> Result<()> {
    let config = load_config(args)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_size_stats(&config, &args.targets, &mut out)?;
    Ok(())
}

/// Analyze `targets` one after the other, writing each target's tables to
/// `out` as soon as it is done, then save the JSON document if configured.
pub fn run_size_stats<W: Write>(
    config: &StatsConfig,
    targets: &[String],
    out: &mut W,
) -> Result<StatsReport> {
    if targets.is_empty() {
        return Err(anyhow!("No targets given"));
    }

    let toolchain: Box<dyn Toolchain> = match &config.dumps {
        Some(dumps) => Box::new(DumpDirToolchain::new(resolve_dir(dumps)?)),
        None => Box::new(
            BinutilsToolchain::new(resolve_dir(&config.build_dir)?, config.binutils.clone())
                .with_ninja(config.ninja.clone()),
        ),
    };
    info!("using the {} toolchain", toolchain.name());

    let mut stats = SizeStats::new(toolchain.as_ref()).with_namespaces(config.namespaces.clone());
    let mut report = StatsReport::default();
    for target in targets {
        let target_report = stats.analyze_target(target)?;
        print_target(out, &target_report, config.top_stack_entries)?;
        report.insert(target_report);
    }

    if let Some(save) = &config.save {
        report.save(save).with_context(|| format!("Failed to save stats to {}", save.display()))?;
        info!("saved stats to {}", save.display());
    }
    Ok(report)
}

/// Print the unknown-kind warnings, size table and stack table of one target.
pub fn print_target<W: Write>(out: &mut W, report: &TargetReport, top_stack: usize) -> Result<()> {
    for warning in &report.warnings {
        writeln!(out, "{warning}")?;
    }
    let summary = report
        .summary()
        .with_context(|| format!("Failed to summarize target {}", report.target))?;
    write_size_table(out, &summary)?;
    write_stack_table(out, &report.stack, top_stack)?;
    Ok(())
}
