use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};

use super::build_command::resolve_link_command;
use super::toolchains::Toolchain;
use crate::analysis::{attribute_target, SIMD_NAMESPACES};
use crate::model::Symbol;
use crate::report::{StackTable, StatsReport, TargetReport};
use crate::stack_sizes::{decode_stack_sizes, file_format_descriptor, PointerWidth};
use crate::symbols::parse_symbols;
use crate::StatsResult;

/// Runs the size statistics pipeline for one or more targets.
///
/// Targets are analyzed one after the other. Parsed object symbols are
/// cached by build-relative path for the whole run, so objects shared by
/// several targets are only dumped once.
pub struct SizeStats<'a> {
    toolchain: &'a dyn Toolchain,
    namespaces: Vec<String>,
    symbol_cache: HashMap<String, Vec<Symbol>>,
}

impl<'a> SizeStats<'a> {
    pub fn new(toolchain: &'a dyn Toolchain) -> Self {
        Self {
            toolchain,
            namespaces: SIMD_NAMESPACES.iter().map(|ns| ns.to_string()).collect(),
            symbol_cache: HashMap::new(),
        }
    }

    pub fn with_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Number of distinct objects parsed so far in this run.
    pub fn cached_objects(&self) -> usize {
        self.symbol_cache.len()
    }

    /// Analyze every target in order; the first failure aborts the run.
    /// Repeated targets keep the last analysis.
    pub fn run<I, S>(&mut self, targets: I) -> StatsResult<StatsReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = StatsReport::default();
        for target in targets {
            report.insert(self.analyze_target(target.as_ref())?);
        }
        Ok(report)
    }

    /// Analyze one target. Errors are wrapped with the target name.
    pub fn analyze_target(&mut self, target: &str) -> StatsResult<TargetReport> {
        self.analyze(target).map_err(|e| e.in_target(target))
    }

    fn analyze(&mut self, target: &str) -> StatsResult<TargetReport> {
        info!("analyzing {target} with the {} toolchain", self.toolchain.name());
        let link = resolve_link_command(self.toolchain, target)?;
        for entry in &link.objects {
            self.load_object(entry)?;
        }

        let binary_dump = self.toolchain.symbol_dump(&link.output)?;
        let binary_symbols = parse_symbols(&link.output, &binary_dump)?;

        let format = self.toolchain.file_format(&link.output)?;
        let width = PointerWidth::from_descriptor(file_format_descriptor(&format)?)?;
        let section = self.toolchain.stack_sizes_section(&link.output)?;
        let stack = StackTable::resolve(&decode_stack_sizes(&section, width)?, &binary_symbols)?;

        let objects = link.objects.iter().map(|entry| {
            let symbols = self.symbol_cache.get(entry).map(Vec::as_slice).unwrap_or_default();
            (object_name(entry), symbols)
        });
        let attribution = attribute_target(&link.target, &binary_symbols, objects, &self.namespaces);
        debug!(
            "{}: {} objects, {} stack entries, {} unknown kinds",
            link.target,
            attribution.objects.len(),
            stack.len(),
            attribution.warnings.len()
        );
        Ok(TargetReport::assemble(attribution, stack))
    }

    fn load_object(&mut self, entry: &str) -> StatsResult<()> {
        if self.symbol_cache.contains_key(entry) {
            return Ok(());
        }
        debug!("loading symbols of {entry}");
        let dump = self.toolchain.symbol_dump(entry)?;
        let symbols = parse_symbols(entry, &dump)?;
        self.symbol_cache.insert(entry.to_string(), symbols);
        Ok(())
    }
}

/// Objects are reported by file name only.
fn object_name(entry: &str) -> &str {
    Path::new(entry).file_name().and_then(|name| name.to_str()).unwrap_or(entry)
}
