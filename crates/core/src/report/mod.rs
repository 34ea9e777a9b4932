//! Report assembly: joins attributed sizes with resolved stack usage.
//!
//! The serialized form of a whole run is
//! `{ "<target>": { "build": [ObjectStats...], "stack": { "<name>": size } } }`
//! with `stack` ordered by descending stack size.

pub mod render;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::analysis::{Attribution, KindWarning};
use crate::model::{ObjectStats, StackEntry, Symbol};
use crate::{StatsError, StatsResult};

/// Stack usage per function name, largest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackTable {
    entries: Vec<(String, u64)>,
}

impl StackTable {
    /// Resolve decoded entries to names using the final binary's code and
    /// weak-code symbols.
    ///
    /// When several symbols share an address the last one wins; when two
    /// entries resolve to the same name the larger one is kept.
    pub fn resolve(entries: &[StackEntry], binary_symbols: &[Symbol]) -> StatsResult<Self> {
        let mut by_address: HashMap<u64, &Symbol> = HashMap::new();
        for sym in binary_symbols.iter().filter(|sym| sym.kind.category().is_code()) {
            if let Some(address) = sym.address {
                by_address.insert(address, sym);
            }
        }

        let mut sorted = entries.to_vec();
        sorted.sort_by(|a, b| b.stack_size.cmp(&a.stack_size));

        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(sorted.len());
        for entry in sorted {
            let sym = by_address.get(&entry.address).ok_or(
                StatsError::DanglingStackSizeAddress {
                    address: entry.address,
                    stack_size: entry.stack_size,
                },
            )?;
            if seen.insert(sym.name.as_str()) {
                resolved.push((sym.name.clone(), entry.stack_size));
            }
        }
        Ok(Self { entries: resolved })
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, size)| *size)
    }
}

impl Serialize for StackTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, size) in &self.entries {
            map.serialize_entry(name, size)?;
        }
        map.end()
    }
}

/// Everything reported for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    #[serde(skip)]
    pub target: String,
    /// Final binary, namespace slices, then contributing objects in link order.
    pub build: Vec<ObjectStats>,
    pub stack: StackTable,
    #[serde(skip)]
    pub warnings: Vec<KindWarning>,
}

impl TargetReport {
    /// Join an attribution with its stack table. Objects that were credited
    /// nothing are left out of the rows.
    pub fn assemble(attribution: Attribution, stack: StackTable) -> Self {
        let Attribution { binary, namespaces, objects, warnings } = attribution;
        let target = binary.name.clone();
        let mut build = Vec::with_capacity(1 + namespaces.len() + objects.len());
        build.push(binary);
        build.extend(namespaces);
        build.extend(objects.into_iter().filter(|obj| !obj.is_empty()));
        Self { target, build, stack, warnings }
    }

    pub fn summary(&self) -> StatsResult<SizeSummary> {
        summarize(&self.build)
    }
}

/// Reports for every target of a run, one per target name, in the order
/// targets were first analyzed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsReport {
    pub targets: Vec<TargetReport>,
}

impl StatsReport {
    /// Add a target's report. A later report for the same target replaces
    /// the earlier one in place.
    pub fn insert(&mut self, report: TargetReport) {
        match self.targets.iter_mut().find(|existing| existing.target == report.target) {
            Some(existing) => *existing = report,
            None => self.targets.push(report),
        }
    }

    pub fn get(&self, target: &str) -> Option<&TargetReport> {
        self.targets.iter().find(|report| report.target == target)
    }

    pub fn to_json(&self) -> StatsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write the JSON document to `path`.
    pub fn save(&self, path: &Path) -> StatsResult<()> {
        let json = self.to_json()?;
        fs::write(path, json)
            .map_err(|source| StatsError::Io { path: path.to_path_buf(), source })
    }
}

impl Serialize for StatsReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.targets.len()))?;
        for report in &self.targets {
            map.serialize_entry(&report.target, report)?;
        }
        map.end()
    }
}

/// Binary and static-RAM size of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeRow {
    pub name: String,
    pub binary_size: u64,
    pub ram_size: u64,
}

/// Presentation totals for a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSummary {
    pub rows: Vec<SizeRow>,
    /// What the counted objects do not explain: largest row minus their sum.
    pub unknown: SizeRow,
    pub max_binary_size: u64,
    pub max_ram_size: u64,
    pub attributed_binary_size: u64,
    pub attributed_ram_size: u64,
}

/// Split an object's size map into (binary size, static RAM size).
///
/// Data counts toward both. A kind belonging to neither is fatal.
pub fn object_sizes(stats: &ObjectStats) -> StatsResult<(u64, u64)> {
    let mut binary = 0;
    let mut ram = 0;
    for (&kind, &size) in &stats.size_by_kind {
        let category = crate::model::KindCategory::from_code(kind);
        if !category.is_sized() {
            return Err(StatsError::UnclassifiedKind { object: stats.name.clone(), kind });
        }
        if category.counts_toward_binary() {
            binary += size;
        }
        if category.counts_toward_ram() {
            ram += size;
        }
    }
    Ok((binary, ram))
}

pub fn summarize(stats: &[ObjectStats]) -> StatsResult<SizeSummary> {
    let mut rows = Vec::with_capacity(stats.len());
    let mut attributed_binary_size = 0;
    let mut attributed_ram_size = 0;
    for obj in stats {
        let (binary_size, ram_size) = object_sizes(obj)?;
        if obj.counts_toward_partition {
            attributed_binary_size += binary_size;
            attributed_ram_size += ram_size;
        }
        rows.push(SizeRow { name: obj.name.clone(), binary_size, ram_size });
    }

    let max_binary_size = rows.iter().map(|row| row.binary_size).max().unwrap_or(0);
    let max_ram_size = rows.iter().map(|row| row.ram_size).max().unwrap_or(0);
    let unknown = SizeRow {
        name: "-- unknown --".to_string(),
        binary_size: unattributed("binary", max_binary_size, attributed_binary_size)?,
        ram_size: unattributed("static RAM", max_ram_size, attributed_ram_size)?,
    };

    Ok(SizeSummary {
        rows,
        unknown,
        max_binary_size,
        max_ram_size,
        attributed_binary_size,
        attributed_ram_size,
    })
}

fn unattributed(dimension: &'static str, max: u64, attributed: u64) -> StatsResult<u64> {
    max.checked_sub(attributed)
        .ok_or(StatsError::NegativeUnattributedSize { dimension, max, attributed })
}
