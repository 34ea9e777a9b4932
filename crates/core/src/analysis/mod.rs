//! Size attribution engine.
//!
//! Statically linked objects built with `-ffunction-sections` and linked
//! with `--gc-sections` only contribute the symbols the linker kept. This
//! module works out which part of the final binary each object accounts
//! for:
//! - classify the final binary's symbols into the `used` name set,
//! - attribute each object's symbols against a consumable copy of that set,
//! - re-slice the final binary by specialization namespace for visibility.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{ObjectStats, Symbol};

/// Namespaces holding per-instruction-set copies of SIMD code.
pub const SIMD_NAMESPACES: [&str; 7] =
    ["N_SCALAR", "N_WASM", "N_NEON", "N_PPC8", "N_SSE4", "N_AVX2", "N_AVX3"];

/// Prefix used for namespace rows in reports.
pub const NAMESPACE_ROW_PREFIX: &str = "\\--> ";

/// A final-binary symbol whose kind is neither sized nor ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindWarning {
    pub kind: char,
    pub name: String,
}

impl fmt::Display for KindWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown: {} {}", self.kind, self.name)
    }
}

/// Names the final binary retained, plus the symbols that could not be classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub used: HashSet<String>,
    pub warnings: Vec<KindWarning>,
}

/// Collect the names of every sized final-binary symbol that occupies
/// binary or static-RAM space. Undefined imports carry no size and never
/// reach the kind check.
pub fn classify_final_symbols(symbols: &[Symbol]) -> Classification {
    let mut classification = Classification::default();
    for sym in symbols {
        if sym.occupied_size().is_none() {
            continue;
        }
        let category = sym.kind.category();
        if category.is_sized() {
            classification.used.insert(sym.name.clone());
        } else if category.is_ignored() {
            continue;
        } else {
            let warning = KindWarning { kind: sym.kind.code(), name: sym.name.clone() };
            classification.warnings.push(warning);
        }
    }
    classification
}

/// Sum every sized symbol per lowercase kind, without any filtering.
pub fn target_size(symbols: &[Symbol]) -> BTreeMap<char, u64> {
    let mut sizes = BTreeMap::new();
    for sym in symbols {
        if let Some(size) = sym.occupied_size() {
            *sizes.entry(sym.kind.folded()).or_insert(0) += size;
        }
    }
    sizes
}

/// Names the final binary kept that have not yet been credited to an object.
///
/// One filter is shared by every object of a target, in link order. Local
/// and weak symbols are removed once credited, since the linker keeps a
/// single copy; plain globals stay, a duplicate global would not link.
/// The result is order-sensitive: the first object defining a weak symbol
/// gets the credit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolFilter {
    remaining: HashSet<String>,
}

impl SymbolFilter {
    pub fn new(used: &HashSet<String>) -> Self {
        Self { remaining: used.clone() }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.remaining.contains(name)
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Credit one object's symbols, consuming the names merged by the linker.
    pub fn attribute(&mut self, symbols: &[Symbol]) -> BTreeMap<char, u64> {
        let mut sizes = BTreeMap::new();
        for sym in symbols {
            let Some(size) = sym.occupied_size() else { continue };
            if !self.remaining.contains(&sym.name) {
                continue;
            }
            if sym.kind.is_local() || sym.kind.category().is_weak() {
                self.remaining.remove(&sym.name);
            }
            *sizes.entry(sym.kind.folded()).or_insert(0) += size;
        }
        sizes
    }
}

/// Attribute every object, in the given order, against one shared filter.
///
/// Returns one counted `ObjectStats` per object, including empty ones.
pub fn attribute_objects<'a, I>(used: &HashSet<String>, objects: I) -> Vec<ObjectStats>
where
    I: IntoIterator<Item = (&'a str, &'a [Symbol])>,
{
    let mut filter = SymbolFilter::new(used);
    objects
        .into_iter()
        .map(|(name, symbols)| ObjectStats::new(name, true, filter.attribute(symbols)))
        .collect()
}

/// The mangled fragment of a namespace tag, e.g. `N_AVX2` -> `6N_AVX2`.
pub fn mangled_marker(tag: &str) -> String {
    format!("{}{}", tag.len(), tag)
}

/// Re-slice the final binary by namespace. Slices never count toward the
/// partition; their symbols are already part of the final binary entry.
pub fn split_namespaces<S: AsRef<str>>(symbols: &[Symbol], namespaces: &[S]) -> Vec<ObjectStats> {
    let mut slices = Vec::new();
    for tag in namespaces {
        let tag = tag.as_ref();
        let marker = mangled_marker(tag);
        if !symbols.iter().any(|sym| sym.name.contains(&marker)) {
            continue;
        }
        let mut sizes = BTreeMap::new();
        for sym in symbols.iter().filter(|sym| sym.name.contains(&marker)) {
            if let Some(size) = sym.occupied_size() {
                *sizes.entry(sym.kind.folded()).or_insert(0) += size;
            }
        }
        if sizes.is_empty() {
            continue;
        }
        slices.push(ObjectStats::new(format!("{NAMESPACE_ROW_PREFIX}{tag}"), false, sizes));
    }
    slices
}

/// Everything the engine derives for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    /// The final binary's own totals, the ground truth.
    pub binary: ObjectStats,
    pub namespaces: Vec<ObjectStats>,
    /// One entry per contributing object, in attribution order.
    pub objects: Vec<ObjectStats>,
    pub warnings: Vec<KindWarning>,
}

/// Run the three attribution steps for one target.
pub fn attribute_target<'a, I, S>(
    target: &str,
    binary_symbols: &[Symbol],
    objects: I,
    namespaces: &[S],
) -> Attribution
where
    I: IntoIterator<Item = (&'a str, &'a [Symbol])>,
    S: AsRef<str>,
{
    let classification = classify_final_symbols(binary_symbols);
    Attribution {
        binary: ObjectStats::new(target, false, target_size(binary_symbols)),
        namespaces: split_namespaces(binary_symbols, namespaces),
        objects: attribute_objects(&classification.used, objects),
        warnings: classification.warnings,
    }
}
