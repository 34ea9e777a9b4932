//! Core data model for symbols, stack usage and per-object size statistics.
//!
//! Everything here is a read-only snapshot of one invocation's toolchain
//! output:
//! - `Symbol`: one record of a posix-format symbol dump.
//! - `SymbolKind` / `KindCategory`: the kind letter and its closed classification.
//! - `StackEntry`: one decoded `.stack_sizes` pair.
//! - `ObjectStats`: per-object size totals keyed by lowercase kind letter.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic category of a symbol kind letter, independent of binding case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindCategory {
    /// `t`: code.
    Text,
    /// `d`: initialized writable data.
    Data,
    /// `b`: zero-initialized data.
    Bss,
    /// `s`: small data.
    SmallData,
    /// `r`: read-only data.
    ReadOnly,
    /// `n`: read-only data as spelled by some toolchains.
    ReadOnlyAlt,
    /// `w`: weak symbol, usually inline code that was not inlined.
    WeakCode,
    /// `v`: weak object such as a vtable or typeinfo.
    WeakObject,
    /// `u`: unique global, or an undefined import.
    Unique,
    /// `a`: absolute address.
    Absolute,
    /// Any other letter the symbol tool may print.
    Unrecognized,
}

impl KindCategory {
    /// Total mapping from a kind letter (either case) to its category.
    pub fn from_code(code: char) -> Self {
        match code.to_ascii_lowercase() {
            't' => KindCategory::Text,
            'd' => KindCategory::Data,
            'b' => KindCategory::Bss,
            's' => KindCategory::SmallData,
            'r' => KindCategory::ReadOnly,
            'n' => KindCategory::ReadOnlyAlt,
            'w' => KindCategory::WeakCode,
            'v' => KindCategory::WeakObject,
            'u' => KindCategory::Unique,
            'a' => KindCategory::Absolute,
            _ => KindCategory::Unrecognized,
        }
    }

    /// Whether symbols of this category end up in the binary file (`tdnrwvu`).
    pub fn counts_toward_binary(self) -> bool {
        match self {
            KindCategory::Text
            | KindCategory::Data
            | KindCategory::ReadOnly
            | KindCategory::ReadOnlyAlt
            | KindCategory::WeakCode
            | KindCategory::WeakObject
            | KindCategory::Unique => true,
            KindCategory::Bss
            | KindCategory::SmallData
            | KindCategory::Absolute
            | KindCategory::Unrecognized => false,
        }
    }

    /// Whether symbols of this category occupy static RAM (`dbs`).
    pub fn counts_toward_ram(self) -> bool {
        match self {
            KindCategory::Data | KindCategory::Bss | KindCategory::SmallData => true,
            KindCategory::Text
            | KindCategory::ReadOnly
            | KindCategory::ReadOnlyAlt
            | KindCategory::WeakCode
            | KindCategory::WeakObject
            | KindCategory::Unique
            | KindCategory::Absolute
            | KindCategory::Unrecognized => false,
        }
    }

    /// Categories skipped without a warning when classifying a final binary (`ua`).
    pub fn is_ignored(self) -> bool {
        match self {
            KindCategory::Unique | KindCategory::Absolute => true,
            KindCategory::Text
            | KindCategory::Data
            | KindCategory::Bss
            | KindCategory::SmallData
            | KindCategory::ReadOnly
            | KindCategory::ReadOnlyAlt
            | KindCategory::WeakCode
            | KindCategory::WeakObject
            | KindCategory::Unrecognized => false,
        }
    }

    /// Weak symbols are merged by the linker, so only one copy is ever kept.
    pub fn is_weak(self) -> bool {
        matches!(self, KindCategory::WeakCode | KindCategory::WeakObject)
    }

    /// Categories that `.stack_sizes` addresses may resolve to.
    pub fn is_code(self) -> bool {
        matches!(self, KindCategory::Text | KindCategory::WeakCode)
    }

    /// True when the category counts toward at least one size dimension.
    pub fn is_sized(self) -> bool {
        self.counts_toward_binary() || self.counts_toward_ram()
    }
}

/// Single-character kind as printed by the symbol tool.
///
/// Case is significant: lowercase is a local binding, uppercase a global
/// binding of the same category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolKind(char);

impl SymbolKind {
    pub fn new(code: char) -> Self {
        Self(code)
    }

    /// The letter exactly as printed.
    pub fn code(self) -> char {
        self.0
    }

    /// The lowercase letter used as the size map key.
    pub fn folded(self) -> char {
        self.0.to_ascii_lowercase()
    }

    /// Lowercase letters denote local (static) bindings.
    pub fn is_local(self) -> bool {
        self.0 == self.folded()
    }

    pub fn category(self) -> KindCategory {
        KindCategory::from_code(self.0)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One symbol-table record: `name kind [address] [size]`.
///
/// Address and size are absent for undefined symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub address: Option<u64>,
    pub size: Option<u64>,
    pub kind: SymbolKind,
    pub name: String,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: char) -> Self {
        Self { address: None, size: None, kind: SymbolKind::new(kind), name: name.into() }
    }

    pub fn with_address(mut self, address: u64) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// The size when the symbol actually occupies space; zero counts as absent.
    pub fn occupied_size(&self) -> Option<u64> {
        self.size.filter(|size| *size > 0)
    }

    /// Render the record the way `nm --format=posix` prints it.
    pub fn to_posix_line(&self) -> String {
        let mut line = format!("{} {}", self.name, self.kind);
        if let Some(address) = self.address {
            line.push_str(&format!(" {address:016x}"));
            if let Some(size) = self.size {
                line.push_str(&format!(" {size:016x}"));
            }
        }
        line
    }
}

/// Stack frame size of the function at `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackEntry {
    pub address: u64,
    pub stack_size: u64,
}

/// Sizes attributed to one object, keyed by lowercase kind letter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectStats {
    pub name: String,
    /// Whether the entry is part of the partition of the final binary.
    /// The final binary itself and namespace slices are not.
    pub counts_toward_partition: bool,
    pub size_by_kind: BTreeMap<char, u64>,
}

impl ObjectStats {
    pub fn new(
        name: impl Into<String>,
        counts_toward_partition: bool,
        size_by_kind: BTreeMap<char, u64>,
    ) -> Self {
        Self { name: name.into(), counts_toward_partition, size_by_kind }
    }

    pub fn is_empty(&self) -> bool {
        self.size_by_kind.is_empty()
    }

    /// Plain sum over every kind, regardless of classification.
    pub fn total_size(&self) -> u64 {
        self.size_by_kind.values().sum()
    }

    pub fn size_of(&self, kind: char) -> u64 {
        self.size_by_kind.get(&kind).copied().unwrap_or(0)
    }
}
