//! Plain-text tables for size summaries and stack usage.

use std::io::{self, Write};

use super::{SizeRow, SizeSummary, StackTable};

/// Write the size table: one row per entry, then the `-- unknown --` row.
pub fn write_size_table<W: Write>(out: &mut W, summary: &SizeSummary) -> io::Result<()> {
    writeln!(out, "{:<32} {:>17} {:>17}", "Object name", "Binary size", "Static RAM size")?;
    for row in summary.rows.iter().chain(std::iter::once(&summary.unknown)) {
        write_size_row(out, row, summary)?;
    }
    writeln!(out)
}

fn write_size_row<W: Write>(out: &mut W, row: &SizeRow, summary: &SizeSummary) -> io::Result<()> {
    writeln!(
        out,
        "{:<32} {:>8} ({:>5.1}%) {:>8} ({:>5.1}%)",
        row.name,
        row.binary_size,
        percent(row.binary_size, summary.max_binary_size),
        row.ram_size,
        percent(row.ram_size, summary.max_ram_size),
    )
}

fn percent(size: u64, max: u64) -> f64 {
    if max == 0 {
        0.0
    } else {
        100.0 * size as f64 / max as f64
    }
}

/// Write the largest stack frames. `top_entries == 0` prints all of them.
/// An empty table prints nothing.
pub fn write_stack_table<W: Write>(
    out: &mut W,
    stack: &StackTable,
    top_entries: usize,
) -> io::Result<()> {
    if stack.is_empty() {
        return Ok(());
    }
    let limit = if top_entries == 0 { stack.len() } else { top_entries };
    writeln!(out, " Stack   Symbol name")?;
    for (name, size) in stack.entries().iter().take(limit) {
        writeln!(out, "{size:>8} {name}")?;
    }
    writeln!(out)
}
