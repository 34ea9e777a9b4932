//! Parser for posix-format symbol dumps (`nm --format=posix`).
//!
//! Each line is either an object header ending in `:` (archive members) or a
//! record `name kind [address] [size]` with hexadecimal address and size.

use crate::model::{Symbol, SymbolKind};
use crate::{StatsError, StatsResult};

/// Parse a whole symbol dump. `origin` names the dumped file in errors.
pub fn parse_symbols(origin: &str, text: &str) -> StatsResult<Vec<Symbol>> {
    let mut symbols = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim_end();
        // Blank lines separate archive members in some nm builds.
        if line.is_empty() || line.ends_with(':') {
            continue;
        }
        let symbol = parse_record(line).map_err(|reason| StatsError::MalformedSymbolRecord {
            origin: origin.to_string(),
            line: index + 1,
            text: line.to_string(),
            reason,
        })?;
        symbols.push(symbol);
    }
    Ok(symbols)
}

/// Parse one `name kind [address] [size]` record.
pub fn parse_record(line: &str) -> Result<Symbol, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if !(2..=4).contains(&fields.len()) {
        return Err(format!("expected 2 to 4 fields, found {}", fields.len()));
    }

    let mut kind_chars = fields[1].chars();
    let kind = match (kind_chars.next(), kind_chars.next()) {
        (Some(code), None) => SymbolKind::new(code),
        _ => return Err(format!("kind must be a single character, found {:?}", fields[1])),
    };

    Ok(Symbol {
        address: fields.get(2).map(|field| parse_hex(field)).transpose()?,
        size: fields.get(3).map(|field| parse_hex(field)).transpose()?,
        kind,
        name: fields[0].to_string(),
    })
}

fn parse_hex(field: &str) -> Result<u64, String> {
    u64::from_str_radix(field, 16).map_err(|e| format!("invalid hex value {field:?}: {e}"))
}
