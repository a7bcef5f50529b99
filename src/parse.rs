//! Defensive cell parsing.
//!
//! Remote cells are free text; a damaged cell must degrade to a default
//! value instead of failing the whole table read. This module is the
//! documented contract for that coercion: numbers fall back to 0/0.0,
//! flags fall back to false. Callers that need strictness validate before
//! writing, not after reading.

/// Parses a numeric cell, coercing anything unparseable to `default`.
pub fn float_or(cell: &str, default: f64) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(default)
}

/// Parses an integer cell, coercing anything unparseable to `default`.
pub fn int_or(cell: &str, default: i64) -> i64 {
    let trimmed = cell.trim();
    trimmed
        .parse::<i64>()
        // Unformatted numeric reads can surface integers as "3.0".
        .or_else(|_| trimmed.parse::<f64>().map(|f| f as i64))
        .unwrap_or(default)
}

/// Parses a 0/1 flag cell, coercing anything unparseable to `default`.
///
/// Accepts the spellings a spreadsheet tends to accumulate: "1"/"0",
/// "true"/"false" (any case).
pub fn flag_or(cell: &str, default: bool) -> bool {
    match cell.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => true,
        "0" | "false" | "" => false,
        other => other.parse::<f64>().map(|f| f != 0.0).unwrap_or(default),
    }
}

/// Serializes a flag the way the tables store it.
pub fn flag_cell(value: bool) -> String {
    if value { "1".into() } else { "0".into() }
}
