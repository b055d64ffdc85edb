//! CSV encoding for table backups.
//!
//! Quoting is type-driven rather than content-driven: every text cell is
//! quoted (with embedded quotes doubled), numbers and booleans are written
//! bare, and nulls are empty. The first row fixes the column set.

use serde_json::Number;

use crate::table::{CellValue, TableRow};

/// Encode rows as a CSV document.
///
/// Lines are joined with `\n` and there is no trailing newline. An empty
/// slice produces an empty string with no header.
pub fn to_csv(rows: &[TableRow]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let columns: Vec<&str> = first.keys().collect();
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(columns.join(","));

    for row in rows {
        let fields: Vec<String> = columns
            .iter()
            .map(|col| row.get(col).map(encode_cell).unwrap_or_default())
            .collect();
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

fn encode_cell(value: &CellValue) -> String {
    match value {
        CellValue::Text(s) => format!("\"{}\"", s.replace('"', "\"\"")),
        CellValue::Number(n) => number_text(n),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Null => String::new(),
    }
}

/// Whole floats print without a fractional part (`50.00` → `50`). Values at
/// or beyond 1e21 keep exponent form.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{f:.0}")
            }
        }
        _ => n.to_string(),
    }
}
