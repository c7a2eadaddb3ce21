//! Loose Row Model
//!
//! Rows arrive from the upload collaborator as already-decoded spreadsheet
//! data, one JSON object per row. Cells are untrusted: a numeric column may
//! hold `"3"` or `"three"`, an array column may hold a JSON array, a
//! `"[1,2,3]"` cell, or a bare `"1,2,3"` cell. The readers here coerce the
//! well-formed variants and report the rest, so that validation rules can
//! emit field-level errors instead of panicking.

use serde_json::Value;

/// One decoded spreadsheet row: column name -> cell value.
pub type Row = serde_json::Map<String, Value>;

/// Outcome of reading a single field from a row.
///
/// `Missing` covers both an absent key and an explicit `null`/empty cell —
/// range and array rules skip those (required-column checks own true
/// absence). `Invalid` carries a short description of the malformed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRead<T> {
    /// Field absent, null, or blank.
    Missing,
    /// Field present but not coercible to the declared type.
    Invalid(String),
    /// Field present and well-formed.
    Value(T),
}

impl<T> FieldRead<T> {
    /// Return the value if well-formed, discarding the other states.
    pub fn ok(self) -> Option<T> {
        match self {
            FieldRead::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// An array cell decoded element by element.
///
/// Well-formed elements land in `values` (input order preserved); malformed
/// elements are reported as `(element index, display text)` pairs so rules
/// can point at the exact offender.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArray<T> {
    pub values: Vec<T>,
    pub invalid: Vec<(usize, String)>,
}

/// True when the row has a non-null, non-blank value for `column`.
pub fn present(row: &Row, column: &str) -> bool {
    match row.get(column) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Read a field as text. Numbers are coerced to their display form since
/// spreadsheet decoders frequently type id cells as numbers.
pub fn text_field(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a field as a finite number, coercing numeric strings.
pub fn number_field(row: &Row, column: &str) -> FieldRead<f64> {
    if !present(row, column) {
        return FieldRead::Missing;
    }
    match row.get(column) {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f.is_finite() => FieldRead::Value(f),
            _ => FieldRead::Invalid(n.to_string()),
        },
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => FieldRead::Value(f),
            _ => FieldRead::Invalid(s.trim().to_string()),
        },
        Some(other) => FieldRead::Invalid(display_cell(other)),
        None => FieldRead::Missing,
    }
}

/// Read a field as an integer. Fractional values are invalid, not rounded.
pub fn integer_field(row: &Row, column: &str) -> FieldRead<i64> {
    match number_field(row, column) {
        FieldRead::Missing => FieldRead::Missing,
        FieldRead::Invalid(raw) => FieldRead::Invalid(raw),
        FieldRead::Value(f) => {
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                FieldRead::Value(f as i64)
            } else {
                FieldRead::Invalid(f.to_string())
            }
        }
    }
}

/// Read an array-of-strings field.
///
/// Accepts a JSON array, a `"[...]"` cell, or a delimited `"a, b, c"` cell.
pub fn string_array(row: &Row, column: &str) -> FieldRead<ParsedArray<String>> {
    match array_cell(row, column) {
        FieldRead::Missing => FieldRead::Missing,
        FieldRead::Invalid(raw) => FieldRead::Invalid(raw),
        FieldRead::Value(elements) => {
            let mut parsed = ParsedArray::default();
            for (i, element) in elements.iter().enumerate() {
                match element {
                    Value::String(s) if !s.trim().is_empty() => {
                        parsed.values.push(s.trim().to_string());
                    }
                    Value::Number(n) => parsed.values.push(n.to_string()),
                    other => parsed.invalid.push((i, display_cell(other))),
                }
            }
            FieldRead::Value(parsed)
        }
    }
}

/// Read an array-of-integers field.
///
/// Numeric strings are coerced; NaN, infinities, and fractional values are
/// reported as invalid elements.
pub fn number_array(row: &Row, column: &str) -> FieldRead<ParsedArray<i64>> {
    match array_cell(row, column) {
        FieldRead::Missing => FieldRead::Missing,
        FieldRead::Invalid(raw) => FieldRead::Invalid(raw),
        FieldRead::Value(elements) => {
            let mut parsed = ParsedArray::default();
            for (i, element) in elements.iter().enumerate() {
                match coerce_integer(element) {
                    Some(n) => parsed.values.push(n),
                    None => parsed.invalid.push((i, display_cell(element))),
                }
            }
            FieldRead::Value(parsed)
        }
    }
}

/// Decode an array-shaped cell into raw JSON elements.
///
/// A blank cell and an empty array both read as an empty element list.
fn array_cell(row: &Row, column: &str) -> FieldRead<Vec<Value>> {
    match row.get(column) {
        None | Some(Value::Null) => FieldRead::Missing,
        Some(Value::Array(items)) => FieldRead::Value(items.clone()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return FieldRead::Missing;
            }
            if trimmed.starts_with('[') {
                // A JSON array serialized into the cell
                match serde_json::from_str::<Value>(trimmed) {
                    Ok(Value::Array(items)) => FieldRead::Value(items),
                    _ => FieldRead::Invalid(trimmed.to_string()),
                }
            } else {
                // Bare delimited list: "a, b, c" / "1,2,3"
                let items = trimmed
                    .split(',')
                    .map(|part| Value::String(part.trim().to_string()))
                    .filter(|v| v.as_str().map(|s| !s.is_empty()).unwrap_or(true))
                    .collect();
                FieldRead::Value(items)
            }
        }
        Some(other) => FieldRead::Invalid(display_cell(other)),
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            let f = n.as_f64()?;
            if f.is_finite() && f.fract() == 0.0 {
                Some(f as i64)
            } else {
                None
            }
        }
        Value::String(s) => {
            let f = s.trim().parse::<f64>().ok()?;
            if f.is_finite() && f.fract() == 0.0 {
                Some(f as i64)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Short display form of a cell for error messages.
fn display_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
