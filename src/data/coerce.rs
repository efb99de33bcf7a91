use thiserror::Error;

use crate::data::dataset::Cell;

/// Euro sign as it arrives from a Windows-1252 export read as Latin-1 (byte 0x80).
pub const CURRENCY_MARKER: char = '\u{80}';

#[derive(Debug, Error, PartialEq)]
#[error("value {value:?} in row {row} is not numeric")]
pub struct CoerceError {
    pub row: usize,
    pub value: String,
}

/// Convert a column to floats. Missing cells stay `None`, booleans become 0/1,
/// and text has every `marker` removed before being parsed.
pub fn coerce_to_numeric(values: &[Cell], marker: char) -> Result<Vec<Option<f64>>, CoerceError> {
    values
        .iter()
        .enumerate()
        .map(|(row, cell)| match cell {
            Cell::Missing => Ok(None),
            Cell::Integer(v) => Ok(Some(*v as f64)),
            Cell::Float(v) => Ok(Some(*v)),
            Cell::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
            Cell::Text(s) => {
                let stripped: String = s.chars().filter(|c| *c != marker).collect();
                stripped
                    .trim()
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| CoerceError {
                        row,
                        value: s.clone(),
                    })
            }
        })
        .collect()
}

/// Whole-number view of a gap-free integer or boolean column, or `None` when
/// any cell is missing or of another kind.
pub fn exact_integers(values: &[Cell]) -> Option<Vec<i64>> {
    values
        .iter()
        .map(|cell| match cell {
            Cell::Integer(v) => Some(*v),
            Cell::Bool(b) => Some(i64::from(*b)),
            _ => None,
        })
        .collect()
}
