use thiserror::Error;

use crate::data::dataset::{Column, Dataset};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("separator {0:?} must be a single Latin-1 character")]
    Separator(String),
    #[error("no columns to parse from file")]
    Empty,
    #[error("expected {expected} fields in line {line}, saw {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Resolve the separator query parameter to the byte the CSV reader splits on.
/// `\t` written out as two characters is accepted as a tab.
///
/// Multi-character separators are not split as patterns; they are rejected
/// here and the upload fails like any other unparseable CSV.
pub fn separator_byte(sep: &str) -> Result<u8, LoadError> {
    if sep == "\\t" {
        return Ok(b'\t');
    }
    let mut chars = sep.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if (c as u32) <= 0xFF => Ok(c as u8),
        _ => Err(LoadError::Separator(sep.to_string())),
    }
}

/// Map every byte to the code point of the same value (ISO-8859-1).
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Parse raw CSV bytes into a typed, column-major dataset.
///
/// The first record is the header. Rows shorter than the header are padded
/// with missing values, longer rows are rejected.
pub fn parse_csv(content: &[u8], sep: &str) -> Result<Dataset, LoadError> {
    let delimiter = separator_byte(sep)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content);

    let mut records = reader.byte_records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Err(LoadError::Empty),
    };
    let columns = unique_names(header.iter().map(decode_latin1).collect());
    let num_cols = columns.len();

    let mut column_data: Vec<Vec<String>> = vec![Vec::new(); num_cols];
    for result in records {
        let record = result?;
        if record.len() > num_cols {
            return Err(LoadError::FieldCount {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: num_cols,
                found: record.len(),
            });
        }
        for (col_idx, col_data) in column_data.iter_mut().enumerate() {
            match record.get(col_idx) {
                Some(field) => col_data.push(decode_latin1(field)),
                None => col_data.push(String::new()),
            }
        }
    }

    let columns = columns
        .into_iter()
        .zip(column_data)
        .map(|(name, raw)| Column::from_raw(name, raw))
        .collect();

    Ok(Dataset::new(columns))
}

/// Suffix repeated header names with `.1`, `.2`, ... so lookups stay unambiguous.
fn unique_names(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        let mut n = 1;
        while out.contains(&candidate) {
            candidate = format!("{name}.{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::{Cell, ColumnKind};

    #[test]
    fn parses_header_and_infers_kinds() {
        let ds = parse_csv(b"PID,Zeitindex,Amount\n1,t1,10\n1,t1,20\n2,t2,5\n", ",").unwrap();
        assert_eq!(ds.row_count(), 3);
        let names: Vec<&str> = ds.column_names().collect();
        assert_eq!(names, ["PID", "Zeitindex", "Amount"]);
        assert_eq!(ds.column("Amount").unwrap().kind, ColumnKind::Integer);
        assert_eq!(ds.column("Zeitindex").unwrap().kind, ColumnKind::Text);
    }

    #[test]
    fn honours_the_separator() {
        let ds = parse_csv(b"PID;Zeitindex;Betrag\n1;2020;3.5\n", ";").unwrap();
        assert!(ds.has_column("Betrag"));
        let tabbed = parse_csv(b"PID\tZeitindex\n1\t2\n", "\\t").unwrap();
        assert!(tabbed.has_column("Zeitindex"));
    }

    #[test]
    fn wrong_separator_yields_a_single_column() {
        let ds = parse_csv(b"PID;Zeitindex;Amount\n1;t1;10\n", ",").unwrap();
        assert_eq!(ds.columns().len(), 1);
        assert!(!ds.has_column("PID"));
    }

    #[test]
    fn decodes_latin1_currency_marker() {
        let ds = parse_csv(b"PID,Zeitindex,Preis\n1,t1,\x8012.50\n", ",").unwrap();
        let col = ds.column("Preis").unwrap();
        assert_eq!(col.cells[0], Cell::Text("\u{80}12.50".to_string()));
    }

    #[test]
    fn pads_short_rows_and_rejects_long_ones() {
        let ds = parse_csv(b"a,b,c\n1,2\n", ",").unwrap();
        assert_eq!(ds.column("c").unwrap().cells, vec![Cell::Missing]);

        let err = parse_csv(b"a,b\n1,2\n1,2,3\n", ",").unwrap_err();
        assert!(matches!(
            err,
            LoadError::FieldCount { line: 3, expected: 2, found: 3 }
        ));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(parse_csv(b"", ","), Err(LoadError::Empty)));
        assert!(matches!(parse_csv(b"\n\n", ","), Err(LoadError::Empty)));
    }

    #[test]
    fn rejects_multi_character_separators() {
        assert!(matches!(parse_csv(b"a,b\n", ",,"), Err(LoadError::Separator(_))));
        assert!(matches!(separator_byte("€"), Err(LoadError::Separator(_))));
        assert!(matches!(separator_byte(";;"), Err(LoadError::Separator(_))));
        assert!(matches!(separator_byte("\\s+"), Err(LoadError::Separator(_))));
        assert_eq!(separator_byte("|").unwrap(), b'|');
    }

    #[test]
    fn duplicate_headers_are_made_unique() {
        let ds = parse_csv(b"x,x,x\n1,2,3\n", ",").unwrap();
        let names: Vec<&str> = ds.column_names().collect();
        assert_eq!(names, ["x", "x.1", "x.2"]);
    }
}
