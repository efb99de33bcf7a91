use std::fmt;

/// Spellings treated as a missing value when a CSV field is read.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single parsed CSV value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

/// Type inferred for a whole column from its non-missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Bool => "bool",
            ColumnKind::Text => "text",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Cell>,
}

impl Column {
    /// Build a column from raw field strings, inferring one kind for all of them.
    pub fn from_raw(name: String, raw: Vec<String>) -> Self {
        let kind = infer_kind(&raw);
        let cells = raw
            .into_iter()
            .map(|value| {
                if is_na(&value) {
                    return Cell::Missing;
                }
                let trimmed = value.trim();
                match kind {
                    ColumnKind::Integer => trimmed.parse().map(Cell::Integer).unwrap_or(Cell::Missing),
                    ColumnKind::Float => trimmed.parse().map(Cell::Float).unwrap_or(Cell::Missing),
                    ColumnKind::Bool => parse_bool(trimmed).map(Cell::Bool).unwrap_or(Cell::Missing),
                    ColumnKind::Text => Cell::Text(value),
                }
            })
            .collect();
        Self { name, kind, cells }
    }

    pub fn has_missing(&self) -> bool {
        self.cells.iter().any(Cell::is_missing)
    }
}

/// In-memory table, column-major like the loader produces it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Self {
        let row_count = columns.first().map(|c| c.cells.len()).unwrap_or(0);
        Self { columns, row_count }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

pub fn is_na(value: &str) -> bool {
    NA_VALUES.contains(&value) || NA_VALUES.contains(&value.trim())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

fn infer_kind(raw: &[String]) -> ColumnKind {
    let present: Vec<&str> = raw
        .iter()
        .filter(|v| !is_na(v))
        .map(|v| v.trim())
        .collect();

    // All-missing columns behave like an empty float column.
    if present.is_empty() {
        return ColumnKind::Float;
    }
    if present.iter().all(|v| v.parse::<i64>().is_ok()) {
        ColumnKind::Integer
    } else if present.iter().all(|v| v.parse::<f64>().is_ok()) {
        ColumnKind::Float
    } else if present.iter().all(|v| parse_bool(v).is_some()) {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn integer_column_keeps_missing_cells() {
        let col = Column::from_raw("n".into(), raw(&["1", "", "3", "NA"]));
        assert_eq!(col.kind, ColumnKind::Integer);
        assert_eq!(
            col.cells,
            vec![Cell::Integer(1), Cell::Missing, Cell::Integer(3), Cell::Missing]
        );
        assert!(col.has_missing());
    }

    #[test]
    fn mixed_integers_and_floats_become_float() {
        let col = Column::from_raw("x".into(), raw(&["1", "2.5", " 3 "]));
        assert_eq!(col.kind, ColumnKind::Float);
        assert_eq!(col.cells[2], Cell::Float(3.0));
    }

    #[test]
    fn boolean_literals_are_recognised() {
        let col = Column::from_raw("flag".into(), raw(&["True", "false", "TRUE"]));
        assert_eq!(col.kind, ColumnKind::Bool);
        assert_eq!(col.cells[1], Cell::Bool(false));
    }

    #[test]
    fn anything_else_is_text_and_kept_verbatim() {
        let col = Column::from_raw("t".into(), raw(&["\u{80}1.50", "2", " x "]));
        assert_eq!(col.kind, ColumnKind::Text);
        assert_eq!(col.cells[2], Cell::Text(" x ".to_string()));
    }

    #[test]
    fn empty_column_is_float() {
        let col = Column::from_raw("e".into(), raw(&["", ""]));
        assert_eq!(col.kind, ColumnKind::Float);
        assert!(col.cells.iter().all(Cell::is_missing));
    }

    #[test]
    fn dataset_lookup_is_case_sensitive() {
        let ds = Dataset::new(vec![Column::from_raw("PID".into(), raw(&["1"]))]);
        assert!(ds.has_column("PID"));
        assert!(!ds.has_column("pid"));
        assert_eq!(ds.row_count(), 1);
    }
}
