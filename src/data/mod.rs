pub mod coerce;
pub mod dataset;
pub mod loader;

pub use coerce::{coerce_to_numeric, exact_integers, CoerceError, CURRENCY_MARKER};
pub use dataset::{Cell, Column, ColumnKind, Dataset};
pub use loader::{parse_csv, LoadError};
