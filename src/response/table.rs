use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

use super::ResponseEnvelope;
use crate::time::from_epoch_seconds;

/// Name of the column holding Unix epoch seconds.
pub const TIME_COLUMN: &str = "time";

/// Separator joining the keys of nested objects into a column name.
const NESTED_SEPARATOR: &str = ".";

/// Stands in for cells missing from a row shorter than the header.
static NULL: Value = Value::Null;

#[derive(Debug, Clone, PartialEq)]
pub enum RowIndex {
    /// Rows are addressed by their position
    Positional,
    /// Rows are addressed by the calendar time of their `time` column
    Time(Vec<DateTime<Utc>>),
}

/// Why a table was left with a positional index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexWarning {
    MissingTimeColumn,
    Unparseable { row: usize, value: String },
}

impl Display for IndexWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexWarning::MissingTimeColumn => {
                write!(f, "no timestamp available, disable the time index")
            }
            IndexWarning::Unparseable { row, value } => {
                write!(f, "row {row} has no usable timestamp: {value}")
            }
        }
    }
}

/// Rows and columns materialized from one response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    /// Every row has exactly one value per column; absent cells are `null`.
    /// Rows built by hand may be shorter, and their missing cells read as `null`.
    pub rows: Vec<Vec<Value>>,
    pub index: RowIndex,
}

impl ResultTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            index: RowIndex::Positional,
        }
    }

    pub fn from_envelope(envelope: ResponseEnvelope) -> Self {
        match envelope {
            ResponseEnvelope::Sparse { rows } => Self::from_records(rows),
            ResponseEnvelope::Columnar { columns, rows, .. } => Self::new(columns, rows),
        }
    }

    /// Normalizes heterogeneous records: the columns are the union of every
    /// record's keys in first-seen order, and nested objects are flattened into
    /// `parent.child` columns.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let flat: Vec<IndexMap<String, Value>> = records
            .into_iter()
            .map(|record| {
                let mut row = IndexMap::new();
                flatten_into(&mut row, None, record);
                row
            })
            .collect();

        let columns: IndexSet<String> = flat.iter().flat_map(|row| row.keys().cloned()).collect();
        let rows = flat
            .into_iter()
            .map(|mut row| {
                columns
                    .iter()
                    .map(|column| row.remove(column).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self::new(columns.into_iter().collect(), rows)
    }

    /// Builds a table from a column name to values mapping. Shorter columns are
    /// padded with `null`.
    pub fn from_column_map(map: IndexMap<String, Vec<Value>>) -> Self {
        let height = map.values().map(Vec::len).max().unwrap_or(0);
        let columns: Vec<String> = map.keys().cloned().collect();
        let mut values: Vec<_> = map.into_values().map(Vec::into_iter).collect();

        let rows = (0..height)
            .map(|_| {
                values
                    .iter_mut()
                    .map(|column| column.next().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self::new(columns, rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let position = self.column_position(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(position).unwrap_or(&NULL))
                .collect(),
        )
    }

    pub fn is_time_indexed(&self) -> bool {
        matches!(self.index, RowIndex::Time(_))
    }

    /// Indexes the rows by their `time` column. On failure the table is left
    /// as it was and the reason is returned; this never aborts shaping.
    pub fn set_time_index(&mut self) -> Result<(), IndexWarning> {
        let position = self
            .column_position(TIME_COLUMN)
            .ok_or(IndexWarning::MissingTimeColumn)?;

        let index = self
            .rows
            .iter()
            .enumerate()
            .map(|(row, values)| {
                let value = values.get(position).unwrap_or(&NULL);
                value
                    .as_f64()
                    .and_then(from_epoch_seconds)
                    .ok_or_else(|| IndexWarning::Unparseable {
                        row,
                        value: value.to_string(),
                    })
            })
            .collect::<Result<_, _>>()?;

        self.index = RowIndex::Time(index);
        Ok(())
    }

    /// Renames columns found in `names`; others keep their name.
    pub fn rename_columns(&mut self, names: &IndexMap<String, String>) {
        for column in self.columns.iter_mut() {
            if let Some(name) = names.get(column) {
                column.clone_from(name);
            }
        }
    }
}

fn flatten_into(row: &mut IndexMap<String, Value>, prefix: Option<&str>, object: Map<String, Value>) {
    for (key, value) in object {
        let key = match prefix {
            Some(prefix) => format!("{prefix}{NESTED_SEPARATOR}{key}"),
            None => key,
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => flatten_into(row, Some(&key), nested),
            value => {
                row.insert(key, value);
            }
        }
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => "NaN".to_owned(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Display for ResultTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<String> = match &self.index {
            RowIndex::Positional => (0..self.rows.len()).map(|i| i.to_string()).collect(),
            RowIndex::Time(index) => index
                .iter()
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .collect(),
        };
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                (0..self.columns.len())
                    .map(|i| render_cell(row.get(i).unwrap_or(&NULL)))
                    .collect()
            })
            .collect();

        let label_width = labels.iter().map(String::len).max().unwrap_or(0);
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                cells
                    .iter()
                    .map(|row| row[i].len())
                    .chain([column.len()])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:label_width$}", "")?;
        for (column, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {column:>width$}")?;
        }
        writeln!(f)?;

        for (label, row) in labels.iter().zip(&cells) {
            write!(f, "{label:label_width$}")?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {cell:>width$}")?;
            }
            writeln!(f)?;
        }

        write!(f, "[{} rows x {} columns]", self.rows.len(), self.columns.len())
    }
}
