//! Tabular result returned by an upstream quote source.
//!
//! A [`Frame`] is an ordered list of named columns of equal length plus a row
//! index. It is deliberately loose: column names are whatever the upstream
//! emitted, and cells carry their own type. Interpreting the columns is the
//! job of `quote.rs`; this module only guarantees the rectangular shape.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A single value in a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Render the cell as text.
    ///
    /// Dates are `YYYY-MM-DD`, datetimes `YYYY-MM-DD HH:MM:SS`. Floats use
    /// Rust's shortest round-trip form: ordinary values keep a fractional part
    /// (`10.0`), large ones switch to `1e16`, and NaN is `NaN`. Null is `None`
    /// whatever the column holds.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Null => "None".to_string(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => format!("{v:?}"),
            Cell::Text(s) => s.clone(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Numeric view of the cell, if it has one.
    ///
    /// Text is accepted when it parses as a float; dates and nulls are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Null | Cell::Date(_) | Cell::DateTime(_) => None,
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<NaiveDate> for Cell {
    fn from(v: NaiveDate) -> Self {
        Cell::Date(v)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(v: NaiveDateTime) -> Self {
        Cell::DateTime(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Shape errors raised while building a [`Frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A column's length differs from the first column's length.
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
    /// A row has a different number of cells than there are column names.
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// The index length differs from the row count.
    IndexLength { expected: usize, actual: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::RaggedColumn {
                column,
                expected,
                actual,
            } => write!(
                f,
                "column '{column}' has {actual} values, expected {expected}"
            ),
            FrameError::RaggedRow {
                row,
                expected,
                actual,
            } => write!(f, "row {row} has {actual} cells, expected {expected}"),
            FrameError::IndexLength { expected, actual } => {
                write!(f, "index has {actual} labels, expected {expected}")
            }
        }
    }
}

impl std::error::Error for FrameError {}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Rectangular table of named columns plus a row index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    index: Vec<Cell>,
    columns: Vec<Column>,
}

impl Frame {
    /// Build a frame from columns, with a positional `0..n` index.
    pub fn new(columns: Vec<Column>) -> Result<Self, FrameError> {
        let rows = check_columns(&columns)?;
        let index = (0..rows as i64).map(Cell::Int).collect();
        Ok(Self { index, columns })
    }

    /// Build a frame from column names and row-major cells.
    pub fn from_rows<S: AsRef<str>>(names: &[S], rows: Vec<Vec<Cell>>) -> Result<Self, FrameError> {
        let mut columns: Vec<Column> = names
            .iter()
            .map(|n| Column::new(n.as_ref(), Vec::with_capacity(rows.len())))
            .collect();

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(FrameError::RaggedRow {
                    row: i,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
            for (col, cell) in columns.iter_mut().zip(row) {
                col.values.push(cell);
            }
        }

        Self::new(columns)
    }

    /// An empty frame that still carries the given column names.
    pub fn empty<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            index: Vec::new(),
            columns: names
                .iter()
                .map(|n| Column::new(n.as_ref(), Vec::new()))
                .collect(),
        }
    }

    /// Replace the positional index with explicit labels.
    pub fn with_index(mut self, index: Vec<Cell>) -> Result<Self, FrameError> {
        if index.len() != self.len() {
            return Err(FrameError::IndexLength {
                expected: self.len(),
                actual: index.len(),
            });
        }
        self.index = index;
        Ok(self)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[Cell] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Column by exact (case-sensitive) name. The first match wins on duplicates.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Last column in column order.
    pub fn last_column(&self) -> Option<&Column> {
        self.columns.last()
    }

    /// Keep only the rows for which `keep(row_position)` is true.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let mask: Vec<bool> = (0..self.len()).map(&mut keep).collect();
        retain_by_mask(&mut self.index, &mask);
        for col in self.columns.iter_mut() {
            retain_by_mask(&mut col.values, &mask);
        }
    }
}

fn check_columns(columns: &[Column]) -> Result<usize, FrameError> {
    let Some(first) = columns.first() else {
        return Ok(0);
    };
    let expected = first.values.len();
    for col in columns.iter().skip(1) {
        if col.values.len() != expected {
            return Err(FrameError::RaggedColumn {
                column: col.name.clone(),
                expected,
                actual: col.values.len(),
            });
        }
    }
    Ok(expected)
}

fn retain_by_mask(values: &mut Vec<Cell>, mask: &[bool]) {
    let mut i = 0;
    values.retain(|_| {
        let keep = mask[i];
        i += 1;
        keep
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
