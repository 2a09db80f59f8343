//! In-memory tables: an ordered index of keys plus named numeric or text columns.
//!
//! This is the data a chart is built from. Rows are addressed by position; the index
//! holds one [`Key`] per row (a timestamp, a number or a category label).

use ahash::AHashSet;
use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Accepted spellings for datetime index values.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a date or datetime in one of the supported spellings.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// One index entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Key {
    Time(NaiveDateTime),
    Number(f64),
    Label(String),
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Time(a), Key::Time(b)) => a == b,
            (Key::Number(a), Key::Number(b)) => a.to_bits() == b.to_bits(),
            (Key::Label(a), Key::Label(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Key::Time(t) => t.hash(state),
            Key::Number(n) => n.to_bits().hash(state),
            Key::Label(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Key::Number(n) => write!(f, "{n}"),
            Key::Label(s) => f.write_str(s),
        }
    }
}

impl Key {
    /// Render for labels; timestamps use the strftime pattern `dt_format`.
    pub fn display_with(&self, dt_format: &str) -> String {
        match self {
            Key::Time(t) => t.format(dt_format).to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_time(&self) -> bool {
        matches!(self, Key::Time(_))
    }
}

impl From<NaiveDateTime> for Key {
    fn from(t: NaiveDateTime) -> Self {
        Key::Time(t)
    }
}

impl From<NaiveDate> for Key {
    fn from(d: NaiveDate) -> Self {
        Key::Time(d.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<f64> for Key {
    fn from(n: f64) -> Self {
        Key::Number(n)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Label(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Label(s)
    }
}

/// Ordered row keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: Option<String>,
    pub keys: Vec<Key>,
}

impl Index {
    pub fn new(keys: Vec<Key>) -> Self {
        Self { name: None, keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// True for a non-empty index of timestamps only.
    pub fn is_datetime(&self) -> bool {
        !self.keys.is_empty() && self.keys.iter().all(Key::is_time)
    }

    pub fn is_numeric(&self) -> bool {
        !self.keys.is_empty() && self.keys.iter().all(|k| matches!(k, Key::Number(_)))
    }

    /// First row holding `key`.
    pub fn position(&self, key: &Key) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Interpret `text` as a key of this index's type.
    pub fn coerce(&self, text: &str) -> Option<Key> {
        if self.is_datetime() {
            parse_datetime(text).map(Key::Time)
        } else if self.is_numeric() {
            text.trim().parse::<f64>().ok().map(Key::Number)
        } else {
            Some(Key::Label(text.to_string()))
        }
    }
}

/// Column storage. Missing numeric cells are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum Column {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Column::Text(v) => Some(v),
            Column::Numeric(_) => None,
        }
    }

    /// Cell as an index key (numbers become `Key::Number`, text `Key::Label`).
    pub fn key_at(&self, row: usize) -> Option<Key> {
        match self {
            Column::Numeric(v) => v.get(row).map(|n| Key::Number(*n)),
            Column::Text(v) => v.get(row).map(|s| Key::Label(s.clone())),
        }
    }

    fn empty_like(&self, len: usize) -> Column {
        match self {
            Column::Numeric(_) => Column::Numeric(vec![f64::NAN; len]),
            Column::Text(_) => Column::Text(vec![String::new(); len]),
        }
    }

    fn push_from(&mut self, other: Option<&Column>, row: usize) {
        match self {
            Column::Numeric(v) => v.push(
                other
                    .and_then(Column::as_numeric)
                    .and_then(|o| o.get(row).copied())
                    .unwrap_or(f64::NAN),
            ),
            Column::Text(v) => v.push(match other {
                Some(Column::Text(o)) => o.get(row).cloned().unwrap_or_default(),
                Some(Column::Numeric(o)) => o.get(row).map(|n| n.to_string()).unwrap_or_default(),
                None => String::new(),
            }),
        }
    }

    fn select(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(rows.iter().map(|r| v[*r]).collect()),
            Column::Text(v) => Column::Text(rows.iter().map(|r| v[*r].clone()).collect()),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("column {name:?} has {got} rows, index has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("duplicate column {0:?}")]
    DuplicateColumn(String),
}

/// Index plus columns in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    index: Index,
    columns: IndexMap<String, Column>,
}

/// Hashable snapshot of one row, used for duplicate detection.
#[derive(PartialEq, Eq, Hash)]
enum Cell<'a> {
    Num(u64),
    Text(&'a str),
}

impl Table {
    pub fn new(keys: Vec<Key>) -> Self {
        Self {
            index: Index::new(keys),
            columns: IndexMap::new(),
        }
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index.name = Some(name.into());
        self
    }

    /// Builder-style column insertion.
    pub fn with_numeric(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, TableError> {
        self.insert(name.into(), Column::Numeric(values))?;
        Ok(self)
    }

    pub fn with_text(
        mut self,
        name: impl Into<String>,
        values: Vec<String>,
    ) -> Result<Self, TableError> {
        self.insert(name.into(), Column::Text(values))?;
        Ok(self)
    }

    pub fn insert(&mut self, name: String, column: Column) -> Result<(), TableError> {
        if column.len() != self.index.len() {
            return Err(TableError::LengthMismatch {
                name,
                expected: self.index.len(),
                got: column.len(),
            });
        }
        if self.columns.contains_key(&name) {
            return Err(TableError::DuplicateColumn(name));
        }
        self.columns.insert(name, column);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn keys(&self) -> &[Key] {
        &self.index.keys
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        self.column(name).and_then(Column::as_numeric)
    }

    pub fn text(&self, name: &str) -> Option<&[String]> {
        self.column(name).and_then(Column::as_text)
    }

    /// Numeric column looked up case-insensitively.
    pub fn numeric_ci(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, c)| c.as_numeric())
    }

    /// Numeric cell at `(row, column)`.
    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        self.numeric(name).and_then(|v| v.get(row).copied())
    }

    /// Last reading of a numeric column.
    pub fn last_value(&self, name: &str) -> Option<f64> {
        self.numeric(name).and_then(|v| v.last().copied())
    }

    /// Rows at the given positions, in that order.
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            index: Index {
                name: self.index.name.clone(),
                keys: rows.iter().map(|r| self.index.keys[*r].clone()).collect(),
            },
            columns: self
                .columns
                .iter()
                .map(|(k, c)| (k.clone(), c.select(rows)))
                .collect(),
        }
    }

    /// Distinct values of a column, sorted. Numeric columns are rendered as text.
    pub fn group_values(&self, name: &str) -> Vec<String> {
        let mut out: Vec<String> = match self.column(name) {
            Some(Column::Text(v)) => v.clone(),
            Some(Column::Numeric(v)) => v.iter().map(|n| n.to_string()).collect(),
            None => return Vec::new(),
        };
        out.sort();
        out.dedup();
        out
    }

    /// Rows whose `name` cell equals `value` (as rendered by [`Table::group_values`]).
    pub fn filter_eq(&self, name: &str, value: &str) -> Table {
        let rows: Vec<usize> = match self.column(name) {
            Some(Column::Text(v)) => (0..v.len()).filter(|i| v[*i] == value).collect(),
            Some(Column::Numeric(v)) => (0..v.len())
                .filter(|i| v[*i].to_string() == value)
                .collect(),
            None => Vec::new(),
        };
        self.select_rows(&rows)
    }

    fn row_cells(&self, row: usize) -> (&Key, Vec<Cell<'_>>) {
        let cells = self
            .columns
            .values()
            .map(|c| match c {
                Column::Numeric(v) => Cell::Num(v[row].to_bits()),
                Column::Text(v) => Cell::Text(v[row].as_str()),
            })
            .collect();
        (&self.index.keys[row], cells)
    }

    /// Drop rows that repeat an earlier row exactly (key and every cell).
    pub fn drop_duplicates(&mut self) {
        let keep: Vec<usize> = {
            let mut seen = AHashSet::with_capacity(self.len());
            (0..self.len())
                .filter(|r| seen.insert(self.row_cells(*r)))
                .collect()
        };
        if keep.len() != self.len() {
            *self = self.select_rows(&keep);
        }
    }

    /// Append `other`'s rows (union of columns), then drop exact duplicates.
    pub fn append_dedup(&mut self, other: &Table) {
        let old_len = self.len();
        for (name, col) in &other.columns {
            if !self.columns.contains_key(name) {
                self.columns.insert(name.clone(), col.empty_like(old_len));
            }
        }
        for row in 0..other.len() {
            self.index.keys.push(other.index.keys[row].clone());
            for (name, col) in self.columns.iter_mut() {
                col.push_from(other.columns.get(name), row);
            }
        }
        if self.index.name.is_none() {
            self.index.name = other.index.name.clone();
        }
        self.drop_duplicates();
    }
}
