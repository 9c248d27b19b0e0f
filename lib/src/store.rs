use std::collections::BTreeMap;

use crate::types::Id;

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
    Absent,
}

impl RawValue {
    /// Parses a single table cell, preferring integers over floats.
    pub fn parse(field: &[u8]) -> Self {
        let field = trim_ascii(field);

        if field.is_empty() {
            return RawValue::Absent;
        }

        if let Ok(v) = btoi::btoi::<i64>(field) {
            return RawValue::Int(v);
        }

        let text = String::from_utf8_lossy(field);
        if let Ok(v) = text.parse::<f64>() {
            if v.is_finite() {
                return RawValue::Float(v);
            }
        }

        RawValue::Text(text.into_owned())
    }

    /// Numeric cells as an integer; floats are truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Int(v) => Some(*v),
            RawValue::Float(v) => Some(v.trunc() as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn trim_ascii(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if first.is_ascii_whitespace() {
            bytes = rest;
        } else {
            break;
        }
    }
    while let [rest @ .., last] = bytes {
        if last.is_ascii_whitespace() {
            bytes = rest;
        } else {
            break;
        }
    }
    bytes
}

/// Column-oriented access to per-record raw values, as produced by
/// whatever loaded the tables.
pub trait DataStore {
    fn raw_value(&self, column: usize, record: Id) -> RawValue;

    fn records(&self) -> Box<dyn Iterator<Item = Id> + '_>;
}

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    rows: BTreeMap<Id, Vec<RawValue>>,
}

impl RawTable {
    pub fn insert_row(&mut self, record: Id, row: Vec<RawValue>) {
        self.rows.insert(record, row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl DataStore for RawTable {
    fn raw_value(&self, column: usize, record: Id) -> RawValue {
        self.rows
            .get(&record)
            .and_then(|row| row.get(column))
            .cloned()
            .unwrap_or(RawValue::Absent)
    }

    fn records(&self) -> Box<dyn Iterator<Item = Id> + '_> {
        Box::new(self.rows.keys().copied())
    }
}
