//! Core data models for reclink
//!
//! These models are shared by the loader, the linkage engine and the
//! reporters. Record collections are loaded once and never mutated.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single record from one source collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identity value from the source (first CSV column)
    pub key: String,
    /// Comparable field values, in the collection's column order
    pub fields: Vec<String>,
}

impl Record {
    pub fn new(key: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            key: key.into(),
            fields,
        }
    }

    /// Field value at a column position (empty string if the row is short)
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }
}

/// An immutable, named collection of records sharing one column layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSet {
    pub name: String,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(name: impl Into<String>, columns: Vec<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            columns,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Position of a column by name (case-insensitive)
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }

    /// Map from record key to its position in this collection.
    ///
    /// On duplicate keys the first occurrence wins.
    pub fn key_index(&self) -> HashMap<&str, usize> {
        let mut index = HashMap::with_capacity(self.records.len());
        for (pos, record) in self.records.iter().enumerate() {
            index.entry(record.key.as_str()).or_insert(pos);
        }
        index
    }
}

/// A known true correspondence between the two collections, by key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KnownLink {
    pub left: String,
    pub right: String,
}

impl KnownLink {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// A candidate pair, by position in the left and right collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairIndex {
    pub left: usize,
    pub right: usize,
}

impl PairIndex {
    pub fn new(left: usize, right: usize) -> Self {
        Self { left, right }
    }
}

impl std::fmt::Display for PairIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.left, self.right)
    }
}
