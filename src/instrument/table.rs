use std::path::Path;

use crate::error::InstrumentError;
use crate::lineage::reference::HandleToken;

/// A small in-memory table of string cells.
///
/// Every table carries its own `HandleToken`. Cloning produces a new data
/// object and therefore a new token.
#[derive(Debug)]
pub struct Table {
    handle: HandleToken,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Clone for Table {
    fn clone(&self) -> Self {
        Self {
            handle: HandleToken::mint(),
            columns: self.columns.clone(),
            rows: self.rows.clone(),
        }
    }
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, InstrumentError> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(InstrumentError::RaggedRow {
                    row: i,
                    found: row.len(),
                    expected: columns.len(),
                });
            }
        }
        Ok(Self {
            handle: HandleToken::mint(),
            columns,
            rows,
        })
    }

    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            handle: HandleToken::mint(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn handle(&self) -> HandleToken {
        self.handle
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), InstrumentError> {
        if row.len() != self.columns.len() {
            return Err(InstrumentError::RaggedRow {
                row: self.rows.len(),
                found: row.len(),
                expected: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends the rows of `other`. Both tables must have the same columns.
    pub fn append(&mut self, other: &Table) -> Result<(), InstrumentError> {
        if self.columns != other.columns {
            return Err(InstrumentError::SchemaMismatch {
                expected: self.columns.clone(),
                found: other.columns.clone(),
            });
        }
        self.rows.extend(other.rows.iter().cloned());
        Ok(())
    }

    pub(crate) fn read_csv(path: &Path) -> Result<Self, InstrumentError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;

        let columns = reader
            .headers()?
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        Table::new(columns, rows)
    }

    pub(crate) fn write_csv(&self, path: &Path) -> Result<(), InstrumentError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn clone_is_a_new_data_object() {
        let table = Table::empty(cols(&["a"]));
        let copy = table.clone();
        assert_ne!(table.handle(), copy.handle());
        assert_eq!(table.columns(), copy.columns());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Table::new(cols(&["a", "b"]), vec![cols(&["1"])]).unwrap_err();
        assert!(matches!(
            err,
            InstrumentError::RaggedRow { row: 0, found: 1, expected: 2 }
        ));
    }

    #[test]
    fn append_requires_matching_columns() {
        let mut left = Table::new(cols(&["a"]), vec![cols(&["1"])]).unwrap();
        let right = Table::new(cols(&["a"]), vec![cols(&["2"])]).unwrap();
        left.append(&right).unwrap();
        assert_eq!(left.len(), 2);

        let other = Table::empty(cols(&["b"]));
        assert!(matches!(
            left.append(&other),
            Err(InstrumentError::SchemaMismatch { .. })
        ));
    }
}
