use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use super::error::DatabaseError;
use super::row::Row;
use super::value::DataType;

/// Persisted form of one table schema inside the metadata document.
///
/// Columns stay an ordered name-to-type mapping, so the file keeps the
/// familiar shape while declared column order survives a reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTable {
    pub columns: IndexMap<String, DataType>,
}

/// The single metadata document holding every table schema.
///
/// Loaded fully on startup and rewritten fully on every schema change.
/// A missing file is an empty database, not an error.
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> MetadataStore {
        MetadataStore { path: path.into() }
    }

    pub fn load(&self) -> Result<IndexMap<String, StoredTable>, DatabaseError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(IndexMap::new()),
            Err(error) => return Err(error.into()),
        };

        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, tables: &IndexMap<String, StoredTable>) -> Result<(), DatabaseError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let document = serde_json::to_string_pretty(tables)?;
        fs::write(&self.path, document)?;
        debug!("metadata rewritten with {} table(s)", tables.len());
        Ok(())
    }
}

/// Per-table record files, one JSON array per table, named after it.
pub struct RowStore {
    dir: PathBuf,
}

impl RowStore {
    pub fn new(dir: impl Into<PathBuf>) -> RowStore {
        RowStore { dir: dir.into() }
    }

    fn table_path(&self, table_name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", table_name))
    }

    pub fn load(&self, table_name: &str) -> Result<Vec<Row>, DatabaseError> {
        //! Read the full ordered record sequence of one table.
        //!
        //! A freshly created table has no file yet; that reads as zero
        //! records.

        let text = match fs::read_to_string(self.table_path(table_name)) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, table_name: &str, records: &[Row]) -> Result<(), DatabaseError> {
        //! Overwrite the table's file with the given sequence. Whole-file
        //! rewrite, there is no append log.

        fs::create_dir_all(&self.dir)?;

        let document = serde_json::to_string_pretty(records)?;
        fs::write(self.table_path(table_name), document)?;
        debug!("table '{}' rewritten with {} record(s)", table_name, records.len());
        Ok(())
    }

    pub fn delete(&self, table_name: &str) -> Result<(), DatabaseError> {
        match fs::remove_file(self.table_path(table_name)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
