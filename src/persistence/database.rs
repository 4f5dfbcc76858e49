use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};

use super::error::DatabaseError;
use super::row::{ID_COLUMN, Row};
use super::store::{MetadataStore, RowStore, StoredTable};
use super::table::{Column, Table};
use super::value::{DataType, Value};

const META_FILE: &str = "db_meta.json";

/// A select query identified by table name, filter column and raw filter
/// value, exactly the triple a caller hands to [`Database::select`].
type SelectKey = (String, Option<String>, Option<String>);

/// What an update did: how many records changed and which ones, in scan
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub updated_count: usize,
    pub updated_ids: Vec<i64>,
}

/// What a delete did, mirror of [`UpdateOutcome`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    pub deleted_count: usize,
    pub deleted_ids: Vec<i64>,
}

/// Summary of one table for the shell's `info` builtin.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<(String, DataType)>,
    pub record_count: usize,
}

/// The collective of all tables and the only entry point for queries.
///
/// This is the smart type that verifies everything before anything is
/// written: table existence, column specs, value counts and value types.
/// [`Table`] stays the dumb schema holder and the stores only move bytes.
///
/// Every operation runs to completion synchronously. Validation happens
/// first, the in-memory state changes second, the whole-file persist
/// last, so a failed operation leaves no partial mutation behind.
///
/// Select results are cached per query triple. The cache is discarded
/// wholesale on every mutation against any table; nothing is invalidated
/// selectively.
pub struct Database {
    tables: IndexMap<String, Table>,
    metadata: MetadataStore,
    rows: RowStore,
    select_cache: HashMap<SelectKey, Vec<Row>>,
}

impl Database {
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Database, DatabaseError> {
        //! Open the database rooted at `data_dir`, loading every table
        //! schema from the metadata document. A directory that does not
        //! exist yet is simply an empty database.

        let data_dir: PathBuf = data_dir.as_ref().to_path_buf();
        let metadata = MetadataStore::new(data_dir.join(META_FILE));
        let rows = RowStore::new(&data_dir);

        let mut tables = IndexMap::new();
        for (table_name, stored) in metadata.load()? {
            tables.insert(
                table_name.clone(),
                Table::from_stored(&table_name, &stored.columns),
            );
        }

        debug!("database opened with {} table(s)", tables.len());

        Ok(Database {
            tables,
            metadata,
            rows,
            select_cache: HashMap::new(),
        })
    }

    pub fn create_table(
        &mut self,
        table_name: &str,
        column_specs: &[String],
    ) -> Result<&Table, DatabaseError> {
        //! Create a new table from `name:type` column specs.
        //!
        //! Every spec is parsed and checked before the schema set is
        //! touched, and the metadata document is rewritten before the
        //! call returns.

        if self.tables.contains_key(table_name) {
            return Err(DatabaseError::TableExists(table_name.to_string()));
        }

        let mut columns = Vec::with_capacity(column_specs.len());
        for spec in column_specs {
            columns.push(Column::from_spec(spec)?);
        }

        let table = Table::new(table_name, columns)?;
        self.tables.insert(table_name.to_string(), table);
        self.save_tables()?;

        info!("table '{}' created", table_name);
        Ok(&self.tables[table_name])
    }

    pub fn drop_table(&mut self, table_name: &str) -> Result<(), DatabaseError> {
        //! Remove a table's schema and its record file.

        if self.tables.shift_remove(table_name).is_none() {
            return Err(DatabaseError::TableNotFound(table_name.to_string()));
        }

        self.rows.delete(table_name)?;
        self.save_tables()?;
        // A table of the same name may be created again later; a cached
        // result for the old one must not outlive it.
        self.invalidate_select_cache();

        info!("table '{}' dropped", table_name);
        Ok(())
    }

    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get_table(&self, table_name: &str) -> Result<&Table, DatabaseError> {
        self.tables
            .get(table_name)
            .ok_or_else(|| DatabaseError::TableNotFound(table_name.to_string()))
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        self.tables.contains_key(table_name)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn insert(&mut self, table_name: &str, values: &[String]) -> Result<Row, DatabaseError> {
        //! Insert one record, given raw values for every column except
        //! `ID`, in schema order.
        //!
        //! The identifier is one past the highest existing one, starting
        //! from 1 on an empty table. Any coercion failure aborts the
        //! whole insert; nothing is written until every value passed.

        let table = self.get_table(table_name)?;

        let expected = table.value_columns().len();
        if values.len() != expected {
            return Err(DatabaseError::validation(format!(
                "expected {} value(s), got {}",
                expected,
                values.len()
            )));
        }

        let mut records = self.rows.load(table_name)?;
        let next_id = records.iter().filter_map(Row::id).max().unwrap_or(0) + 1;

        let mut record = Row::new();
        record.set(ID_COLUMN, Value::Int(next_id));

        for (column, raw) in table.value_columns().iter().zip(values) {
            record.set(&column.name, column.datatype.coerce(raw)?);
        }

        records.push(record.clone());
        self.rows.save(table_name, &records)?;
        self.invalidate_select_cache();

        debug!("record ID={} inserted into '{}'", next_id, table_name);
        Ok(record)
    }

    pub fn select(
        &mut self,
        table_name: &str,
        where_column: Option<&str>,
        where_value: Option<&str>,
    ) -> Result<Vec<Row>, DatabaseError> {
        //! Return records, optionally filtered by one equality predicate.
        //!
        //! The result is remembered under the exact query triple, so
        //! asking the same question twice between writes never re-reads
        //! the record file.

        let key: SelectKey = (
            table_name.to_string(),
            where_column.map(str::to_string),
            where_value.map(str::to_string),
        );

        if let Some(cached) = self.select_cache.get(&key) {
            debug!("select cache hit for {:?}", key);
            return Ok(cached.clone());
        }
        debug!("select cache miss for {:?}", key);

        let table = self.get_table(table_name)?;
        let records = self.rows.load(table_name)?;

        let result = match (where_column, where_value) {
            (Some(column_name), Some(raw)) => {
                let column = Self::column_of(table, column_name)?;
                let wanted = column.datatype.coerce(raw)?;

                records
                    .into_iter()
                    .filter(|record| record.matches(column_name, &wanted))
                    .collect()
            }
            _ => records,
        };

        self.select_cache.insert(key, result.clone());
        Ok(result)
    }

    pub fn update(
        &mut self,
        table_name: &str,
        set_column: &str,
        set_value: &str,
        where_column: &str,
        where_value: &str,
    ) -> Result<UpdateOutcome, DatabaseError> {
        //! Overwrite one column in every record matching the predicate.
        //!
        //! Matching zero records is a failure and leaves the record file
        //! untouched. Identifiers are assigned once and never rewritten,
        //! so `ID` is not a valid set target.

        if set_column == ID_COLUMN {
            return Err(DatabaseError::validation(
                "the ID column cannot be updated".to_string(),
            ));
        }

        let table = self.get_table(table_name)?;
        let set_col = Self::column_of(table, set_column)?;
        let where_col = Self::column_of(table, where_column)?;

        let wanted = where_col.datatype.coerce(where_value)?;
        let replacement = set_col.datatype.coerce(set_value)?;

        let mut records = self.rows.load(table_name)?;
        let mut updated_ids = Vec::new();

        for record in records.iter_mut() {
            if record.matches(where_column, &wanted) {
                if let Some(id) = record.id() {
                    updated_ids.push(id);
                }
                record.set(set_column, replacement.clone());
            }
        }

        if updated_ids.is_empty() {
            return Err(DatabaseError::RecordNotFound {
                column: where_column.to_string(),
                value: where_value.to_string(),
            });
        }

        self.rows.save(table_name, &records)?;
        self.invalidate_select_cache();

        debug!(
            "{} record(s) updated in '{}' ({:?})",
            updated_ids.len(),
            table_name,
            updated_ids
        );
        Ok(UpdateOutcome {
            updated_count: updated_ids.len(),
            updated_ids,
        })
    }

    pub fn delete(
        &mut self,
        table_name: &str,
        where_column: &str,
        where_value: &str,
    ) -> Result<DeleteOutcome, DatabaseError> {
        //! Remove every record matching the predicate, keeping the
        //! survivors in their original relative order.

        let table = self.get_table(table_name)?;
        let where_col = Self::column_of(table, where_column)?;
        let wanted = where_col.datatype.coerce(where_value)?;

        let records = self.rows.load(table_name)?;

        let deleted_ids: Vec<i64> = records
            .iter()
            .filter(|record| record.matches(where_column, &wanted))
            .filter_map(Row::id)
            .collect();

        if deleted_ids.is_empty() {
            return Err(DatabaseError::RecordNotFound {
                column: where_column.to_string(),
                value: where_value.to_string(),
            });
        }

        let survivors: Vec<Row> = records
            .into_iter()
            .filter(|record| !record.matches(where_column, &wanted))
            .collect();

        self.rows.save(table_name, &survivors)?;
        self.invalidate_select_cache();

        debug!(
            "{} record(s) deleted from '{}' ({:?})",
            deleted_ids.len(),
            table_name,
            deleted_ids
        );
        Ok(DeleteOutcome {
            deleted_count: deleted_ids.len(),
            deleted_ids,
        })
    }

    pub fn table_info(&self, table_name: &str) -> Result<TableInfo, DatabaseError> {
        let table = self.get_table(table_name)?;
        let records = self.rows.load(table_name)?;

        Ok(TableInfo {
            name: table.name().to_string(),
            columns: table
                .columns()
                .iter()
                .map(|column| (column.name.clone(), column.datatype))
                .collect(),
            record_count: records.len(),
        })
    }

    fn save_tables(&self) -> Result<(), DatabaseError> {
        let stored: IndexMap<String, StoredTable> = self
            .tables
            .iter()
            .map(|(table_name, table)| {
                (
                    table_name.clone(),
                    StoredTable {
                        columns: table.to_stored(),
                    },
                )
            })
            .collect();

        self.metadata.save(&stored)
    }

    fn invalidate_select_cache(&mut self) {
        if !self.select_cache.is_empty() {
            debug!("select cache cleared ({} entries)", self.select_cache.len());
            self.select_cache.clear();
        }
    }

    fn column_of<'a>(table: &'a Table, column_name: &str) -> Result<&'a Column, DatabaseError> {
        table.get_column(column_name).ok_or_else(|| {
            DatabaseError::validation(format!(
                "column '{}' does not exist in table '{}'",
                column_name,
                table.name()
            ))
        })
    }
}
