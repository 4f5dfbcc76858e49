use std::fmt::Display;

use indexmap::IndexMap;

use super::error::DatabaseError;
use super::row::ID_COLUMN;
use super::value::DataType;

/// One declared column: a name and the type every stored value of that
/// column must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Column {
        Column {
            name: name.into(),
            datatype,
        }
    }

    pub fn from_spec(spec: &str) -> Result<Column, DatabaseError> {
        //! Parse a `name:type` column spec the way the shell hands them
        //! over, one colon, both halves non-empty, type from the valid
        //! set. The error names the offending spec so a user can see
        //! which of several definitions was wrong.

        let Some((name, tag)) = spec.split_once(':') else {
            return Err(DatabaseError::validation(format!(
                "invalid column spec '{}': expected name:type",
                spec
            )));
        };

        if name.is_empty() || tag.is_empty() {
            return Err(DatabaseError::validation(format!(
                "invalid column spec '{}': expected name:type",
                spec
            )));
        }

        Ok(Column::new(name, DataType::parse(tag)?))
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.datatype)
    }
}

/// The schema of one table: a name plus its ordered columns.
///
/// The first column is always `ID:int`. It is synthesized by the
/// constructors and never supplied by a caller, so every record the
/// engine ever stores can be addressed by its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Table, DatabaseError> {
        //! Build a fresh schema from user-declared columns.
        //!
        //! Goes through [`Table::add_column`] so duplicate names, a
        //! caller-supplied `ID` included, are rejected before the table
        //! exists anywhere.

        let mut table = Table {
            name: name.into(),
            columns: vec![Column::new(ID_COLUMN, DataType::Int)],
        };

        for column in columns {
            table.add_column(column)?;
        }

        Ok(table)
    }

    pub fn from_stored(name: &str, stored_columns: &IndexMap<String, DataType>) -> Table {
        //! Rebuild a schema from its persisted form.
        //!
        //! `ID:int` always comes out first; the persisted columns follow
        //! in their stored order. A metadata file that lost its `ID`
        //! entry (hand edits happen) still loads a valid table.

        let mut columns = vec![Column::new(ID_COLUMN, DataType::Int)];

        for (column_name, datatype) in stored_columns {
            if column_name != ID_COLUMN {
                columns.push(Column::new(column_name, *datatype));
            }
        }

        Table {
            name: name.to_string(),
            columns,
        }
    }

    pub fn to_stored(&self) -> IndexMap<String, DataType> {
        self.columns
            .iter()
            .map(|column| (column.name.clone(), column.datatype))
            .collect()
    }

    pub fn add_column(&mut self, column: Column) -> Result<(), DatabaseError> {
        //! Append one column. Names are unique within a table, so a
        //! repeat is a validation failure.

        if self.columns.iter().any(|known| known.name == column.name) {
            return Err(DatabaseError::validation(format!(
                "column '{}' already exists in table '{}'",
                column.name, self.name
            )));
        }

        self.columns.push(column);
        Ok(())
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn value_columns(&self) -> &[Column] {
        //! The columns a caller supplies values for, everything after
        //! the implicit `ID`.

        &self.columns[1..]
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let columns: Vec<String> = self.columns.iter().map(|column| column.to_string()).collect();
        write!(f, "table '{}' with columns: {}", self.name, columns.join(", "))
    }
}
