use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::value::Value;

/// Name of the identifier column every table carries implicitly.
pub const ID_COLUMN: &str = "ID";

/// One record: an ordered mapping of column name to typed value.
///
/// The map is ordered so a record writes back to disk with its fields in
/// schema order, the same way it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row(pub IndexMap<String, Value>);

impl Row {
    pub fn new() -> Row {
        Row(IndexMap::new())
    }

    pub fn id(&self) -> Option<i64> {
        match self.0.get(ID_COLUMN) {
            Some(Value::Int(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn set(&mut self, column: &str, value: Value) {
        self.0.insert(column.to_string(), value);
    }

    pub fn matches(&self, column: &str, value: &Value) -> bool {
        //! The single predicate form the engine supports: exact typed
        //! equality on one column. A record without the column never
        //! matches.

        self.0.get(column) == Some(value)
    }
}

impl Default for Row {
    fn default() -> Row {
        Row::new()
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells: Vec<String> = self.0.values().map(|value| value.to_string()).collect();
        write!(f, "{}", cells.join(" | "))
    }
}
