use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::error::DatabaseError;

/// The closed set of column types the engine stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Str,
    Bool,
}

impl DataType {
    pub fn parse(tag: &str) -> Result<DataType, DatabaseError> {
        //! Resolve a textual type tag to a [`DataType`].
        //!
        //! Anything outside the valid set is a validation failure, which
        //! keeps unknown tags from ever reaching a schema.

        match tag {
            "int" => Ok(DataType::Int),
            "str" => Ok(DataType::Str),
            "bool" => Ok(DataType::Bool),
            other => Err(DatabaseError::validation(format!(
                "unknown type '{}': valid types are int, str, bool",
                other
            ))),
        }
    }

    pub fn coerce(&self, raw: &str) -> Result<Value, DatabaseError> {
        //! Convert raw command-line text into a typed [`Value`].
        //!
        //! There is no cross-type leniency here: "1" only becomes an
        //! integer when the column says int, and only becomes true when
        //! the column says bool.

        match self {
            DataType::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| {
                DatabaseError::validation(format!("invalid value '{}': not an integer", raw))
            }),
            DataType::Str => {
                // A matching pair of wrapping double quotes is shell
                // noise, not content.
                if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
                    Ok(Value::Str(raw[1..raw.len() - 1].to_string()))
                } else {
                    Ok(Value::Str(raw.to_string()))
                }
            }
            DataType::Bool => match raw.to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Value::Bool(true)),
                "false" | "0" | "no" => Ok(Value::Bool(false)),
                _ => Err(DatabaseError::validation(format!(
                    "invalid value '{}': not a boolean",
                    raw
                ))),
            },
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            DataType::Int => "int",
            DataType::Str => "str",
            DataType::Bool => "bool",
        };
        write!(f, "{}", tag)
    }
}

/// A single typed cell value.
///
/// Serialized untagged so a record file reads as plain JSON scalars.
/// Equality is exact and typed; `Bool(true)` never equals `Int(1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(number) => write!(f, "{}", number),
            Value::Bool(flag) => write!(f, "{}", flag),
            Value::Str(text) => write!(f, "{}", text),
        }
    }
}
