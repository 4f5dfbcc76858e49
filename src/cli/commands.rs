//! Execution of parsed statements against the storage core.
//!
//! The shell accepts ordinary SQL syntax but the engine's semantics stay
//! deliberately small, so this module is as much a gatekeeper as an
//! executor. What passes through:
//!
//! - CREATE TABLE t (col INT | TEXT | BOOLEAN, ...)
//! - DROP TABLE t
//! - SHOW TABLES
//! - INSERT INTO t VALUES (v, ...), (v, ...)
//! - SELECT * FROM t [WHERE col = value]
//! - UPDATE t SET col = value WHERE col = value
//! - DELETE FROM t WHERE col = value
//!
//! Joins, projections, aggregations, ORDER BY, LIMIT and any predicate
//! beyond a single equality are rejected before they reach the core.

use sqlparser::ast::{
    Assignment, AssignmentTarget, BinaryOperator, Expr, ObjectName, SelectItem, SetExpr,
    Statement, TableFactor, TableObject, TableWithJoins, UnaryOperator, Value, ValueWithSpan,
};

use crate::cli::theme::{highlight_argument, system_message};
use crate::persistence::{Database, Row};

/// The executor that runs one parsed statement against the database.
///
/// Stateless beyond the statement it holds; the shell constructs one per
/// input line and hands it the database mutably, which is all the
/// concurrency story a single-threaded engine needs.
pub struct StatementExecutor {
    statement: Statement,
}

/// What a statement produced, in a displayable form.
///
/// Query-shaped statements fill `columns` and `records`; everything else
/// reports through `message`. `n_rows_processed` feeds the shell's
/// per-statement summary line.
pub struct StatementResult {
    pub columns: Option<Vec<String>>,
    pub records: Option<Vec<Row>>,
    pub message: Option<String>,
    pub n_rows_processed: Option<usize>,
}

impl StatementResult {
    fn message_only(message: String) -> StatementResult {
        StatementResult {
            columns: None,
            records: None,
            message: Some(message),
            n_rows_processed: None,
        }
    }
}

impl StatementExecutor {
    pub fn new(statement: Statement) -> StatementExecutor {
        StatementExecutor { statement }
    }

    pub fn is_destructive(&self) -> bool {
        //! Statements the shell asks the user to confirm before running.

        matches!(
            self.statement,
            Statement::Drop { .. } | Statement::Delete(_)
        )
    }

    pub fn execute(&self, database: &mut Database) -> Result<StatementResult, String> {
        //! Run the held statement and return its displayable result.

        match &self.statement {
            Statement::Query(query) => {
                if query.order_by.is_some() {
                    return Err(system_message(
                        "exctr",
                        "ORDER BY is not supported by the engine.".to_string(),
                    ));
                }
                if query.limit_clause.is_some() {
                    return Err(system_message(
                        "exctr",
                        "LIMIT is not supported by the engine.".to_string(),
                    ));
                }

                let select = match query.body.as_ref() {
                    SetExpr::Select(select) => select,
                    _ => {
                        return Err(system_message(
                            "exctr",
                            "this kind of query is not handled by the engine.".to_string(),
                        ));
                    }
                };

                for item in &select.projection {
                    match item {
                        SelectItem::Wildcard(_) => {}
                        _ => {
                            return Err(system_message(
                                "exctr",
                                format!(
                                    "only {} projection is supported.",
                                    highlight_argument("SELECT *")
                                ),
                            ));
                        }
                    }
                }

                let table_with_joins = select.from.first().ok_or(system_message(
                    "exctr",
                    "there is no table name after the FROM keyword.".to_string(),
                ))?;
                if select.from.len() > 1 || !table_with_joins.joins.is_empty() {
                    return Err(system_message(
                        "exctr",
                        "joins are not supported by the engine.".to_string(),
                    ));
                }

                let table_name = self._extract_table_name(table_with_joins)?;

                let predicate = match select.selection.as_ref() {
                    Some(selection) => Some(self._parse_equality(selection)?),
                    None => None,
                };

                let column_names = database
                    .get_table(&table_name)
                    .map_err(|error| error.to_string())?
                    .column_names();

                let records = match &predicate {
                    Some((where_column, where_value)) => database.select(
                        &table_name,
                        Some(where_column.as_str()),
                        Some(where_value.as_str()),
                    ),
                    None => database.select(&table_name, None, None),
                }
                .map_err(|error| error.to_string())?;

                let n_records = records.len();
                Ok(StatementResult {
                    columns: Some(column_names),
                    records: Some(records),
                    message: None,
                    n_rows_processed: Some(n_records),
                })
            }
            Statement::Insert(insert) => {
                let table_name = match &insert.table {
                    TableObject::TableName(object_name) => self._parse_object_name(object_name)?,
                    _ => {
                        return Err(system_message(
                            "exctr",
                            "invalid table name in the INSERT statement.".to_string(),
                        ));
                    }
                };

                if !insert.columns.is_empty() {
                    return Err(system_message(
                        "exctr",
                        "column lists are not supported; values go to every column in order."
                            .to_string(),
                    ));
                }

                let source = insert.source.as_ref().ok_or(system_message(
                    "exctr",
                    "there are no values to insert.".to_string(),
                ))?;
                let value_rows = match source.body.as_ref() {
                    SetExpr::Values(values) => &values.rows,
                    _ => {
                        return Err(system_message(
                            "exctr",
                            "invalid values list in the INSERT statement.".to_string(),
                        ));
                    }
                };

                let mut inserted_ids = Vec::new();
                for value_row in value_rows {
                    let raw_values = self._extract_row(value_row)?;
                    let record = database
                        .insert(&table_name, &raw_values)
                        .map_err(|error| error.to_string())?;
                    inserted_ids.extend(record.id());
                }

                let ids: Vec<String> =
                    inserted_ids.iter().map(|id| format!("ID={}", id)).collect();
                Ok(StatementResult {
                    columns: None,
                    records: None,
                    message: Some(format!(
                        "record(s) {} added to table '{}'.",
                        ids.join(", "),
                        table_name
                    )),
                    n_rows_processed: Some(inserted_ids.len()),
                })
            }
            Statement::Update(update) => {
                let table_name = self._extract_table_name(&update.table)?;

                if update.assignments.len() != 1 {
                    return Err(system_message(
                        "exctr",
                        "exactly one SET assignment is supported.".to_string(),
                    ));
                }
                let (set_column, set_value) = self._parse_assignment(&update.assignments[0])?;

                let selection = update.selection.as_ref().ok_or(system_message(
                    "exctr",
                    "UPDATE requires a WHERE <column> = <value> predicate.".to_string(),
                ))?;
                let (where_column, where_value) = self._parse_equality(selection)?;

                let outcome = database
                    .update(&table_name, &set_column, &set_value, &where_column, &where_value)
                    .map_err(|error| error.to_string())?;

                let ids: Vec<String> = outcome
                    .updated_ids
                    .iter()
                    .map(|id| format!("ID={}", id))
                    .collect();
                Ok(StatementResult {
                    columns: None,
                    records: None,
                    message: Some(format!(
                        "{} record(s) ({}) updated in table '{}'.",
                        outcome.updated_count,
                        ids.join(", "),
                        table_name
                    )),
                    n_rows_processed: Some(outcome.updated_count),
                })
            }
            Statement::Delete(delete) => {
                let table_name = match &delete.from {
                    sqlparser::ast::FromTable::WithFromKeyword(tables) => {
                        let table_with_joins = tables.first().ok_or(system_message(
                            "exctr",
                            "there is no table name after the FROM keyword.".to_string(),
                        ))?;
                        self._extract_table_name(table_with_joins)?
                    }
                    _ => {
                        return Err(system_message(
                            "exctr",
                            "invalid DELETE statement.".to_string(),
                        ));
                    }
                };

                let selection = delete.selection.as_ref().ok_or(system_message(
                    "exctr",
                    "DELETE requires a WHERE <column> = <value> predicate.".to_string(),
                ))?;
                let (where_column, where_value) = self._parse_equality(selection)?;

                let outcome = database
                    .delete(&table_name, &where_column, &where_value)
                    .map_err(|error| error.to_string())?;

                let ids: Vec<String> = outcome
                    .deleted_ids
                    .iter()
                    .map(|id| format!("ID={}", id))
                    .collect();
                Ok(StatementResult {
                    columns: None,
                    records: None,
                    message: Some(format!(
                        "{} record(s) ({}) deleted from table '{}'.",
                        outcome.deleted_count,
                        ids.join(", "),
                        table_name
                    )),
                    n_rows_processed: Some(outcome.deleted_count),
                })
            }
            Statement::CreateTable(create_table) => {
                let table_name = self._parse_object_name(&create_table.name)?;

                if !create_table.constraints.is_empty() {
                    return Err(system_message(
                        "exctr",
                        "table constraints are not supported by the engine.".to_string(),
                    ));
                }

                let mut column_specs = Vec::new();
                for column_definition in &create_table.columns {
                    column_specs.push(self._extract_column_spec(column_definition)?);
                }

                let table = database
                    .create_table(&table_name, &column_specs)
                    .map_err(|error| error.to_string())?;

                Ok(StatementResult::message_only(format!("{} created.", table)))
            }
            Statement::Drop {
                object_type, names, ..
            } => match object_type {
                sqlparser::ast::ObjectType::Table => {
                    let mut dropped = Vec::new();
                    for object_name in names {
                        let table_name = self._parse_object_name(object_name)?;
                        database
                            .drop_table(&table_name)
                            .map_err(|error| error.to_string())?;
                        dropped.push(format!("'{}'", table_name));
                    }

                    Ok(StatementResult::message_only(format!(
                        "table(s) {} dropped.",
                        dropped.join(", ")
                    )))
                }
                _ => Err(system_message(
                    "exctr",
                    format!(
                        "only {} is handled by the engine.",
                        highlight_argument("DROP TABLE <table>")
                    ),
                )),
            },
            Statement::ShowTables { .. } => {
                let table_names = database.list_tables();

                let message = if table_names.is_empty() {
                    "there are no tables yet.".to_string()
                } else {
                    let listing: Vec<String> = table_names
                        .iter()
                        .map(|table_name| format!("- {}", table_name))
                        .collect();
                    format!(
                        "{} table(s):\n{}",
                        table_names.len(),
                        listing.join("\n")
                    )
                };

                Ok(StatementResult::message_only(message))
            }
            _ => Err(system_message(
                "exctr",
                "this statement is not handled by the engine.".to_string(),
            )),
        }
    }

    fn _extract_table_name(&self, table_with_joins: &TableWithJoins) -> Result<String, String> {
        match &table_with_joins.relation {
            TableFactor::Table { name, .. } => self._parse_object_name(name),
            _ => Err(system_message(
                "exctr",
                "invalid table name format.".to_string(),
            )),
        }
    }

    fn _parse_object_name(&self, object_name: &ObjectName) -> Result<String, String> {
        object_name
            .0
            .first()
            .and_then(|part| part.as_ident())
            .map(|ident| ident.value.clone())
            .ok_or_else(|| {
                system_message("exctr", "invalid object name in the statement.".to_string())
            })
    }

    fn _extract_column_spec(
        &self,
        column_definition: &sqlparser::ast::ColumnDef,
    ) -> Result<String, String> {
        //! Turn one SQL column definition into the `name:type` spec the
        //! persistence api consumes. Only the three storable types map;
        //! column options (NOT NULL, PRIMARY KEY, ...) have no meaning
        //! here and are rejected outright.

        use sqlparser::ast::DataType as SqlDataType;

        let column_name = column_definition.name.value.clone();

        if !column_definition.options.is_empty() {
            return Err(system_message(
                "exctr",
                format!("column options are not supported on '{}'.", column_name),
            ));
        }

        let type_tag = match &column_definition.data_type {
            SqlDataType::Int(_) | SqlDataType::Integer(_) | SqlDataType::BigInt(_) => "int",
            SqlDataType::Text | SqlDataType::Varchar(_) => "str",
            SqlDataType::Boolean => "bool",
            other => {
                return Err(system_message(
                    "exctr",
                    format!("unsupported type {} for column '{}'.", other, column_name),
                ));
            }
        };

        Ok(format!("{}:{}", column_name, type_tag))
    }

    fn _extract_row(&self, value_row: &[Expr]) -> Result<Vec<String>, String> {
        value_row.iter().map(|expr| self._parse_expr(expr)).collect()
    }

    fn _parse_expr(&self, expr: &Expr) -> Result<String, String> {
        //! Reduce a literal-bearing expression to the raw text the value
        //! codec expects. Bare identifiers pass through as text, so
        //! `WHERE name = Alice` works the same as a quoted string.

        match expr {
            Expr::Value(value) => self._parse_value(value),
            Expr::Identifier(ident) => Ok(ident.value.clone()),
            Expr::UnaryOp { op, expr } => {
                let value = self._parse_expr(expr)?;
                match op {
                    UnaryOperator::Minus => Ok(format!("-{}", value)),
                    _ => Err(system_message(
                        "exctr",
                        "unsupported unary operator.".to_string(),
                    )),
                }
            }
            _ => Err(system_message(
                "exctr",
                "unsupported value expression. Check your statement.".to_string(),
            )),
        }
    }

    fn _parse_value(&self, value: &ValueWithSpan) -> Result<String, String> {
        let raw = match &value.value {
            Value::Number(number, _) => number.clone(),
            Value::SingleQuotedString(text) => text.clone(),
            Value::DoubleQuotedString(text) => text.clone(),
            Value::Boolean(flag) => flag.to_string(),
            _ => {
                return Err(system_message(
                    "exctr",
                    format!(
                        "unsupported value: {}",
                        highlight_argument(&value.to_string())
                    ),
                ));
            }
        };

        Ok(raw)
    }

    fn _parse_equality(&self, selection: &Expr) -> Result<(String, String), String> {
        //! The only predicate shape the engine evaluates: one
        //! `<column> = <value>` equality.

        match selection {
            Expr::BinaryOp {
                left,
                op: BinaryOperator::Eq,
                right,
            } => {
                let column_name = match left.as_ref() {
                    Expr::Identifier(ident) => ident.value.clone(),
                    _ => {
                        return Err(system_message(
                            "exctr",
                            "the left side of the predicate must be a column name.".to_string(),
                        ));
                    }
                };
                let raw_value = self._parse_expr(right)?;

                Ok((column_name, raw_value))
            }
            Expr::Nested(inner) => self._parse_equality(inner),
            _ => Err(system_message(
                "exctr",
                format!(
                    "only a single {} predicate is supported.",
                    highlight_argument("<column> = <value>")
                ),
            )),
        }
    }

    fn _parse_assignment(&self, assignment: &Assignment) -> Result<(String, String), String> {
        let column_name = match &assignment.target {
            AssignmentTarget::ColumnName(object_name) => self._parse_object_name(object_name)?,
            _ => {
                return Err(system_message(
                    "exctr",
                    "invalid column name in the SET clause.".to_string(),
                ));
            }
        };
        let raw_value = self._parse_expr(&assignment.value)?;

        Ok((column_name, raw_value))
    }
}
