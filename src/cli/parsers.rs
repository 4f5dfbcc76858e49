//! The place where the argument and statement parsers are defined.

use std::path::PathBuf;

use clap::Parser;
use sqlparser::{ast::Statement, dialect::Dialect, parser};

use crate::cli::theme::{highlight_argument, system_message};

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "A primitive flat-file table store", long_about = None)]
pub struct CliArgs {
    /// Directory holding the metadata document and the table files.
    /// Falls back to TABULA_DATA_DIR, then to ./data.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Wraps the SQL parser so the shell always deals with exactly one
/// statement at a time.
pub struct StatementParser {
    dialect: Box<dyn Dialect>,
}

impl StatementParser {
    pub fn new(dialect: Box<dyn Dialect>) -> StatementParser {
        StatementParser { dialect }
    }

    pub fn parse_statements(&self, input: &str) -> Result<Vec<Statement>, String> {
        //! Parse one or more statements at once.
        //!
        //! Returns an AST of statements.

        let ast = parser::Parser::parse_sql(self.dialect.as_ref(), input);
        ast.map_err(|error| {
            system_message(
                "parser",
                format!(
                    "error parsing statement: {}",
                    highlight_argument(error.to_string().as_str())
                ),
            )
        })
    }

    pub fn parse_single_statement(&self, input: &str) -> Result<Statement, String> {
        //! Parse exactly one statement.

        let mut statements = self.parse_statements(input)?;

        if statements.len() != 1 {
            Err(system_message(
                "parser",
                "please write a single statement at a time.".to_string(),
            ))
        } else {
            Ok(statements.remove(0))
        }
    }
}
