use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use colored::Colorize;
use sqlparser::dialect::MySqlDialect;

use crate::{
    cli::{
        commands::StatementExecutor,
        parsers::StatementParser,
        theme::{TABULA_TEAL, highlight_argument, render_records, system_message},
    },
    persistence::Database,
    sessions::session::Session,
};

mod commands;
pub mod parsers;
mod splash_screen;
mod theme;

const DEFAULT_LAST_COMMAND_DELIMITER: &str = "!";

const TABULA_SHELL_COMMANDS_LIST: [(&str, &str); 5] = [
    ("!", "run the last statement again, add more to go further back"),
    ("help", "list all available commands"),
    ("history", "list command history for this session"),
    ("info <table>", "show a table's columns and record count"),
    ("exit", "leave the shell"),
];

pub fn run_client(data_dir: PathBuf) {
    splash_screen::splash_screen();

    let database = match Database::open(&data_dir) {
        Ok(database) => database,
        Err(error) => {
            println!(
                "{}",
                system_message(
                    "system",
                    format!("could not open the database: {}", error)
                )
            );
            return;
        }
    };

    println!(
        "{}",
        system_message(
            "info",
            format!(
                "Database opened at '{}' with {} table(s).",
                highlight_argument(&data_dir.display().to_string()),
                database.table_count()
            )
        )
    );

    start_repl(database);
}

pub fn show_help() {
    println!(
        "{}",
        system_message(
            "info",
            format!(
                "Any other input is treated as an {}.",
                highlight_argument("sql statement")
            )
        )
    );

    println!();
    println!("{:14} {}", "COMMAND".color(TABULA_TEAL), "DETAILS");
    for (command, details) in TABULA_SHELL_COMMANDS_LIST {
        println!("{:14} {}", command.color(TABULA_TEAL), details)
    }
}

fn start_repl(mut database: Database) {
    let mut session = Session::new();

    println!(
        "{}",
        system_message(
            "system",
            format!(
                "Use '{}' to quit and '{}' to know all commands available.",
                highlight_argument("exit"),
                highlight_argument("help"),
            ),
        )
    );
    println!(
        "{}",
        system_message(
            "system",
            format!(
                "New session initiated at '{}'.",
                highlight_argument(&session.start_time_string())
            ),
        )
    );

    loop {
        println!();
        print!("{:6} > ", "tabula".color(TABULA_TEAL).bold());
        if io::stdout().flush().is_err() {
            break;
        }

        let mut buffer = String::new();
        if io::stdin().read_line(&mut buffer).is_err() || buffer.is_empty() {
            break;
        }

        if buffer.starts_with(DEFAULT_LAST_COMMAND_DELIMITER) {
            let nth_back = buffer.matches(DEFAULT_LAST_COMMAND_DELIMITER).count();

            match session.get_last_command(nth_back) {
                Some(last_command) => buffer = last_command.to_string(),
                None => {
                    println!(
                        "{}",
                        system_message(
                            "system",
                            format!(
                                "No command {} steps back.",
                                highlight_argument(&nth_back.to_string())
                            ),
                        )
                    );
                    continue;
                }
            }
        }

        let input = buffer.trim().to_string();
        if input.is_empty() {
            continue;
        }

        session.add_to_command_history(&input);

        match input.as_str() {
            "history" => session.show_command_history(None),
            "help" => show_help(),
            "exit" | "quit" => break,
            other if other == "info" || other.starts_with("info ") => {
                show_table_info(&database, other)
            }
            statement => run_statement(&mut database, statement),
        }
    }

    println!("Goodbye!")
}

fn run_statement(database: &mut Database, input: &str) {
    //! Parse one statement, ask for confirmation when it destroys data,
    //! execute it and print whatever it produced. Timing is measured
    //! right here around the execution call.

    let parser = StatementParser::new(Box::new(MySqlDialect {}));

    let statement = match parser.parse_single_statement(input) {
        Ok(statement) => statement,
        Err(error) => {
            println!("{}", error);
            return;
        }
    };

    let executor = StatementExecutor::new(statement);

    if executor.is_destructive() && !confirm_action("destroy the targeted data") {
        println!(
            "{}",
            system_message("system", "Operation cancelled.".to_string())
        );
        return;
    }

    let started = Instant::now();
    let result = executor.execute(database);
    let elapsed = started.elapsed();

    match result {
        Ok(result) => {
            if let Some(message) = &result.message {
                println!("{}", system_message("engine", message.clone()));
            }

            if let (Some(columns), Some(records)) = (&result.columns, &result.records) {
                println!("{}", render_records(columns, records));
            }

            println!(
                "{}",
                system_message(
                    "engine",
                    format!(
                        "{} row(s) processed in {:.3}s.",
                        result.n_rows_processed.unwrap_or(0),
                        elapsed.as_secs_f64()
                    )
                )
            );
        }
        Err(error) => println!("{}", error),
    }
}

fn show_table_info(database: &Database, input: &str) {
    let mut parts = input.split_whitespace();
    let _command = parts.next();

    let Some(table_name) = parts.next() else {
        println!(
            "{}",
            system_message(
                "system",
                format!("Usage: {}.", highlight_argument("info <table>"))
            )
        );
        return;
    };

    match database.table_info(table_name) {
        Ok(info) => {
            let columns: Vec<String> = info
                .columns
                .iter()
                .map(|(column_name, datatype)| format!("{}:{}", column_name, datatype))
                .collect();

            println!("Table:   {}", info.name);
            println!("Columns: {}", columns.join(", "));
            println!("Records: {}", info.record_count);
        }
        Err(error) => println!("{}", system_message("engine", error.to_string())),
    }
}

fn confirm_action(action_name: &str) -> bool {
    //! Destructive statements get one explicit yes/no question before
    //! anything runs.

    print!(
        "{}",
        system_message(
            "system",
            format!("Are you sure you want to {}? [y/n]: ", action_name)
        )
    );
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }

    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
