//! State of one shell session: when it started and what was typed.
//!
//! The engine opens exactly one file-backed database per process, so a
//! session does not manage connections. It exists for the shell niceties
//! that have nothing to do with storage, the command history and the
//! `!`-style recall of previous statements.

use std::fmt::Display;
use std::time::SystemTime;

use chrono::{DateTime, Local};

struct CommandHistory {
    command: String,
    command_time: SystemTime,
}

impl CommandHistory {
    fn command_time_string(&self) -> String {
        let datetime: DateTime<Local> = self.command_time.into();
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl Display for CommandHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.command_time_string(), self.command)
    }
}

pub struct Session {
    command_history: Vec<CommandHistory>,
    start_time: SystemTime,
}

impl Session {
    pub fn new() -> Session {
        Session {
            command_history: vec![],
            start_time: SystemTime::now(),
        }
    }

    pub fn add_to_command_history(&mut self, command: &str) {
        self.command_history.push(CommandHistory {
            command: command.to_string(),
            command_time: SystemTime::now(),
        });
    }

    pub fn start_time_string(&self) -> String {
        let datetime: DateTime<Local> = self.start_time.into();
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn show_command_history(&self, n_prev: Option<usize>) {
        //! Print the most recent commands, newest first. Use `n_prev`
        //! to limit how far back the listing goes.

        let limit = n_prev.unwrap_or(self.command_history.len());

        for (index, command) in self.command_history.iter().rev().enumerate() {
            if index < limit {
                println!("{:3} | {}", index, command);
            }
        }
    }

    pub fn get_last_command(&self, nth_back: usize) -> Option<&str> {
        //! The `nth_back`-th most recent command, 1 being the last one
        //! typed.

        self.command_history
            .iter()
            .nth_back(nth_back - 1)
            .map(|entry| entry.command.as_str())
    }
}

impl Default for Session {
    fn default() -> Session {
        Session::new()
    }
}
