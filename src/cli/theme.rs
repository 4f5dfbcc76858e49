//! The shell's look: one accent color, one message format, and the
//! tabular rendering of query results.

use colored::{Color, Colorize};

use crate::persistence::Row;

pub(crate) const TABULA_TEAL: Color = Color::TrueColor {
    r: 64,
    g: 178,
    b: 170,
};

pub fn highlight_argument(argument: &str) -> String {
    format!("{}", argument.color(TABULA_TEAL))
}

pub fn system_message(source_name: &str, message: String) -> String {
    //! Prefix a message with its bracketed source, the same format for
    //! every line the shell prints on its own behalf.

    let source_formatted = format!("{:6}", source_name.color(TABULA_TEAL).bold());
    format!("[{}] {}", source_formatted, message)
}

pub fn render_records(column_names: &[String], records: &[Row]) -> String {
    //! Lay records out as a fixed-width text table, one line per record,
    //! columns in schema order. A record missing a column renders NIL.

    let mut widths: Vec<usize> = column_names.iter().map(|name| name.len()).collect();

    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            column_names
                .iter()
                .enumerate()
                .map(|(index, name)| {
                    let cell = match record.get(name) {
                        Some(value) => value.to_string(),
                        None => "NIL".to_string(),
                    };
                    widths[index] = widths[index].max(cell.len());
                    cell
                })
                .collect()
        })
        .collect();

    let header: Vec<String> = column_names
        .iter()
        .zip(&widths)
        .map(|(name, width)| format!("{:width$}", name, width = *width))
        .collect();

    let separator: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();

    let mut lines = vec![header.join(" | "), separator.join("-+-")];

    for row_cells in cells {
        let line: Vec<String> = row_cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:width$}", cell, width = *width))
            .collect();
        lines.push(line.join(" | "));
    }

    lines.join("\n")
}
