//! A primitive little table store: typed columns, flat JSON files and an
//! SQL-flavored shell on top.

pub mod cli;
pub mod persistence;
pub mod sessions;
