use std::env;
use std::path::PathBuf;

use clap::Parser;
use log::debug;

use tabula_engine::cli;
use tabula_engine::cli::parsers::CliArgs;

const DATA_DIR_ENV: &str = "TABULA_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "data";

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = CliArgs::parse();

    let data_dir = args
        .data_dir
        .or_else(|| env::var(DATA_DIR_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    debug!("data directory resolved to {}", data_dir.display());

    cli::run_client(data_dir);
}
