mod cli;
mod config;
mod error;
mod input;
mod logger;
mod pattern;
mod scanner;
mod transform;

use std::io;

use anyhow::{Context, Result};

use config::Config;

fn main() -> Result<()> {
    logger::init();

    let config = Config::load().context("failed to load configuration")?;
    let run_config = cli::parse_args(&config)?;

    let stdout = io::stdout().lock();
    scanner::run(&run_config, stdout)?;

    Ok(())
}
