use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;

use symcat_cli::args::CliArgs;
use symcat_cli::driver;

fn main() -> Result<()> {
    // Supports SYMCAT_LOG_FORMAT=tree|json|text (see src/tracing_config.rs).
    symcat::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let output = driver::run(&args, &cwd)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("failed to write output")?;
    Ok(())
}
