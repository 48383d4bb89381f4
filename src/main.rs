//! Solar viability simulator entry point.
use anyhow::Result;

fn main() -> Result<()> {
    solar_viability::cli::run_cli()
}
