//! The command line interface.
use crate::config::ScenarioConfig;
use crate::heating::{CollectorKind, HeatingInput, Region, size_heating};
use crate::io::export::{export_monthly_csv, export_yearly_csv};
use crate::log;
use crate::tariff::TariffRegistry;
use crate::viability::{Report, compute_viability};
use ::log::info;
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

/// Residential solar viability simulator.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

/// Options for the run command.
#[derive(Debug, Args)]
pub struct RunOpts {
    /// Scenario TOML file.
    #[arg(long, conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,
    /// Built-in preset (baseline, grandfathered, expiring_credits).
    #[arg(long)]
    pub preset: Option<String>,
    /// Override the number of years to project.
    #[arg(long)]
    pub horizon: Option<u32>,
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
    /// Write monthly records to this CSV file.
    #[arg(long)]
    pub monthly_out: Option<PathBuf>,
    /// Write yearly records to this CSV file.
    #[arg(long)]
    pub yearly_out: Option<PathBuf>,
}

/// Options for the heating command.
#[derive(Debug, Args)]
pub struct HeatingOpts {
    /// Household description TOML file.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Number of residents.
    #[arg(long)]
    pub people: Option<u32>,
    /// Geographic region.
    #[arg(long, value_enum)]
    pub region: Option<Region>,
    /// Collector technology.
    #[arg(long, value_enum)]
    pub collector: Option<CollectorKind>,
    /// Print the sizing as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Simulate a scenario and print its viability report.
    Run(RunOpts),
    /// List the built-in tariffs.
    Tariffs {
        /// Print the tariffs as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Size a solar water-heating installation.
    Heating(HeatingOpts),
}

impl Commands {
    fn execute(self) -> Result<()> {
        match self {
            Self::Run(opts) => handle_run_command(&opts, &TariffRegistry::builtin()),
            Self::Tariffs { json } => handle_tariffs_command(json, &TariffRegistry::builtin()),
            Self::Heating(opts) => handle_heating_command(&opts),
        }
    }
}

/// Parse CLI arguments and run the selected command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    log::init(cli.log_level.as_deref()).context("Failed to initialise logging.")?;
    cli.command.execute()
}

/// Loads the scenario selected by `--scenario` or `--preset`, defaulting to the baseline preset.
fn load_scenario(opts: &RunOpts) -> Result<ScenarioConfig> {
    let mut scenario = match (&opts.scenario, &opts.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load scenario {}", path.display()))?,
        (None, Some(name)) => ScenarioConfig::from_preset(name)?,
        (None, None) => ScenarioConfig::baseline(),
    };
    if let Some(horizon) = opts.horizon {
        scenario.finance.horizon_years = horizon;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid scenario:\n{}", lines.join("\n"));
    }
    Ok(scenario)
}

fn write_exports(opts: &RunOpts, report: &Report) -> Result<()> {
    if let Some(path) = &opts.monthly_out {
        export_monthly_csv(&report.years, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Monthly records written to {}", path.display());
    }
    if let Some(path) = &opts.yearly_out {
        export_yearly_csv(&report.years, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Yearly records written to {}", path.display());
    }
    Ok(())
}

/// Handle the `run` command.
pub fn handle_run_command(opts: &RunOpts, registry: &TariffRegistry) -> Result<()> {
    let scenario = load_scenario(opts)?;
    let report = compute_viability(&scenario, registry)?;
    write_exports(opts, &report)?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for year in &report.years {
            println!("{year}");
        }
        println!("\n{report}");
    }
    Ok(())
}

/// Handle the `tariffs` command.
pub fn handle_tariffs_command(json: bool, registry: &TariffRegistry) -> Result<()> {
    if json {
        let tariffs: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&tariffs)?);
        return Ok(());
    }
    for tariff in registry.iter() {
        println!(
            "{:<10} {:<28} fio_b {:.6}  price@100kWh {:.4}",
            tariff.id,
            tariff.name,
            tariff.fio_b,
            tariff.final_unit_price(100.0)
        );
    }
    Ok(())
}

fn load_heating_input(path: &Path) -> Result<HeatingInput> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(HeatingInput::from_toml_str(&content)?)
}

/// Handle the `heating` command.
pub fn handle_heating_command(opts: &HeatingOpts) -> Result<()> {
    let mut input = match &opts.input {
        Some(path) => load_heating_input(path)?,
        None => HeatingInput::default(),
    };
    if let Some(people) = opts.people {
        input.people = people;
    }
    if let Some(region) = opts.region {
        input.region = region;
    }
    if let Some(collector) = opts.collector {
        input.collector = collector;
    }

    let sizing = match size_heating(&input) {
        Ok(sizing) => sizing,
        Err(errors) => {
            let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
            bail!("Invalid heating input:\n{}", lines.join("\n"));
        }
    };

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&sizing)?);
    } else {
        println!("{sizing}");
    }
    Ok(())
}
