//! Viability orchestration: scenario validation, tariff resolution, simulation and indicators.

use std::fmt;

use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::config::ScenarioConfig;
use crate::sim::engine::simulate;
use crate::sim::indicators::{
    discounted_payback_year, internal_rate_of_return, net_present_value, payback_year,
    yearly_savings,
};
use crate::sim::types::{SimulationConfig, YearlyRecord};
use crate::tariff::{TariffRegistry, TariffSnapshot};
use crate::units::{serialize_money, serialize_rate};

/// Errors raised before any simulation work starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViabilityError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },
    #[error("invalid field `{field}`: {message}")]
    InvalidField { field: String, message: String },
    #[error("unknown tariff \"{id}\", known tariffs: {}", known.join(", "))]
    UnknownTariff { id: String, known: Vec<String> },
}

/// Outcome of one viability run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub tariff_id: String,
    pub horizon_years: u32,
    #[serde(serialize_with = "serialize_money")]
    pub system_cost: f64,
    /// First year with non-negative cumulative cash flow; `None` when not reached.
    pub payback_year: Option<u32>,
    pub discounted_payback_year: Option<u32>,
    #[serde(serialize_with = "serialize_money")]
    pub npv: f64,
    #[serde(serialize_with = "serialize_rate")]
    pub irr: f64,
    /// False when the IRR search stopped without finding a root.
    pub irr_converged: bool,
    #[serde(serialize_with = "serialize_money")]
    pub total_saving: f64,
    #[serde(serialize_with = "serialize_money")]
    pub average_annual_saving: f64,
    #[serde(serialize_with = "serialize_money")]
    pub first_year_saving: f64,
    pub years: Vec<YearlyRecord>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn year_or_not_reached(year: Option<u32>) -> String {
            year.map_or_else(|| "not reached".to_string(), |y| y.to_string())
        }

        writeln!(f, "--- Viability Report ---")?;
        writeln!(f, "Tariff: {}", self.tariff_id)?;
        writeln!(f, "Horizon: {} years", self.horizon_years)?;
        writeln!(f, "System cost: {:.2}", self.system_cost)?;
        writeln!(f, "First year saving: {:.2}", self.first_year_saving)?;
        writeln!(f, "Total saving: {:.2}", self.total_saving)?;
        writeln!(f, "Average annual saving: {:.2}", self.average_annual_saving)?;
        writeln!(f, "NPV: {:.2}", self.npv)?;
        writeln!(
            f,
            "IRR: {:.2} %{}",
            self.irr * 100.0,
            if self.irr_converged { "" } else { " (not converged)" }
        )?;
        writeln!(f, "Payback year: {}", year_or_not_reached(self.payback_year))?;
        write!(
            f,
            "Discounted payback year: {}",
            year_or_not_reached(self.discounted_payback_year)
        )
    }
}

/// Runs the simulator and indicators for already-validated inputs.
pub fn compute(
    config: &SimulationConfig,
    monthly_consumption_kwh: f64,
    monthly_generation_kwh: f64,
    tariff: &TariffSnapshot,
    horizon_years: u32,
) -> Report {
    let years = simulate(
        monthly_consumption_kwh,
        monthly_generation_kwh,
        tariff,
        config,
        horizon_years,
    );
    let savings = yearly_savings(&years);
    let total_saving: f64 = savings.iter().sum();
    let average_annual_saving = if savings.is_empty() {
        0.0
    } else {
        total_saving / savings.len() as f64
    };
    let irr = internal_rate_of_return(config.system_cost, &savings);

    Report {
        tariff_id: tariff.id.clone(),
        horizon_years,
        system_cost: config.system_cost,
        payback_year: payback_year(&years),
        discounted_payback_year: discounted_payback_year(
            config.system_cost,
            &years,
            config.discount_rate,
        ),
        npv: net_present_value(config.system_cost, &savings, config.discount_rate),
        irr: irr.rate,
        irr_converged: irr.converged,
        total_saving,
        average_annual_saving,
        first_year_saving: savings.first().copied().unwrap_or(0.0),
        years,
    }
}

fn required<T: Copy>(value: Option<T>, field: &str) -> Result<T, ViabilityError> {
    value.ok_or_else(|| ViabilityError::MissingField {
        field: field.to_string(),
    })
}

/// Validates `scenario`, resolves its tariff from `registry` and computes the report.
///
/// # Errors
///
/// Returns `MissingField` when a required input is absent, `InvalidField` for the first range
/// violation reported by [`ScenarioConfig::validate`], and `UnknownTariff` when the tariff id is
/// not in `registry`.
pub fn compute_viability(
    scenario: &ScenarioConfig,
    registry: &TariffRegistry,
) -> Result<Report, ViabilityError> {
    let system_cost = required(scenario.system.cost, "system.cost")?;
    let consumption = required(
        scenario.system.monthly_consumption_kwh,
        "system.monthly_consumption_kwh",
    )?;
    let generation = required(
        scenario.system.monthly_generation_kwh,
        "system.monthly_generation_kwh",
    )?;
    let tariff_id = scenario
        .tariff
        .id
        .as_deref()
        .ok_or_else(|| ViabilityError::MissingField {
            field: "tariff.id".to_string(),
        })?;

    if let Some(err) = scenario.validate().into_iter().next() {
        return Err(ViabilityError::InvalidField {
            field: err.field,
            message: err.message,
        });
    }

    let tariff = registry.resolve(tariff_id)?;
    let config = SimulationConfig {
        system_cost,
        availability_charge_kwh: scenario.tariff.effective_availability_charge_kwh(),
        simultaneity_factor: scenario.tariff.simultaneity_factor,
        inflation_rate: scenario.finance.inflation_rate,
        discount_rate: scenario.finance.discount_rate,
        degradation_rate: scenario.finance.degradation_rate,
        operating_cost: scenario.finance.operating_cost,
        tariff_adjustment_rate: scenario.finance.tariff_adjustment_rate,
        installation_year: scenario.system.installation_year,
        credit_policy: scenario.credits.policy(),
    };
    let horizon = scenario.finance.horizon_years;

    info!(
        "Simulating {horizon} years on tariff {} ({consumption} kWh consumed, {generation} kWh generated per month)",
        tariff.id
    );
    let report = compute(&config, consumption, generation, tariff, horizon);
    info!(
        "NPV {:.2}, IRR {:.4}, payback {:?}",
        report.npv, report.irr, report.payback_year
    );
    Ok(report)
}
