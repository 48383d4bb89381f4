//! Core simulation types: configuration, monthly records, and yearly records.

use std::fmt;

use serde::Serialize;

use super::credits::CreditPolicy;
use crate::units::{serialize_money, serialize_rate};

/// Default projection horizon in years.
pub const DEFAULT_HORIZON_YEARS: u32 = 25;

/// Months per simulated year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Immutable inputs of one simulation run.
///
/// Rates are annual fractions. Inflation is not range-checked here and may exceed 1.
///
/// # Examples
///
/// ```
/// use solar_viability::sim::types::SimulationConfig;
///
/// let cfg = SimulationConfig::new(25_000.0, 2024);
/// assert_eq!(cfg.system_cost, 25_000.0);
/// assert_eq!(cfg.installation_year, 2024);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    /// Up-front system cost.
    pub system_cost: f64,
    /// Fixed availability fee expressed in kWh, billed at the base tariff every month.
    pub availability_charge_kwh: f64,
    /// Fraction of consumption servable directly by simultaneous generation.
    pub simultaneity_factor: f64,
    /// Annual growth applied to consumption (monthly step `inflation / 12`).
    pub inflation_rate: f64,
    /// Annual discount rate for NPV and discounted payback.
    pub discount_rate: f64,
    /// Annual PV output degradation (monthly step `degradation / 12`).
    pub degradation_rate: f64,
    /// Annual operating and maintenance cost.
    pub operating_cost: f64,
    /// Annual tariff increase, compounded monthly from the first month. Zero keeps prices fixed.
    pub tariff_adjustment_rate: f64,
    /// Calendar year the system was connected.
    pub installation_year: i32,
    /// How injected energy credits age.
    pub credit_policy: CreditPolicy,
}

impl SimulationConfig {
    /// Creates a configuration with the given cost and installation year and default rates.
    pub fn new(system_cost: f64, installation_year: i32) -> Self {
        Self {
            system_cost,
            availability_charge_kwh: 50.0,
            simultaneity_factor: 0.3,
            inflation_rate: 0.04,
            discount_rate: 0.08,
            degradation_rate: 0.005,
            operating_cost: 0.0,
            tariff_adjustment_rate: 0.0,
            installation_year,
            credit_policy: CreditPolicy::Unlimited,
        }
    }
}

/// One simulated month. Values are exact; serialization rounds them for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRecord {
    /// 1-based projection year.
    pub year_index: u32,
    /// Month within the year (1 to 12).
    pub month: u32,
    #[serde(serialize_with = "serialize_money")]
    pub consumption_kwh: f64,
    #[serde(serialize_with = "serialize_money")]
    pub generation_kwh: f64,
    /// Generation consumed on site without crossing the meter.
    #[serde(serialize_with = "serialize_money")]
    pub self_consumed_kwh: f64,
    /// Surplus generation exported to the grid.
    #[serde(serialize_with = "serialize_money")]
    pub injected_kwh: f64,
    /// Energy bought from the grid after credits.
    #[serde(serialize_with = "serialize_money")]
    pub purchased_kwh: f64,
    #[serde(serialize_with = "serialize_money")]
    pub credits_used_kwh: f64,
    /// Credits that aged out this month (always zero under the unlimited policy).
    #[serde(serialize_with = "serialize_money")]
    pub credits_expired_kwh: f64,
    /// Credit balance after this month.
    #[serde(serialize_with = "serialize_money")]
    pub credit_balance_kwh: f64,
    #[serde(serialize_with = "serialize_money")]
    pub cost_without_system: f64,
    #[serde(serialize_with = "serialize_money")]
    pub cost_with_system: f64,
    /// Fio B charge on injected energy.
    #[serde(serialize_with = "serialize_money")]
    pub fio_b_cost: f64,
    #[serde(serialize_with = "serialize_money")]
    pub saving: f64,
    /// Net-metering compensation fraction applied this month.
    #[serde(serialize_with = "serialize_rate")]
    pub net_metering_fraction: f64,
}

/// Twelve months aggregated, with the running cash position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyRecord {
    /// 1-based projection year.
    pub year_index: u32,
    pub calendar_year: i32,
    #[serde(serialize_with = "serialize_money")]
    pub saving: f64,
    #[serde(serialize_with = "serialize_money")]
    pub operating_cost: f64,
    /// `-system_cost` plus every year's `saving - operating_cost` so far.
    #[serde(serialize_with = "serialize_money")]
    pub cumulative_cash_flow: f64,
    #[serde(serialize_with = "serialize_money")]
    pub consumption_kwh: f64,
    #[serde(serialize_with = "serialize_money")]
    pub generation_kwh: f64,
    #[serde(serialize_with = "serialize_money")]
    pub self_consumed_kwh: f64,
    #[serde(serialize_with = "serialize_money")]
    pub injected_kwh: f64,
    pub months: Vec<MonthlyRecord>,
}

impl YearlyRecord {
    /// Net cash flow of the year: saving minus operating cost.
    pub fn net_cash_flow(&self) -> f64 {
        self.saving - self.operating_cost
    }
}

impl fmt::Display for YearlyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "year {:>2} ({}) | saving={:>10.2}  cumulative={:>11.2} | \
             cons={:>8.1} kWh  gen={:>8.1} kWh  self={:>8.1} kWh  inj={:>8.1} kWh",
            self.year_index,
            self.calendar_year,
            self.saving,
            self.cumulative_cash_flow,
            self.consumption_kwh,
            self.generation_kwh,
            self.self_consumed_kwh,
            self.injected_kwh,
        )
    }
}
