//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::credits::CreditPolicy;
use crate::sim::types::DEFAULT_HORIZON_YEARS;

/// Longest projection accepted from a scenario.
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Top-level scenario configuration parsed from TOML.
///
/// Every section has defaults. The `[system]` inputs and `tariff.id` have no sensible default and
/// stay unset unless given; the orchestrator rejects a scenario that leaves them out. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use [`ScenarioConfig::baseline`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Installation under study.
    #[serde(default)]
    pub system: SystemConfig,
    /// Utility tariff and grid connection.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Rates and horizon of the projection.
    #[serde(default)]
    pub finance: FinanceConfig,
    /// Energy-credit expiry.
    #[serde(default)]
    pub credits: CreditsConfig,
}

/// Installation inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    /// Up-front system cost (required).
    pub cost: Option<f64>,
    /// Monthly consumption in the first month (kWh, required).
    pub monthly_consumption_kwh: Option<f64>,
    /// Monthly generation in the first month (kWh, required).
    pub monthly_generation_kwh: Option<f64>,
    /// Calendar year of connection.
    pub installation_year: i32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            cost: None,
            monthly_consumption_kwh: None,
            monthly_generation_kwh: None,
            installation_year: 2024,
        }
    }
}

/// Grid connection type, which sets the default availability charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    SinglePhase,
    #[default]
    TwoPhase,
    ThreePhase,
}

impl ConnectionType {
    /// Minimum billed energy for this connection (kWh per month).
    pub fn availability_charge_kwh(self) -> f64 {
        match self {
            Self::SinglePhase => 30.0,
            Self::TwoPhase => 50.0,
            Self::ThreePhase => 100.0,
        }
    }
}

/// Tariff selection and metering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Registry identifier of the utility tariff (required).
    pub id: Option<String>,
    /// Grid connection type.
    pub connection: ConnectionType,
    /// Overrides the connection's availability charge (kWh).
    pub availability_charge_kwh: Option<f64>,
    /// Fraction of consumption served by simultaneous generation (0.0–1.0).
    pub simultaneity_factor: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            id: None,
            connection: ConnectionType::default(),
            availability_charge_kwh: None,
            simultaneity_factor: 0.3,
        }
    }
}

impl TariffConfig {
    /// Availability charge in kWh: the explicit override, else the connection default.
    pub fn effective_availability_charge_kwh(&self) -> f64 {
        self.availability_charge_kwh
            .unwrap_or_else(|| self.connection.availability_charge_kwh())
    }
}

/// Rates and horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinanceConfig {
    /// Annual consumption growth.
    pub inflation_rate: f64,
    /// Annual discount rate (0.0–1.0).
    pub discount_rate: f64,
    /// Annual PV degradation (0.0–1.0).
    pub degradation_rate: f64,
    /// Annual operating and maintenance cost.
    pub operating_cost: f64,
    /// Annual tariff increase, compounded monthly. Off by default.
    pub tariff_adjustment_rate: f64,
    /// Years to project.
    pub horizon_years: u32,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            inflation_rate: 0.04,
            discount_rate: 0.08,
            degradation_rate: 0.005,
            operating_cost: 0.0,
            tariff_adjustment_rate: 0.0,
            horizon_years: DEFAULT_HORIZON_YEARS,
        }
    }
}

/// Energy-credit expiry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreditsConfig {
    /// Months after which injected credits expire. Unset means they never expire.
    pub expiry_months: Option<u32>,
}

impl CreditsConfig {
    /// Credit policy selected by this section.
    pub fn policy(&self) -> CreditPolicy {
        self.expiry_months
            .map_or(CreditPolicy::Unlimited, |months| CreditPolicy::Expiring { months })
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"finance.discount_rate"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub(crate) fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: Light 2025, 800 kWh consumption, 680 kWh generation.
    pub fn baseline() -> Self {
        Self {
            system: SystemConfig {
                cost: Some(25_000.0),
                monthly_consumption_kwh: Some(800.0),
                monthly_generation_kwh: Some(680.0),
                installation_year: 2024,
            },
            tariff: TariffConfig {
                id: Some("light".to_string()),
                ..TariffConfig::default()
            },
            finance: FinanceConfig::default(),
            credits: CreditsConfig::default(),
        }
    }

    /// Returns the grandfathered preset: a 2022 installation exempt from the Fio B charge.
    pub fn grandfathered() -> Self {
        let mut cfg = Self::baseline();
        cfg.system.installation_year = 2022;
        cfg
    }

    /// Returns the expiring-credits preset: oversized generation with credits lapsing after
    /// 60 months.
    pub fn expiring_credits() -> Self {
        let mut cfg = Self::baseline();
        cfg.system.monthly_generation_kwh = Some(1_800.0);
        cfg.system.cost = Some(48_000.0);
        cfg.credits.expiry_months = Some(60);
        cfg
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "grandfathered", "expiring_credits"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "grandfathered" => Ok(Self::grandfathered()),
            "expiring_credits" => Ok(Self::expiring_credits()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates value ranges and returns every violation found.
    ///
    /// Missing required inputs are not reported here; see
    /// [`crate::viability::compute_viability`].
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.system;
        if let Some(cost) = s.cost {
            if !(cost.is_finite() && cost > 0.0) {
                errors.push(ConfigError::new("system.cost", "must be > 0"));
            }
        }
        for (field, value) in [
            ("system.monthly_consumption_kwh", s.monthly_consumption_kwh),
            ("system.monthly_generation_kwh", s.monthly_generation_kwh),
        ] {
            if value.is_some_and(|v| !(v.is_finite() && v >= 0.0)) {
                errors.push(ConfigError::new(field, "must be >= 0"));
            }
        }

        let t = &self.tariff;
        if !(0.0..=1.0).contains(&t.simultaneity_factor) {
            errors.push(ConfigError::new(
                "tariff.simultaneity_factor",
                "must be in [0.0, 1.0]",
            ));
        }
        if t.availability_charge_kwh.is_some_and(|v| !(v.is_finite() && v >= 0.0)) {
            errors.push(ConfigError::new(
                "tariff.availability_charge_kwh",
                "must be >= 0",
            ));
        }

        let f = &self.finance;
        for (field, value) in [
            ("finance.discount_rate", f.discount_rate),
            ("finance.degradation_rate", f.degradation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
            }
        }
        if !(f.inflation_rate.is_finite() && f.inflation_rate >= 0.0) {
            errors.push(ConfigError::new("finance.inflation_rate", "must be >= 0"));
        }
        if !(f.operating_cost.is_finite() && f.operating_cost >= 0.0) {
            errors.push(ConfigError::new("finance.operating_cost", "must be >= 0"));
        }
        if !(f.tariff_adjustment_rate.is_finite() && f.tariff_adjustment_rate >= 0.0) {
            errors.push(ConfigError::new("finance.tariff_adjustment_rate", "must be >= 0"));
        }
        if f.horizon_years > MAX_HORIZON_YEARS {
            errors.push(ConfigError::new(
                "finance.horizon_years",
                format!("must be <= {MAX_HORIZON_YEARS}"),
            ));
        }

        if self.credits.expiry_months == Some(0) {
            errors.push(ConfigError::new("credits.expiry_months", "must be > 0"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let e = ScenarioConfig::from_preset("nonexistent").expect_err("must fail");
        assert!(e.message.contains("unknown preset"));
        assert!(e.message.contains("grandfathered"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[system]
cost = 18000.0
monthly_consumption_kwh = 450.0
monthly_generation_kwh = 400.0
installation_year = 2025

[tariff]
id = "enel-rj"
connection = "three_phase"
simultaneity_factor = 0.4

[finance]
inflation_rate = 0.05
discount_rate = 0.1
degradation_rate = 0.007
operating_cost = 250.0
tariff_adjustment_rate = 0.06
horizon_years = 20

[credits]
expiry_months = 60
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).expect("valid TOML should parse");
        assert_eq!(cfg.system.cost, Some(18000.0));
        assert_eq!(cfg.tariff.id.as_deref(), Some("enel-rj"));
        assert_eq!(cfg.tariff.connection, ConnectionType::ThreePhase);
        assert_eq!(cfg.tariff.effective_availability_charge_kwh(), 100.0);
        assert_eq!(cfg.finance.horizon_years, 20);
        assert_eq!(cfg.finance.tariff_adjustment_rate, 0.06);
        assert_eq!(cfg.credits.policy(), CreditPolicy::Expiring { months: 60 });
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[finance]
horizon_years = 10
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        assert!(ScenarioConfig::from_toml_str("[battery]\ncapacity_kwh = 10.0\n").is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[finance]
discount_rate = 0.12
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).expect("partial TOML should parse");
        assert_eq!(cfg.finance.discount_rate, 0.12);
        // horizon kept default
        assert_eq!(cfg.finance.horizon_years, DEFAULT_HORIZON_YEARS);
        assert_eq!(cfg.finance.tariff_adjustment_rate, 0.0);
        // required inputs stay unset
        assert_eq!(cfg.system.cost, None);
        assert_eq!(cfg.tariff.id, None);
        assert_eq!(cfg.tariff.effective_availability_charge_kwh(), 50.0);
        assert_eq!(cfg.credits.policy(), CreditPolicy::Unlimited);
    }

    #[test]
    fn availability_override_wins_over_connection() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.tariff.connection = ConnectionType::SinglePhase;
        assert_eq!(cfg.tariff.effective_availability_charge_kwh(), 30.0);
        cfg.tariff.availability_charge_kwh = Some(75.0);
        assert_eq!(cfg.tariff.effective_availability_charge_kwh(), 75.0);
    }

    #[test]
    fn validation_catches_out_of_range_rates() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.tariff.simultaneity_factor = 1.5;
        cfg.finance.discount_rate = -0.1;
        cfg.finance.horizon_years = 500;
        cfg.finance.tariff_adjustment_rate = f64::NAN;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "finance.tariff_adjustment_rate"));
        assert!(errors.iter().any(|e| e.field == "tariff.simultaneity_factor"));
        assert!(errors.iter().any(|e| e.field == "finance.discount_rate"));
        assert!(errors.iter().any(|e| e.field == "finance.horizon_years"));
    }

    #[test]
    fn validation_allows_inflation_above_one() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.finance.inflation_rate = 1.5;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validation_catches_non_positive_cost_and_zero_expiry() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.system.cost = Some(0.0);
        cfg.credits.expiry_months = Some(0);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "system.cost"));
        assert!(errors.iter().any(|e| e.field == "credits.expiry_months"));
    }

    #[test]
    fn expiring_preset_has_larger_generation() {
        let base = ScenarioConfig::baseline();
        let exp = ScenarioConfig::expiring_credits();
        assert!(exp.system.monthly_generation_kwh > base.system.monthly_generation_kwh);
        assert_eq!(exp.credits.policy(), CreditPolicy::Expiring { months: 60 });
    }
}
