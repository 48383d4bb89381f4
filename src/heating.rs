//! Solar water-heating sizing.
//!
//! Estimates daily hot-water demand from household fixtures, picks commercial boiler and collector
//! sizes, and estimates the energy saved against electric or gas heating.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::units::serialize_money;

/// Shower flow (litres per minute).
pub const SHOWER_LITRES_PER_MINUTE: f64 = 7.0;
/// Washbasin use (litres per person per day).
pub const WASHBASIN_LITRES_PER_PERSON: f64 = 20.0;
/// Kitchen sink use (litres per person per day).
pub const KITCHEN_LITRES_PER_PERSON: f64 = 25.0;
/// Single bathtub fill (litres).
pub const BATHTUB_SINGLE_LITRES: f64 = 150.0;
/// Double bathtub fill (litres).
pub const BATHTUB_DOUBLE_LITRES: f64 = 300.0;
/// Bidet shower use (litres per day).
pub const BIDET_SHOWER_LITRES: f64 = 10.0;
/// Dishwasher cycle (litres).
pub const DISHWASHER_LITRES_PER_CYCLE: f64 = 30.0;
/// Washing machine cycle (litres).
pub const WASHING_MACHINE_LITRES_PER_CYCLE: f64 = 50.0;

/// Commercial boiler volumes (litres), ascending.
pub const BOILER_VOLUMES: [u32; 10] = [100, 200, 300, 400, 500, 600, 800, 1000, 1500, 2000];
/// Commercial collector areas (m²), ascending.
pub const COLLECTOR_AREAS: [f64; 10] = [1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0];

/// Water temperature rise assumed for the energy estimate (°C).
const TEMPERATURE_RISE_C: f64 = 25.0;
/// Specific heat of water (J/kg°C).
const WATER_SPECIFIC_HEAT: f64 = 4186.0;
const JOULES_PER_KWH: f64 = 3_600_000.0;
/// Share of the heating demand covered by the solar system.
const SOLAR_EFFICIENCY: f64 = 0.8;
/// Collector area reduction for evacuated tubes.
const EVACUATED_TUBE_FACTOR: f64 = 0.8;

/// Geographic region, which sets the insolation factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    Norte,
    Nordeste,
    CentroOeste,
    #[default]
    Sudeste,
    Sul,
}

impl Region {
    /// Collector area per litre of boiler (m²/L).
    pub fn insolation_factor(self) -> f64 {
        match self {
            Self::Norte | Self::Nordeste => 0.04,
            Self::CentroOeste => 0.045,
            Self::Sudeste => 0.05,
            Self::Sul => 0.06,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CollectorKind {
    #[default]
    FlatPlate,
    EvacuatedTube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BathtubKind {
    Single,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SupplyPressure {
    #[default]
    Low,
    High,
}

/// Energy currently used to heat water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EnergySource {
    #[default]
    Electric,
    Gas,
}

impl EnergySource {
    /// Average cost per kWh (or kWh equivalent).
    pub fn unit_cost(self) -> f64 {
        match self {
            Self::Electric => 0.85,
            Self::Gas => 0.45,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoilerKind {
    LowPressure,
    HighPressure,
}

/// Household description used for sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatingInput {
    pub people: u32,
    pub shower_minutes: u32,
    pub washbasin: bool,
    pub kitchen_sink: bool,
    pub bathtub: Option<BathtubKind>,
    pub bidet_shower: bool,
    pub dishwasher_cycles: u32,
    pub washing_machine_cycles: u32,
    pub bathrooms: u32,
    pub high_flow_shower: bool,
    pub supply_pressure: SupplyPressure,
    pub region: Region,
    pub collector: CollectorKind,
    pub energy_source: EnergySource,
    /// Days of storage autonomy.
    pub autonomy_days: f64,
    pub target_temperature_c: f64,
}

impl Default for HeatingInput {
    fn default() -> Self {
        Self {
            people: 1,
            shower_minutes: 10,
            washbasin: true,
            kitchen_sink: false,
            bathtub: None,
            bidet_shower: false,
            dishwasher_cycles: 0,
            washing_machine_cycles: 0,
            bathrooms: 1,
            high_flow_shower: false,
            supply_pressure: SupplyPressure::default(),
            region: Region::default(),
            collector: CollectorKind::default(),
            energy_source: EnergySource::default(),
            autonomy_days: 1.5,
            target_temperature_c: 45.0,
        }
    }
}

impl HeatingInput {
    /// Parses a household description from TOML.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or names an unknown region or collector.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Checks value ranges and returns every violation found.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.people < 1 {
            errors.push(ConfigError::new("people", "must be >= 1"));
        }
        if !(1..=60).contains(&self.shower_minutes) {
            errors.push(ConfigError::new("shower_minutes", "must be in [1, 60]"));
        }
        if !(30.0..=60.0).contains(&self.target_temperature_c) {
            errors.push(ConfigError::new(
                "target_temperature_c",
                "must be in [30, 60] °C",
            ));
        }
        if !(self.autonomy_days.is_finite() && self.autonomy_days > 0.0) {
            errors.push(ConfigError::new("autonomy_days", "must be > 0"));
        }
        errors
    }
}

/// Daily hot-water demand per use (litres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DemandBreakdown {
    pub shower: f64,
    pub washbasin: f64,
    pub kitchen: f64,
    pub bathtub: f64,
    pub bidet_shower: f64,
    pub dishwasher: f64,
    pub washing_machine: f64,
}

impl DemandBreakdown {
    pub fn from_input(input: &HeatingInput) -> Self {
        let people = f64::from(input.people);
        let enabled = |on: bool, litres: f64| if on { litres } else { 0.0 };
        Self {
            shower: people * f64::from(input.shower_minutes) * SHOWER_LITRES_PER_MINUTE,
            washbasin: enabled(input.washbasin, people * WASHBASIN_LITRES_PER_PERSON),
            kitchen: enabled(input.kitchen_sink, people * KITCHEN_LITRES_PER_PERSON),
            bathtub: match input.bathtub {
                None => 0.0,
                Some(BathtubKind::Single) => BATHTUB_SINGLE_LITRES,
                Some(BathtubKind::Double) => BATHTUB_DOUBLE_LITRES,
            },
            bidet_shower: enabled(input.bidet_shower, BIDET_SHOWER_LITRES),
            dishwasher: f64::from(input.dishwasher_cycles) * DISHWASHER_LITRES_PER_CYCLE,
            washing_machine: f64::from(input.washing_machine_cycles)
                * WASHING_MACHINE_LITRES_PER_CYCLE,
        }
    }

    pub fn total(&self) -> f64 {
        self.shower
            + self.washbasin
            + self.kitchen
            + self.bathtub
            + self.bidet_shower
            + self.dishwasher
            + self.washing_machine
    }
}

/// Heating energy and the savings it represents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergySavings {
    #[serde(serialize_with = "serialize_money")]
    pub daily_kwh: f64,
    #[serde(serialize_with = "serialize_money")]
    pub monthly_kwh: f64,
    #[serde(serialize_with = "serialize_money")]
    pub yearly_kwh: f64,
    #[serde(serialize_with = "serialize_money")]
    pub monthly_saving: f64,
    #[serde(serialize_with = "serialize_money")]
    pub yearly_saving: f64,
    pub unit_cost: f64,
}

impl EnergySavings {
    pub fn estimate(daily_litres: f64, source: EnergySource) -> Self {
        let daily_kwh = daily_litres * WATER_SPECIFIC_HEAT * TEMPERATURE_RISE_C / JOULES_PER_KWH;
        let monthly_kwh = daily_kwh * 30.0;
        let yearly_kwh = daily_kwh * 365.0;
        let unit_cost = source.unit_cost();
        Self {
            daily_kwh,
            monthly_kwh,
            yearly_kwh,
            monthly_saving: monthly_kwh * unit_cost * SOLAR_EFFICIENCY,
            yearly_saving: yearly_kwh * unit_cost * SOLAR_EFFICIENCY,
            unit_cost,
        }
    }
}

/// Sized installation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatingSizing {
    #[serde(serialize_with = "serialize_money")]
    pub daily_demand_litres: f64,
    pub breakdown: DemandBreakdown,
    pub boiler_litres: u32,
    pub boiler_kind: BoilerKind,
    pub collector_area_m2: f64,
    pub collector: CollectorKind,
    pub needs_pressurizer: bool,
    pub savings: EnergySavings,
}

impl fmt::Display for HeatingSizing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Water Heating Sizing ---")?;
        writeln!(f, "Daily demand: {:.2} L", self.daily_demand_litres)?;
        writeln!(f, "Boiler: {} L ({:?})", self.boiler_litres, self.boiler_kind)?;
        writeln!(
            f,
            "Collector area: {:.1} m2 ({:?})",
            self.collector_area_m2, self.collector
        )?;
        writeln!(
            f,
            "Pressurizer: {}",
            if self.needs_pressurizer { "yes" } else { "no" }
        )?;
        writeln!(f, "Monthly energy: {:.2} kWh", self.savings.monthly_kwh)?;
        writeln!(f, "Monthly saving: {:.2}", self.savings.monthly_saving)?;
        write!(f, "Yearly saving: {:.2}", self.savings.yearly_saving)
    }
}

/// Smallest commercial boiler holding `daily_litres × autonomy_days`, else the largest.
pub fn boiler_volume(daily_litres: f64, autonomy_days: f64) -> u32 {
    let needed = daily_litres * autonomy_days;
    BOILER_VOLUMES
        .into_iter()
        .find(|&v| f64::from(v) >= needed)
        .unwrap_or(BOILER_VOLUMES[BOILER_VOLUMES.len() - 1])
}

/// Smallest commercial collector area for `boiler_litres`, else the largest.
pub fn collector_area(boiler_litres: u32, region: Region, collector: CollectorKind) -> f64 {
    let factor = match collector {
        CollectorKind::FlatPlate => region.insolation_factor(),
        CollectorKind::EvacuatedTube => region.insolation_factor() * EVACUATED_TUBE_FACTOR,
    };
    let needed = f64::from(boiler_litres) * factor;
    COLLECTOR_AREAS
        .into_iter()
        .find(|&a| a >= needed)
        .unwrap_or(COLLECTOR_AREAS[COLLECTOR_AREAS.len() - 1])
}

/// Whether the installation needs a pressurizer pump.
pub fn needs_pressurizer(input: &HeatingInput) -> bool {
    input.supply_pressure == SupplyPressure::Low
        || input.bathrooms > 2
        || input.bathtub.is_some()
        || input.high_flow_shower
}

/// Sizes a solar water-heating installation.
///
/// # Errors
///
/// Returns every range violation from [`HeatingInput::validate`].
pub fn size_heating(input: &HeatingInput) -> Result<HeatingSizing, Vec<ConfigError>> {
    let errors = input.validate();
    if !errors.is_empty() {
        return Err(errors);
    }

    let breakdown = DemandBreakdown::from_input(input);
    let daily = breakdown.total();
    let boiler_litres = boiler_volume(daily, input.autonomy_days);
    let needs_pressurizer = needs_pressurizer(input);
    let boiler_kind = if input.supply_pressure == SupplyPressure::High || needs_pressurizer {
        BoilerKind::HighPressure
    } else {
        BoilerKind::LowPressure
    };

    Ok(HeatingSizing {
        daily_demand_litres: daily,
        breakdown,
        boiler_litres,
        boiler_kind,
        collector_area_m2: collector_area(boiler_litres, input.region, input.collector),
        collector: input.collector,
        needs_pressurizer,
        savings: EnergySavings::estimate(daily, input.energy_source),
    })
}
