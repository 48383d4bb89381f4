//! Utility tariff snapshots and the tiered final-price model.

pub mod registry;

use serde::{Deserialize, Serialize};

pub use registry::TariffRegistry;

/// Consumption-banded fee schedule.
///
/// Bands are ascending upper bounds (inclusive). Consumption above the last band falls into the
/// `above` tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierSchedule {
    /// `(upper_bound_kwh, value)` pairs in ascending bound order.
    pub bands: Vec<(f64, f64)>,
    /// Value applied above the last band.
    pub above: f64,
}

impl TierSchedule {
    /// Upper bounds shared by the standard Rio de Janeiro schedules.
    pub const STANDARD_BOUNDS: [f64; 7] = [50.0, 100.0, 140.0, 200.0, 300.0, 400.0, 500.0];

    /// Builds a schedule over [`Self::STANDARD_BOUNDS`].
    pub fn standard(values: [f64; 7], above: f64) -> Self {
        Self {
            bands: Self::STANDARD_BOUNDS.into_iter().zip(values).collect(),
            above,
        }
    }

    /// Flat municipal public-lighting fee (COSIP) per consumption band.
    pub fn standard_cosip() -> Self {
        Self::standard([0.0, 6.22, 8.86, 12.44, 18.66, 24.88, 31.10], 31.86)
    }

    /// State value-added tax (ICMS) fraction per consumption band.
    pub fn standard_icms() -> Self {
        Self::standard([0.0, 0.18, 0.20, 0.20, 0.31, 0.31, 0.31], 0.31)
    }

    /// Returns the value of the first band whose upper bound `consumption_kwh` does not exceed.
    ///
    /// Zero or negative consumption lands in the lowest band.
    pub fn lookup(&self, consumption_kwh: f64) -> f64 {
        self.bands
            .iter()
            .find(|(upper, _)| consumption_kwh <= *upper)
            .map_or(self.above, |(_, value)| *value)
    }
}

/// Pricing components of one distribution utility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TariffSnapshot {
    /// Registry identifier (e.g. `"light"`).
    pub id: String,
    /// Display name of the utility.
    pub name: String,
    /// Base tariff (currency/kWh). Also prices the availability charge.
    pub base: f64,
    /// Transmission/distribution component, TUSD (currency/kWh).
    pub tusd: f64,
    /// Energy component, TE (currency/kWh).
    pub te: f64,
    /// Distribution-wire unit charge, "Fio B" (currency/kWh).
    pub fio_b: f64,
    /// PIS tax fraction.
    pub pis: f64,
    /// COFINS tax fraction.
    pub cofins: f64,
    /// Percentage tax keyed by consumption band.
    pub icms: TierSchedule,
    /// Flat lighting fee keyed by consumption band.
    pub cosip: TierSchedule,
}

impl TariffSnapshot {
    /// Final price per kWh for a monthly consumption of `consumption_kwh`.
    ///
    /// `(base + tusd + te) × (1 + pis + cofins) × (1 + icms) + cosip`, with both tiered values
    /// looked up at `consumption_kwh`.
    pub fn final_unit_price(&self, consumption_kwh: f64) -> f64 {
        let energy = self.base + self.tusd + self.te;
        let federal_taxes = 1.0 + self.pis + self.cofins;
        let state_tax = 1.0 + self.icms.lookup(consumption_kwh);
        energy * federal_taxes * state_tax + self.cosip.lookup(consumption_kwh)
    }
}
