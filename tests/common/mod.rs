//! Shared test fixtures for integration tests.

use solar_viability::config::ScenarioConfig;
use solar_viability::sim::types::SimulationConfig;
use solar_viability::tariff::{TariffRegistry, TariffSnapshot, TierSchedule};

/// Reference installation: 25 000 system, installed 2024, default rates.
pub fn reference_config() -> SimulationConfig {
    SimulationConfig::new(25_000.0, 2024)
}

/// Baseline scenario limited to `horizon_years`.
pub fn baseline_scenario(horizon_years: u32) -> ScenarioConfig {
    let mut scenario = ScenarioConfig::baseline();
    scenario.finance.horizon_years = horizon_years;
    scenario
}

/// Untaxed tariff with a constant unit price of 1.0 and no flat fee.
pub fn flat_tariff(id: &str) -> TariffSnapshot {
    TariffSnapshot {
        id: id.to_string(),
        name: format!("Flat {id}"),
        base: 0.5,
        tusd: 0.25,
        te: 0.25,
        fio_b: 0.1,
        pis: 0.0,
        cofins: 0.0,
        icms: TierSchedule::standard([0.0; 7], 0.0),
        cosip: TierSchedule::standard([0.0; 7], 0.0),
    }
}

/// Registry holding only [`flat_tariff`] under `id`.
pub fn flat_registry(id: &str) -> TariffRegistry {
    TariffRegistry::new([flat_tariff(id)])
}
