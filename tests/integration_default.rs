//! Integration tests for the library entry points.

mod common;

use float_cmp::assert_approx_eq;
use solar_viability::sim::engine::simulate;
use solar_viability::sim::indicators::net_present_value;
use solar_viability::sim::types::SimulationConfig;
use solar_viability::tariff::TariffRegistry;
use solar_viability::viability::{ViabilityError, compute, compute_viability};

/// Steady household on the flat tariff: 475 saved every month, nothing grows or degrades.
fn steady_config(system_cost: f64) -> SimulationConfig {
    SimulationConfig {
        inflation_rate: 0.0,
        degradation_rate: 0.0,
        discount_rate: 0.08,
        installation_year: 2022,
        ..SimulationConfig::new(system_cost, 2022)
    }
}

#[test]
fn steady_household_pays_back_in_second_year() {
    let tariff = common::flat_tariff("flat");
    let report = compute(&steady_config(11_400.0), 500.0, 1000.0, &tariff, 10);

    assert_eq!(report.years.len(), 10);
    for year in &report.years {
        assert_eq!(year.saving, 5700.0);
    }
    assert_eq!(report.payback_year, Some(2));
    assert_eq!(report.first_year_saving, 5700.0);
    assert_eq!(report.total_saving, 57_000.0);
    assert_approx_eq!(f64, report.npv, 26_847.463_973_966, epsilon = 1e-6);
    assert!(report.irr_converged);
    assert_approx_eq!(f64, report.irr, 0.490_777_657, epsilon = 1e-4);
    assert!(report.discounted_payback_year >= report.payback_year);
}

#[test]
fn no_generation_never_pays_back() {
    let tariff = common::flat_tariff("flat");
    let report = compute(&steady_config(5_000.0), 500.0, 0.0, &tariff, 5);
    // Availability charge makes every month 25 more expensive.
    assert!(report.years.iter().all(|y| y.saving < 0.0));
    assert_eq!(report.payback_year, None);
    assert_eq!(report.discounted_payback_year, None);
    assert!(report.npv < -5_000.0);
}

#[test]
fn npv_at_zero_rate_equals_cost_plus_savings() {
    let registry = TariffRegistry::builtin();
    let tariff = registry.resolve("enel-rj").expect("built-in tariff");
    let config = SimulationConfig {
        discount_rate: 0.0,
        ..common::reference_config()
    };
    let report = compute(&config, 450.0, 400.0, tariff, 15);
    let savings: Vec<f64> = report.years.iter().map(|y| y.saving).collect();
    let expected = -config.system_cost + savings.iter().sum::<f64>();
    assert_eq!(net_present_value(config.system_cost, &savings, 0.0), expected);
    assert_eq!(report.npv, expected);
}

#[test]
fn horizon_extension_keeps_earlier_years() {
    let registry = TariffRegistry::builtin();
    let short = compute_viability(&common::baseline_scenario(7), &registry).expect("valid");
    let long = compute_viability(&common::baseline_scenario(20), &registry).expect("valid");
    assert_eq!(&long.years[..7], &short.years[..]);
}

#[test]
fn light_reference_run_is_reproducible() {
    let registry = TariffRegistry::builtin();
    let scenario = common::baseline_scenario(10);
    let first = compute_viability(&scenario, &registry).expect("valid");
    let second = compute_viability(&scenario, &registry).expect("valid");
    assert_eq!(first, second);
    assert_eq!(first.payback_year, Some(1));
    assert_eq!(first.npv, 1_997_315.585_301_554_3);

    let direct = simulate(
        800.0,
        680.0,
        registry.resolve("light").expect("built-in tariff"),
        &common::reference_config(),
        10,
    );
    assert_eq!(first.years, direct);
}

#[test]
fn zero_horizon_reports_only_the_investment() {
    let registry = TariffRegistry::builtin();
    let report = compute_viability(&common::baseline_scenario(0), &registry).expect("valid");
    assert!(report.years.is_empty());
    assert_eq!(report.npv, -25_000.0);
    assert_eq!(report.payback_year, None);
}

#[test]
fn fabricated_registry_replaces_builtin() {
    let mut scenario = common::baseline_scenario(3);
    scenario.tariff.id = Some("flat".to_string());
    let report = compute_viability(&scenario, &common::flat_registry("flat")).expect("valid");
    assert_eq!(report.tariff_id, "flat");

    let err = compute_viability(&common::baseline_scenario(3), &common::flat_registry("flat"))
        .expect_err("light is not in the fabricated registry");
    assert_eq!(
        err,
        ViabilityError::UnknownTariff {
            id: "light".to_string(),
            known: vec!["flat".to_string()],
        }
    );
}

#[test]
fn expiring_credits_lose_surplus_energy() {
    let registry = TariffRegistry::builtin();
    let mut unlimited = common::baseline_scenario(10);
    unlimited.system.monthly_generation_kwh = Some(2_000.0);
    let mut expiring = unlimited.clone();
    expiring.credits.expiry_months = Some(60);

    let a = compute_viability(&unlimited, &registry).expect("valid");
    let b = compute_viability(&expiring, &registry).expect("valid");
    let expired: f64 = b
        .years
        .iter()
        .flat_map(|y| &y.months)
        .map(|m| m.credits_expired_kwh)
        .sum();
    assert!(expired > 0.0);
    assert!(b.total_saving <= a.total_saving);
}
