//! Month-by-month cash-flow simulator.

use log::debug;

use super::credits::CreditLedger;
use super::net_metering::compensation_fraction;
use super::types::{MONTHS_PER_YEAR, MonthlyRecord, SimulationConfig, YearlyRecord};
use crate::tariff::TariffSnapshot;

/// State carried from one month to the next within a single run.
#[derive(Debug, Clone)]
struct RunState {
    consumption_kwh: f64,
    generation_kwh: f64,
    ledger: CreditLedger,
    /// 1-based absolute month of the next step.
    month_number: u32,
    cumulative_cash_flow: f64,
}

/// Cash-flow simulator bound to one tariff and configuration.
///
/// Each run folds over an owned state, so independent runs share nothing but the borrowed
/// read-only inputs.
#[derive(Debug, Clone, Copy)]
pub struct CashFlowSimulator<'a> {
    tariff: &'a TariffSnapshot,
    config: &'a SimulationConfig,
}

impl<'a> CashFlowSimulator<'a> {
    /// Creates a simulator over `tariff` and `config`.
    pub fn new(tariff: &'a TariffSnapshot, config: &'a SimulationConfig) -> Self {
        Self { tariff, config }
    }

    /// Simulates `horizon_years` years starting from the given monthly consumption and generation.
    ///
    /// # Arguments
    ///
    /// * `initial_consumption_kwh` - Consumption of the first month
    /// * `initial_generation_kwh` - Generation of the first month
    /// * `horizon_years` - Number of years to simulate (may be zero)
    ///
    /// # Returns
    ///
    /// One `YearlyRecord` per year, in order, each holding its twelve months.
    pub fn run(
        &self,
        initial_consumption_kwh: f64,
        initial_generation_kwh: f64,
        horizon_years: u32,
    ) -> Vec<YearlyRecord> {
        let initial = RunState {
            consumption_kwh: initial_consumption_kwh.max(0.0),
            generation_kwh: initial_generation_kwh.max(0.0),
            ledger: CreditLedger::new(self.config.credit_policy),
            month_number: 1,
            cumulative_cash_flow: -self.config.system_cost,
        };

        let (_, years) = (1..=horizon_years).fold(
            (initial, Vec::with_capacity(horizon_years as usize)),
            |(state, mut years), year_index| {
                let (state, year) = self.step_year(state, year_index);
                years.push(year);
                (state, years)
            },
        );
        years
    }

    fn step_year(&self, state: RunState, year_index: u32) -> (RunState, YearlyRecord) {
        let (mut state, months) = (1..=MONTHS_PER_YEAR).fold(
            (state, Vec::with_capacity(MONTHS_PER_YEAR as usize)),
            |(state, mut months), month| {
                let (state, record) = self.step_month(state, year_index, month);
                months.push(record);
                (state, months)
            },
        );

        let saving: f64 = months.iter().map(|m| m.saving).sum();
        let operating_cost = self.config.operating_cost;
        state.cumulative_cash_flow += saving - operating_cost;

        let year = YearlyRecord {
            year_index,
            calendar_year: self.calendar_year(year_index),
            saving,
            operating_cost,
            cumulative_cash_flow: state.cumulative_cash_flow,
            consumption_kwh: months.iter().map(|m| m.consumption_kwh).sum(),
            generation_kwh: months.iter().map(|m| m.generation_kwh).sum(),
            self_consumed_kwh: months.iter().map(|m| m.self_consumed_kwh).sum(),
            injected_kwh: months.iter().map(|m| m.injected_kwh).sum(),
            months,
        };
        debug!(
            "year {} ({}): saving {:.2}, cumulative {:.2}",
            year.year_index, year.calendar_year, year.saving, year.cumulative_cash_flow
        );
        (state, year)
    }

    /// Executes one month and returns the advanced state with the month's record.
    fn step_month(&self, state: RunState, year_index: u32, month: u32) -> (RunState, MonthlyRecord) {
        let cfg = self.config;
        let tariff = self.tariff;
        let consumption = state.consumption_kwh;
        let generation = state.generation_kwh;

        // 1-2. Instantaneous self-consumption, then grid exchange
        let self_consumed = (consumption * cfg.simultaneity_factor).min(generation);
        let drawn = (consumption - self_consumed).max(0.0);
        let injected = (generation - self_consumed).max(0.0);

        // 3. Credits
        let (ledger, settlement) = state.ledger.settle(state.month_number, injected, drawn);
        let purchased = (drawn - settlement.used_kwh).max(0.0);

        // Tariff adjustment accumulated up to this month
        let adjustment =
            (1.0 + cfg.tariff_adjustment_rate / 12.0).powf(f64::from(state.month_number));

        // 4. Fio B on injected energy
        let fraction = compensation_fraction(cfg.installation_year, self.calendar_year(year_index));
        let fio_b_cost = injected * tariff.fio_b * fraction * adjustment;

        // 5-7. Bills
        let cost_without_system = consumption * tariff.final_unit_price(consumption) * adjustment;
        let grid_cost = if purchased > 0.0 {
            purchased * tariff.final_unit_price(purchased) * adjustment
        } else {
            0.0
        };
        let availability_cost = cfg.availability_charge_kwh * tariff.base * adjustment;
        let cost_with_system = grid_cost + fio_b_cost + availability_cost;
        let saving = cost_without_system - cost_with_system;

        let record = MonthlyRecord {
            year_index,
            month,
            consumption_kwh: consumption,
            generation_kwh: generation,
            self_consumed_kwh: self_consumed,
            injected_kwh: injected,
            purchased_kwh: purchased,
            credits_used_kwh: settlement.used_kwh,
            credits_expired_kwh: settlement.expired_kwh,
            credit_balance_kwh: settlement.balance_kwh,
            cost_without_system,
            cost_with_system,
            fio_b_cost,
            saving,
            net_metering_fraction: fraction,
        };

        // 8. Growth and degradation for the next month
        let next = RunState {
            consumption_kwh: consumption * (1.0 + cfg.inflation_rate / 12.0),
            generation_kwh: generation * (1.0 - cfg.degradation_rate / 12.0),
            ledger,
            month_number: state.month_number + 1,
            cumulative_cash_flow: state.cumulative_cash_flow,
        };
        (next, record)
    }

    /// Saturates at `i32::MAX` for installation years near the end of the range.
    fn calendar_year(&self, year_index: u32) -> i32 {
        let offset = i32::try_from(year_index.saturating_sub(1)).unwrap_or(i32::MAX);
        self.config.installation_year.saturating_add(offset)
    }
}

/// Runs one simulation and returns its yearly records.
///
/// Convenience wrapper over [`CashFlowSimulator::run`].
pub fn simulate(
    initial_consumption_kwh: f64,
    initial_generation_kwh: f64,
    tariff: &TariffSnapshot,
    config: &SimulationConfig,
    horizon_years: u32,
) -> Vec<YearlyRecord> {
    CashFlowSimulator::new(tariff, config).run(
        initial_consumption_kwh,
        initial_generation_kwh,
        horizon_years,
    )
}
