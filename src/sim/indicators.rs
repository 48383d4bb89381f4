//! Post-hoc financial indicators computed from the yearly records.

use log::warn;
use serde::Serialize;

use super::types::YearlyRecord;

/// Starting guess of the IRR iteration.
pub const IRR_INITIAL_GUESS: f64 = 0.10;

/// Maximum Newton-Raphson iterations for the IRR.
pub const IRR_MAX_ITERATIONS: u32 = 100;

/// `|NPV|` below which the IRR iteration is considered converged.
pub const IRR_TOLERANCE: f64 = 0.0001;

/// Result of the IRR root-find.
///
/// `rate` is always the last estimate. When `converged` is false it is not a root of the NPV
/// function and should be treated as unreliable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IrrEstimate {
    pub rate: f64,
    pub converged: bool,
    pub iterations: u32,
}

/// First 1-based year whose cumulative cash flow is non-negative.
pub fn payback_year(years: &[YearlyRecord]) -> Option<u32> {
    years
        .iter()
        .find(|y| y.cumulative_cash_flow >= 0.0)
        .map(|y| y.year_index)
}

/// First 1-based year whose discounted cumulative net cash flow is non-negative.
///
/// Each year contributes `(saving - operating_cost) / (1 + discount_rate)^year`.
pub fn discounted_payback_year(
    system_cost: f64,
    years: &[YearlyRecord],
    discount_rate: f64,
) -> Option<u32> {
    let mut cumulative = -system_cost;
    for year in years {
        cumulative += year.net_cash_flow() / (1.0 + discount_rate).powf(f64::from(year.year_index));
        if cumulative >= 0.0 {
            return Some(year.year_index);
        }
    }
    None
}

/// Net present value of `savings` (year 1 first) against an up-front `system_cost`.
///
/// `-system_cost + Σ savings[i-1] / (1 + rate)^i` for `i = 1..=n`.
///
/// The discounted savings are summed before the cost is subtracted, so at a rate of 0 the result
/// is exactly `-system_cost + Σ savings`.
pub fn net_present_value(system_cost: f64, savings: &[f64], rate: f64) -> f64 {
    let discounted: f64 = savings
        .iter()
        .zip(1..)
        .map(|(saving, i): (&f64, u32)| saving / (1.0 + rate).powf(f64::from(i)))
        .sum();
    -system_cost + discounted
}

/// Derivative of [`net_present_value`] with respect to `rate`.
fn npv_derivative(savings: &[f64], rate: f64) -> f64 {
    savings.iter().zip(1..).fold(0.0, |acc, (saving, i): (&f64, u32)| {
        let i = f64::from(i);
        acc - i * saving / (1.0 + rate).powf(i + 1.0)
    })
}

/// Internal rate of return by Newton-Raphson on [`net_present_value`].
///
/// Starts at 10 %, iterates at most 100 times, and stops once `|NPV| < 0.0001`. A zero
/// derivative ends the search with the last rate. After every update a negative rate is reset
/// to 0.01 and a rate above 1 to 0.99, so the result never leaves `[0, 1]` but may be inexact
/// near those bounds. Never fails.
pub fn internal_rate_of_return(system_cost: f64, savings: &[f64]) -> IrrEstimate {
    let mut rate = IRR_INITIAL_GUESS;
    for iteration in 0..IRR_MAX_ITERATIONS {
        let npv = net_present_value(system_cost, savings, rate);
        if npv.abs() < IRR_TOLERANCE {
            return IrrEstimate {
                rate,
                converged: true,
                iterations: iteration,
            };
        }
        let derivative = npv_derivative(savings, rate);
        if derivative == 0.0 {
            warn!("IRR derivative vanished at rate {rate:.4}; returning last estimate");
            return IrrEstimate {
                rate,
                converged: false,
                iterations: iteration,
            };
        }
        rate -= npv / derivative;
        if rate < 0.0 {
            rate = 0.01;
        } else if rate > 1.0 {
            rate = 0.99;
        }
    }

    let converged = net_present_value(system_cost, savings, rate).abs() < IRR_TOLERANCE;
    if !converged {
        warn!(
            "IRR did not converge within {IRR_MAX_ITERATIONS} iterations; last estimate {rate:.4}"
        );
    }
    IrrEstimate {
        rate,
        converged,
        iterations: IRR_MAX_ITERATIONS,
    }
}

/// Yearly savings in order, as consumed by the discounted indicators.
pub fn yearly_savings(years: &[YearlyRecord]) -> Vec<f64> {
    years.iter().map(|y| y.saving).collect()
}
