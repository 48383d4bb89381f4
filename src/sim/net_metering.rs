//! Fio B phase-in under the net-metering transition rule (Law 14.300).

/// Last installation year exempt from the Fio B charge.
pub const GRANDFATHERED_UNTIL: i32 = 2022;

/// First year of the transition ladder.
pub const TRANSITION_START: i32 = 2023;

/// Fraction of Fio B charged in each transition year from [`TRANSITION_START`].
pub const TRANSITION_LADDER: [f64; 6] = [0.15, 0.30, 0.45, 0.60, 0.75, 0.90];

/// Fraction of the Fio B unit charge applied to injected energy in `current_year`.
///
/// Systems installed up to 2022 are exempt in every year. Otherwise the fraction follows the
/// ladder from 2023 and is 1.0 from 2029 on.
pub fn compensation_fraction(installation_year: i32, current_year: i32) -> f64 {
    if installation_year <= GRANDFATHERED_UNTIL {
        return 0.0;
    }
    let k = current_year - TRANSITION_START;
    if k < 0 {
        return 0.0;
    }
    usize::try_from(k)
        .ok()
        .and_then(|k| TRANSITION_LADDER.get(k))
        .copied()
        .unwrap_or(1.0)
}
