/// Energy-credit ledger and expiry policies.
pub mod credits;
pub mod engine;
pub mod indicators;
/// Fio B transition rule for injected energy.
pub mod net_metering;
pub mod types;
